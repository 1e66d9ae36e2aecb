//! `eksforge cluster` end-to-end behavior.

mod common;

use common::*;

fn template(env: &TestEnv) -> serde_json::Value {
    let raw = env.read("eksforge.out/EksforgeCluster-AutoK8sControls.template.json");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn writes_template_with_one_group_per_yaml_file() {
    let env = TestEnv::new()
        .with_manifest("ingress.yaml", INGRESS_YAML)
        .with_manifest("configmap.json", CONFIGMAP_JSON);

    let result = env.run(&["cluster"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("EksforgeCluster-AutoK8sControls"));

    let template = template(&env);
    let manifests = template["request"]["manifests"].as_array().unwrap();
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0]["component"], "ingress");
    assert_eq!(manifests[0]["documents"][0]["kind"], "Namespace");
    assert_eq!(manifests[0]["documents"][1]["kind"], "Ingress");

    assert_eq!(template["request"]["network"]["mode"], "create_new");
    assert_eq!(template["request"]["version"], "1.20");
    assert!(template["request"].get("name").is_none());
    assert_eq!(
        template["outputs"]["ClusterName"],
        serde_json::json!({"resource": "my-cluster", "attribute": "Name"})
    );
}

#[test]
fn cluster_name_from_context_is_exported_literally() {
    let env = TestEnv::new().with_manifest("ingress.yaml", INGRESS_YAML);

    let result = env.run(&["cluster", "-c", "cluster-name=c1"]);
    assert!(result.success, "{}", result.combined_output());

    let template = template(&env);
    assert_eq!(template["request"]["name"], "c1");
    assert_eq!(template["outputs"]["ClusterName"], "c1");

    let eksctl = env.read("eksforge.out/eksctl-cluster.yaml");
    assert!(eksctl.contains("name: c1"), "{}", eksctl);
    assert!(env.read("eksforge.out/deploy.sh").contains("CLUSTER=c1\n"));
}

#[test]
fn existing_vpc_subnets_reach_eksctl_config() {
    let env = TestEnv::new().with_manifest("ingress.yaml", INGRESS_YAML);

    let result = env.run_with_env(
        &[
            "cluster",
            "-c",
            "vpc-id=vpc-0abc",
            "-c",
            "private-subnet-ids=subnet-a,subnet-b",
        ],
        &[
            ("EKSFORGE_DEFAULT_ACCOUNT", "123456789012"),
            ("AWS_REGION", "us-west-2"),
        ],
    );
    assert!(result.success, "{}", result.combined_output());

    let eksctl: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(&env.read("eksforge.out/eksctl-cluster.yaml")).unwrap();
    assert_eq!(eksctl["vpc"]["id"].as_str(), Some("vpc-0abc"));
    assert_eq!(eksctl["metadata"]["region"].as_str(), Some("us-west-2"));
    assert!(eksctl["vpc"]["subnets"]["private"].get("subnet-a").is_some());

    let result = env.run(&["cluster", "-c", "private-subnet-ids=subnet-a"]);
    assert!(!result.success);
    assert!(result.stderr.contains("private-subnet-ids"), "{}", result.stderr);
}

#[test]
fn existing_vpc_requires_account_and_region() {
    let env = TestEnv::new().with_manifest("ingress.yaml", INGRESS_YAML);

    let result = env.run(&["cluster", "-c", "vpc-id=vpc-0abc"]);
    assert!(!result.success);
    assert!(result.stderr.contains("EKSFORGE_DEFAULT_ACCOUNT"), "{}", result.stderr);

    let result = env.run_with_env(
        &["cluster", "-c", "vpc-id=vpc-0abc"],
        &[
            ("EKSFORGE_DEFAULT_ACCOUNT", "123456789012"),
            ("AWS_REGION", "us-west-2"),
        ],
    );
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stderr.contains("kubernetes.io/role/internal-elb"));

    let template = template(&env);
    assert_eq!(template["request"]["network"]["vpc_id"], "vpc-0abc");
    assert_eq!(template["env"]["region"], "us-west-2");
}

#[test]
fn missing_manifest_dir_fails() {
    let env = TestEnv::new();
    let result = env.run(&["cluster"]);
    assert!(!result.success);
    assert!(result.stderr.contains("k8s-manifests"), "{}", result.stderr);
}

#[test]
fn malformed_manifest_names_the_file() {
    let env = TestEnv::new().with_manifest("broken.yaml", "kind: [unclosed\n");
    let result = env.run(&["cluster"]);
    assert!(!result.success);
    assert!(result.stderr.contains("broken.yaml"), "{}", result.stderr);
}

#[test]
fn stdout_flag_prints_without_writing() {
    let env = TestEnv::new().with_manifest("ingress.yaml", INGRESS_YAML);

    let result = env.run(&["cluster", "--stdout"]);
    assert!(result.success, "{}", result.combined_output());

    let printed: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
    assert_eq!(printed["name"], "EksforgeCluster-AutoK8sControls");
    assert!(!env.project_path("eksforge.out").exists());
}

#[test]
fn json_mode_emits_ndjson_events() {
    let env = TestEnv::new().with_manifest("ingress.yaml", INGRESS_YAML);

    let result = env.run(&["--json", "cluster"]);
    assert!(result.success, "{}", result.combined_output());

    let events = result.events();
    assert_eq!(events.first().unwrap()["event"], "start");
    assert!(events.iter().any(|e| e["event"] == "artifact"));
    let last = events.last().unwrap();
    assert_eq!(last["event"], "complete");
    assert_eq!(last["success"], true);
    assert_eq!(last["stack"], "EksforgeCluster-AutoK8sControls");
}

#[test]
fn json_mode_reports_errors_as_events() {
    let env = TestEnv::new();
    let result = env.run(&["--json", "cluster"]);
    assert!(!result.success);

    let events = result.events();
    let last = events.last().unwrap();
    assert_eq!(last["event"], "error");
    assert_eq!(last["command"], "cluster");
}

#[test]
fn project_config_overrides_manifest_dir_and_version() {
    let env = TestEnv::new()
        .with_file(
            "eksforge.toml",
            "[project]\nmanifest_dir = \"deploy\"\n\n[cluster]\nkubernetes_version = \"1.21\"\n",
        )
        .with_file("deploy/web.yml.yaml", INGRESS_YAML);

    let result = env.run(&["cluster"]);
    assert!(result.success, "{}", result.combined_output());

    let template = template(&env);
    assert_eq!(template["request"]["version"], "1.21");
    assert_eq!(template["request"]["manifests"][0]["component"], "web");
}

#[test]
fn synthesis_is_byte_identical_across_runs() {
    let env = TestEnv::new()
        .with_manifest("ingress.yaml", INGRESS_YAML)
        .with_manifest("app.yaml", "kind: Deployment\nmetadata:\n  name: app\n");

    assert!(env.run(&["cluster"]).success);
    let first = env.read("eksforge.out/EksforgeCluster-AutoK8sControls.template.json");
    assert!(env.run(&["cluster"]).success);
    let second = env.read("eksforge.out/EksforgeCluster-AutoK8sControls.template.json");

    assert_eq!(first, second);
}
