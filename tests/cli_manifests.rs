//! `eksforge manifests` listing.

mod common;

use common::*;

#[test]
fn lists_components_and_resources() {
    let env = TestEnv::new()
        .with_manifest("ingress.yaml", INGRESS_YAML)
        .with_manifest("notes.txt", "not a manifest");

    let result = env.run(&["manifests"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("ingress"));
    assert!(result.stdout.contains("Namespace/web"), "{}", result.stdout);
    assert!(!result.stdout.contains("notes"));
}

#[test]
fn json_lists_digest_and_document_count() {
    let env = TestEnv::new().with_manifest("ingress.yaml", INGRESS_YAML);

    let result = env.run(&["--json", "manifests"]);
    assert!(result.success, "{}", result.combined_output());

    let events = result.events();
    let manifest = events.iter().find(|e| e["event"] == "manifest").unwrap();
    assert_eq!(manifest["component"], "ingress");
    assert_eq!(manifest["file"], "ingress.yaml");
    assert_eq!(manifest["documents"], 2);
    assert!(manifest["digest"].as_str().unwrap().starts_with("sha256:"));
}

#[test]
fn empty_directory_is_not_an_error() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.project_path("k8s-manifests")).unwrap();

    let result = env.run(&["manifests"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("No manifest files"));
}

#[test]
fn manifests_flag_overrides_directory() {
    let env = TestEnv::new().with_file("other/app.yaml", "kind: Service\nmetadata:\n  name: app\n");

    let result = env.run(&["manifests", "--manifests", "other"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("Service/app"), "{}", result.stdout);
}
