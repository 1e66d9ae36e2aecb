//! Reusable test content.

pub const INGRESS_YAML: &str = r#"apiVersion: v1
kind: Namespace
metadata:
  name: web
---
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: web
  namespace: web
"#;

pub const CONFIGMAP_JSON: &str = r#"{"apiVersion": "v1", "kind": "ConfigMap"}"#;

pub const CONFTEST_URL: &str =
    "https://github.com/open-policy-agent/conftest/releases/download/v0.25.0/conftest_0.25.0_Linux_x86_64.tar.gz";

/// Context flags for a complete pipeline run.
pub fn pipeline_context_args() -> Vec<String> {
    vec![
        "-c".to_string(),
        "pipeline-name=p1".to_string(),
        "-c".to_string(),
        "codecommit-repo-name=r1".to_string(),
        "-c".to_string(),
        format!("conftest-download-url={CONFTEST_URL}"),
    ]
}
