//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::manifest::ManifestMatch;
use crate::error::EksforgeResult;

use super::context::Context;
use super::loader::{self, ConfigWarning, LoadedConfig};

/// Project layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory of Kubernetes manifests, relative to the project root
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,

    /// Directory the validation tool is downloaded into
    #[serde(default = "default_conftest_dir")]
    pub conftest_dir: PathBuf,

    /// Where synthesized templates are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub manifest_match: ManifestMatch,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest_dir: default_manifest_dir(),
            conftest_dir: default_conftest_dir(),
            output_dir: default_output_dir(),
            manifest_match: ManifestMatch::default(),
        }
    }
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("k8s-manifests")
}

fn default_conftest_dir() -> PathBuf {
    PathBuf::from("conftest/bin")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("eksforge.out")
}

/// Cluster stack settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_cluster_stack")]
    pub stack_name: String,

    #[serde(default = "default_kubernetes_version")]
    pub kubernetes_version: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            stack_name: default_cluster_stack(),
            kubernetes_version: default_kubernetes_version(),
        }
    }
}

fn default_cluster_stack() -> String {
    "EksforgeCluster-AutoK8sControls".to_string()
}

fn default_kubernetes_version() -> String {
    crate::domain::cluster::KubernetesVersion::DEFAULT.to_string()
}

/// Pipeline stack settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_pipeline_stack")]
    pub stack_name: String,

    /// Source branch the pipeline tracks
    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_build_image")]
    pub build_image: String,

    #[serde(default = "default_compute_type")]
    pub compute_type: String,

    /// Installs the toolchain, eksctl and kubectl, then builds eksforge
    #[serde(default = "default_deploy_pre_build")]
    pub deploy_pre_build: Vec<String>,

    /// Synthesizes and applies the cluster definition without prompting
    #[serde(default = "default_deploy_build")]
    pub deploy_build: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stack_name: default_pipeline_stack(),
            branch: default_branch(),
            build_image: default_build_image(),
            compute_type: default_compute_type(),
            deploy_pre_build: default_deploy_pre_build(),
            deploy_build: default_deploy_build(),
        }
    }
}

fn default_pipeline_stack() -> String {
    "EksforgePipeline".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_build_image() -> String {
    "aws/codebuild/standard:4.0".to_string()
}

fn default_compute_type() -> String {
    "BUILD_GENERAL1_SMALL".to_string()
}

fn default_deploy_pre_build() -> Vec<String> {
    vec![
        "ls -rtla $CODEBUILD_SRC_DIR/".to_string(),
        "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y --profile minimal"
            .to_string(),
        "curl -sSL https://github.com/eksctl-io/eksctl/releases/latest/download/eksctl_Linux_amd64.tar.gz | tar xz -C /usr/local/bin"
            .to_string(),
        "curl -sSLo /usr/local/bin/kubectl https://dl.k8s.io/release/v1.20.15/bin/linux/amd64/kubectl"
            .to_string(),
        "chmod +x /usr/local/bin/kubectl".to_string(),
        "$HOME/.cargo/bin/cargo build --release".to_string(),
    ]
}

/// Synthesize into the default output dir, then run the rendered deploy script.
fn default_deploy_build() -> Vec<String> {
    vec![
        "./target/release/eksforge cluster".to_string(),
        "sh eksforge.out/deploy.sh".to_string(),
    ]
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named context parameters (`cluster-name`, `vpc-id`, ...)
    #[serde(default)]
    pub context: Context,

    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load a single TOML file
    pub fn load(path: &Path) -> EksforgeResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load a single TOML file, keeping unknown-key warnings
    pub fn load_with_warnings(path: &Path) -> EksforgeResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load user config, project config (or `explicit`), then env overrides
    pub fn load_layered(project_root: &Path, explicit: Option<&Path>) -> EksforgeResult<LoadedConfig> {
        loader::load_layered(project_root, explicit)
    }

    /// Apply environment variable overrides (EKSFORGE_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Manifest directory resolved against the project root
    pub fn manifest_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.project.manifest_dir)
    }

    /// Output directory resolved against the project root
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.project.output_dir)
    }
}
