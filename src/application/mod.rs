//! Application Layer
//!
//! Builders that assemble requests from configuration, and the synthesis
//! step that renders them to files.

pub mod cluster;
pub mod deploy;
pub mod pipeline;
mod shell;
pub mod synth;

pub use cluster::{cluster_stack, ClusterDefinitionBuilder};
pub use deploy::{DEPLOY_SCRIPT, EKSCTL_CONFIG_FILE};
pub use pipeline::{pipeline_stack, PipelineDefinitionBuilder, PipelineParams};
pub use synth::{diff_artifacts, render_cluster, render_pipeline, write_artifacts, Artifact, ArtifactDiff};
