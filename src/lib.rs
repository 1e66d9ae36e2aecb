//! eksforge - EKS cluster and delivery pipeline synthesizer
//!
//! Reads a directory of Kubernetes manifests plus named context parameters
//! and produces declarative requests for a managed cluster (with its
//! manifests) and for the pipeline that validates and deploys them.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod parser;
pub mod telemetry;

// Re-exports for convenience
pub use application::{
    cluster_stack, pipeline_stack, ClusterDefinitionBuilder, PipelineDefinitionBuilder,
    PipelineParams,
};
pub use config::{Config, Context};
pub use domain::cluster::{ClusterRequest, NetworkRef, VpcId};
pub use domain::manifest::{component_name, ManifestGroup, ManifestMatch};
pub use domain::pipeline::PipelineDefinition;
pub use domain::stack::{DeploymentEnv, Stack};
pub use error::{EksforgeError, EksforgeResult};
pub use parser::{decode_documents, parse_directory};
