//! Cluster definition builder
//!
//! Turns a network choice, an optional cluster name and a manifest directory
//! into a [`ClusterRequest`], and wraps it in the cluster stack.

use std::path::Path;

use tracing::{debug, info};

use crate::config::context::{CLUSTER_NAME, PRIVATE_SUBNET_IDS, VPC_ID};
use crate::config::{Config, Context};
use crate::domain::cluster::{
    ClusterRequest, EndpointAccess, KubernetesVersion, MastersRole, NetworkRef, SubnetId,
    SubnetType, VpcId,
};
use crate::domain::manifest::ManifestMatch;
use crate::domain::ports::ManifestSource;
use crate::domain::stack::{DeploymentEnv, OutputValue, Stack};
use crate::error::{EksforgeError, EksforgeResult};
use crate::infrastructure::fs::LocalManifestDir;
use crate::parser::parse_source;

/// Resource id of the cluster inside its stack.
pub const CLUSTER_RESOURCE: &str = "my-cluster";

pub struct ClusterDefinitionBuilder<'a> {
    source: &'a dyn ManifestSource,
    rule: ManifestMatch,
    version: KubernetesVersion,
    subnets: Vec<SubnetId>,
}

impl<'a> ClusterDefinitionBuilder<'a> {
    pub fn new(source: &'a dyn ManifestSource) -> Self {
        Self {
            source,
            rule: ManifestMatch::default(),
            version: KubernetesVersion::default(),
            subnets: Vec::new(),
        }
    }

    pub fn manifest_match(mut self, rule: ManifestMatch) -> Self {
        self.rule = rule;
        self
    }

    pub fn kubernetes_version(mut self, version: KubernetesVersion) -> Self {
        self.version = version;
        self
    }

    /// Private subnets of an existing VPC; rejected at build time without one.
    pub fn private_subnets(mut self, subnets: Vec<SubnetId>) -> Self {
        self.subnets = subnets;
        self
    }

    /// Assemble the request. Any unreadable or undecodable manifest aborts.
    pub fn build(
        &self,
        network_id: Option<VpcId>,
        cluster_name: Option<String>,
    ) -> EksforgeResult<ClusterRequest> {
        let manifests = parse_source(self.source, self.rule)?;
        debug!(
            dir = %self.source.location().display(),
            groups = manifests.len(),
            "collected manifest groups"
        );

        Ok(ClusterRequest {
            name: cluster_name,
            version: self.version.clone(),
            masters_role: MastersRole::default(),
            network: NetworkRef::from_optional(network_id).with_subnets(self.subnets.clone())?,
            subnets: vec![SubnetType::Private],
            endpoint_access: EndpointAccess::Public,
            output_cluster_name: true,
            manifests,
        })
    }
}

/// Build the cluster stack from configuration and context.
pub fn cluster_stack(
    config: &Config,
    context: &Context,
    env: DeploymentEnv,
    project_root: &Path,
) -> EksforgeResult<Stack<ClusterRequest>> {
    let network_id = context.try_get(VPC_ID).map(VpcId::parse).transpose()?;
    let cluster_name = context.try_get(CLUSTER_NAME).map(str::to_string);
    let subnets = context
        .try_get(PRIVATE_SUBNET_IDS)
        .map(SubnetId::parse_list)
        .transpose()?
        .unwrap_or_default();

    if network_id.is_some() && !env.is_resolved() {
        return Err(EksforgeError::EnvironmentUnresolved {
            reason: "looking up an existing VPC needs both account and region \
                     (set EKSFORGE_DEFAULT_ACCOUNT and EKSFORGE_DEFAULT_REGION)"
                .to_string(),
        });
    }

    let manifest_dir = config.manifest_dir(project_root);
    let source = LocalManifestDir::open(&manifest_dir)?;
    let version = KubernetesVersion::parse(&config.cluster.kubernetes_version)?;

    let request = ClusterDefinitionBuilder::new(&source)
        .manifest_match(config.project.manifest_match)
        .kubernetes_version(version)
        .private_subnets(subnets)
        .build(network_id, cluster_name)?;

    info!(
        stack = %config.cluster.stack_name,
        manifests = request.manifests.len(),
        documents = request.document_count(),
        "built cluster definition"
    );

    let output = match &request.name {
        Some(name) => OutputValue::Literal(name.clone()),
        None => OutputValue::Attribute {
            resource: CLUSTER_RESOURCE.to_string(),
            attribute: "Name".to_string(),
        },
    };

    let mut stack = Stack::new(config.cluster.stack_name.clone(), env, request);
    if stack.request.output_cluster_name {
        stack = stack.with_output("ClusterName", output);
    }
    Ok(stack)
}
