//! Cluster request types
//!
//! Describes one managed Kubernetes cluster, its administrative role and the
//! manifests applied to it once it is up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::manifest::ManifestGroup;
use crate::error::{EksforgeError, EksforgeResult};

/// Kubernetes control-plane version, e.g. `1.20`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KubernetesVersion(String);

impl KubernetesVersion {
    pub const DEFAULT: &'static str = "1.20";

    /// Parse a `major.minor` version string.
    pub fn parse(raw: &str) -> EksforgeResult<Self> {
        let trimmed = raw.trim();
        let valid = match trimmed.split_once('.') {
            Some((major, minor)) => {
                !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        };
        if !valid {
            return Err(EksforgeError::InvalidContext {
                key: "kubernetes_version".to_string(),
                message: format!("expected MAJOR.MINOR, got '{}'", raw),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for KubernetesVersion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for KubernetesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an existing VPC (`vpc-…`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VpcId(String);

impl VpcId {
    const PREFIX: &'static str = "vpc-";

    pub fn parse(raw: &str) -> EksforgeResult<Self> {
        match raw.strip_prefix(Self::PREFIX) {
            Some(suffix) if !suffix.is_empty() && !suffix.contains(char::is_whitespace) => {
                Ok(Self(raw.to_string()))
            }
            _ => Err(EksforgeError::InvalidContext {
                key: "vpc-id".to_string(),
                message: format!("'{}' is not a VPC identifier (expected vpc-…)", raw),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an existing subnet (`subnet-…`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubnetId(String);

impl SubnetId {
    const PREFIX: &'static str = "subnet-";

    pub fn parse(raw: &str) -> EksforgeResult<Self> {
        let trimmed = raw.trim();
        match trimmed.strip_prefix(Self::PREFIX) {
            Some(suffix) if !suffix.is_empty() && !suffix.contains(char::is_whitespace) => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(EksforgeError::InvalidContext {
                key: "private-subnet-ids".to_string(),
                message: format!("'{}' is not a subnet identifier (expected subnet-…)", raw),
            }),
        }
    }

    /// Parse a comma-separated list, ignoring empty entries.
    pub fn parse_list(raw: &str) -> EksforgeResult<Vec<Self>> {
        raw.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where the cluster's network comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NetworkRef {
    /// Provider creates a fresh VPC for the cluster
    CreateNew,
    /// Look up an existing VPC
    Existing {
        vpc_id: VpcId,
        /// Private subnets for the nodes; looked up from the VPC when empty
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        subnet_ids: Vec<SubnetId>,
    },
}

impl NetworkRef {
    pub fn from_optional(vpc_id: Option<VpcId>) -> Self {
        match vpc_id {
            Some(vpc_id) => NetworkRef::Existing {
                vpc_id,
                subnet_ids: Vec::new(),
            },
            None => NetworkRef::CreateNew,
        }
    }

    /// Pin the private subnets of an existing VPC.
    pub fn with_subnets(self, subnets: Vec<SubnetId>) -> EksforgeResult<Self> {
        match self {
            NetworkRef::Existing { vpc_id, .. } => Ok(NetworkRef::Existing {
                vpc_id,
                subnet_ids: subnets,
            }),
            NetworkRef::CreateNew if subnets.is_empty() => Ok(NetworkRef::CreateNew),
            NetworkRef::CreateNew => Err(EksforgeError::InvalidContext {
                key: "private-subnet-ids".to_string(),
                message: "subnets can only be pinned together with vpc-id".to_string(),
            }),
        }
    }

    pub fn subnet_ids(&self) -> &[SubnetId] {
        match self {
            NetworkRef::Existing { subnet_ids, .. } => subnet_ids,
            NetworkRef::CreateNew => &[],
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, NetworkRef::Existing { .. })
    }
}

/// Subnet visibility class the cluster's nodes are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetType {
    Public,
    Private,
}

/// Reachability of the Kubernetes API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointAccess {
    Public,
    Private,
    PublicAndPrivate,
}

/// Principal allowed to assume a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    /// Any identity in the deploying account
    AccountRoot,
}

/// Administrative role mapped to `system:masters` in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MastersRole {
    pub id: String,
    pub assumed_by: Principal,
}

impl Default for MastersRole {
    fn default() -> Self {
        Self {
            id: "cluster-master-role".to_string(),
            assumed_by: Principal::AccountRoot,
        }
    }
}

/// The full cluster request handed to the provisioning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRequest {
    /// Provider assigns a name when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub version: KubernetesVersion,
    pub masters_role: MastersRole,
    pub network: NetworkRef,
    pub subnets: Vec<SubnetType>,
    pub endpoint_access: EndpointAccess,
    pub output_cluster_name: bool,
    /// Manifest-apply requests, one per component, in discovery order
    pub manifests: Vec<ManifestGroup>,
}

impl ClusterRequest {
    pub fn manifest(&self, component: &str) -> Option<&ManifestGroup> {
        self.manifests.iter().find(|m| m.component == component)
    }

    pub fn document_count(&self) -> usize {
        self.manifests.iter().map(ManifestGroup::len).sum()
    }
}
