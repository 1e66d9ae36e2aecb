//! Deploy bundle
//!
//! The cluster template describes the request; the deploy project needs
//! something stock tools can apply. This renders the same stack as an eksctl
//! `ClusterConfig`, one kubectl `List` per manifest group and a `deploy.sh`
//! that creates or upgrades the cluster, maps the masters role and applies
//! the manifests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::shell;
use super::synth::Artifact;
use crate::domain::cluster::{ClusterRequest, EndpointAccess, NetworkRef, Principal, SubnetType};
use crate::domain::stack::Stack;
use crate::error::EksforgeResult;

pub const EKSCTL_CONFIG_FILE: &str = "eksctl-cluster.yaml";
pub const MANIFEST_LIST_DIR: &str = "manifests";
pub const DEPLOY_SCRIPT: &str = "deploy.sh";

const EKSCTL_API_VERSION: &str = "eksctl.io/v1alpha5";
const NODE_GROUP: &str = "default";
const NODE_INSTANCE_TYPE: &str = "m5.large";
const NODE_COUNT: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EksctlConfig {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: EksctlMetadata,
    pub vpc: EksctlVpc,
    pub managed_node_groups: Vec<EksctlNodeGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EksctlMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EksctlVpc {
    /// Absent: eksctl creates a VPC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<EksctlSubnets>,
    pub cluster_endpoints: EksctlEndpoints,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EksctlSubnets {
    pub private: BTreeMap<String, EksctlSubnet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EksctlSubnet {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EksctlEndpoints {
    pub public_access: bool,
    pub private_access: bool,
}

impl From<EndpointAccess> for EksctlEndpoints {
    fn from(access: EndpointAccess) -> Self {
        let (public_access, private_access) = match access {
            EndpointAccess::Public => (true, false),
            EndpointAccess::Private => (false, true),
            EndpointAccess::PublicAndPrivate => (true, true),
        };
        Self {
            public_access,
            private_access,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EksctlNodeGroup {
    pub name: String,
    pub instance_type: String,
    pub desired_capacity: u32,
    pub private_networking: bool,
}

/// Name the cluster is created under. The stack name stands in when the
/// request leaves naming to the provider, since eksctl requires one.
pub fn cluster_name(stack: &Stack<ClusterRequest>) -> &str {
    stack.request.name.as_deref().unwrap_or(&stack.name)
}

impl EksctlConfig {
    pub fn from_stack(stack: &Stack<ClusterRequest>) -> Self {
        let request = &stack.request;

        let (id, subnets) = match &request.network {
            NetworkRef::CreateNew => (None, None),
            NetworkRef::Existing { vpc_id, subnet_ids } => {
                let subnets = (!subnet_ids.is_empty()).then(|| EksctlSubnets {
                    private: subnet_ids
                        .iter()
                        .map(|s| (s.as_str().to_string(), EksctlSubnet { id: s.as_str().to_string() }))
                        .collect(),
                });
                (Some(vpc_id.as_str().to_string()), subnets)
            }
        };

        Self {
            api_version: EKSCTL_API_VERSION,
            kind: "ClusterConfig",
            metadata: EksctlMetadata {
                name: cluster_name(stack).to_string(),
                region: stack.env.region.clone(),
                version: request.version.as_str().to_string(),
            },
            vpc: EksctlVpc {
                id,
                subnets,
                cluster_endpoints: request.endpoint_access.into(),
            },
            managed_node_groups: vec![EksctlNodeGroup {
                name: NODE_GROUP.to_string(),
                instance_type: NODE_INSTANCE_TYPE.to_string(),
                desired_capacity: NODE_COUNT,
                private_networking: request.subnets.contains(&SubnetType::Private),
            }],
        }
    }

    pub fn to_yaml(&self) -> EksforgeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// One kubectl `List` per manifest group; the index prefix keeps
/// `kubectl apply -f <dir>` in discovery order.
pub fn manifest_lists(request: &ClusterRequest) -> EksforgeResult<Vec<Artifact>> {
    request
        .manifests
        .iter()
        .enumerate()
        .map(|(index, group)| -> EksforgeResult<Artifact> {
            let list = serde_json::json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": group.documents,
            });
            let mut content = serde_json::to_string_pretty(&list)?;
            content.push('\n');
            Ok(Artifact {
                path: Path::new(MANIFEST_LIST_DIR)
                    .join(format!("{:03}-{}.json", index + 1, group.component)),
                content,
            })
        })
        .collect()
}

/// Shell script run from anywhere; it works relative to its own directory.
pub fn deploy_script(stack: &Stack<ClusterRequest>) -> String {
    let request = &stack.request;
    let role = &request.masters_role.id;
    let trusted = match request.masters_role.assumed_by {
        Principal::AccountRoot => "arn:aws:iam::${ACCOUNT}:root",
    };
    let trust_policy = format!(
        r#"{{"Version":"2012-10-17","Statement":[{{"Effect":"Allow","Principal":{{"AWS":"{}"}},"Action":"sts:AssumeRole"}}]}}"#,
        trusted
    )
    .replace('"', "\\\"");

    let mut lines = vec![
        "#!/bin/sh".to_string(),
        format!("# Rendered by eksforge from stack {}", stack.name),
        "set -eu".to_string(),
        "cd \"$(dirname \"$0\")\"".to_string(),
        String::new(),
    ];
    if let Some(region) = &stack.env.region {
        lines.push(format!("export AWS_REGION={}", shell::word(region)));
    }
    lines.extend([
        format!("CLUSTER={}", shell::word(cluster_name(stack))),
        format!("MASTERS_ROLE={}", shell::word(role)),
        "ACCOUNT=$(aws sts get-caller-identity --query Account --output text)".to_string(),
        "MASTERS_ARN=\"arn:aws:iam::${ACCOUNT}:role/${MASTERS_ROLE}\"".to_string(),
        String::new(),
        "if ! aws iam get-role --role-name \"$MASTERS_ROLE\" >/dev/null 2>&1; then".to_string(),
        format!(
            "  aws iam create-role --role-name \"$MASTERS_ROLE\" --assume-role-policy-document \"{}\" >/dev/null",
            trust_policy
        ),
        "fi".to_string(),
        String::new(),
        "if eksctl get cluster --name \"$CLUSTER\" >/dev/null 2>&1; then".to_string(),
        format!("  eksctl upgrade cluster -f {} --approve", EKSCTL_CONFIG_FILE),
        "else".to_string(),
        format!("  eksctl create cluster -f {}", EKSCTL_CONFIG_FILE),
        "fi".to_string(),
        String::new(),
        "if ! eksctl get iamidentitymapping --cluster \"$CLUSTER\" --arn \"$MASTERS_ARN\" >/dev/null 2>&1; then"
            .to_string(),
        "  eksctl create iamidentitymapping --cluster \"$CLUSTER\" --arn \"$MASTERS_ARN\" \\".to_string(),
        "    --group system:masters --username \"$MASTERS_ROLE\"".to_string(),
        "fi".to_string(),
        String::new(),
        "aws eks update-kubeconfig --name \"$CLUSTER\"".to_string(),
    ]);
    if !request.manifests.is_empty() {
        lines.push(format!("kubectl apply -f {}/", MANIFEST_LIST_DIR));
    }

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

/// eksctl config, manifest lists, then the script that applies them.
pub fn render_bundle(stack: &Stack<ClusterRequest>) -> EksforgeResult<Vec<Artifact>> {
    let mut artifacts = vec![Artifact {
        path: PathBuf::from(EKSCTL_CONFIG_FILE),
        content: EksctlConfig::from_stack(stack).to_yaml()?,
    }];
    artifacts.extend(manifest_lists(&stack.request)?);
    artifacts.push(Artifact {
        path: PathBuf::from(DEPLOY_SCRIPT),
        content: deploy_script(stack),
    });
    Ok(artifacts)
}
