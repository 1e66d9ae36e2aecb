//! Named context parameters
//!
//! Key/value pairs such as `pipeline-name` or `vpc-id`, supplied through the
//! `[context]` table of the config file or `-c key=value` on the command line.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EksforgeError, EksforgeResult};

pub const CLUSTER_NAME: &str = "cluster-name";
pub const VPC_ID: &str = "vpc-id";
pub const PIPELINE_NAME: &str = "pipeline-name";
pub const CODECOMMIT_REPO_NAME: &str = "codecommit-repo-name";
pub const CONFTEST_DOWNLOAD_URL: &str = "conftest-download-url";
/// Comma-separated private subnets of an existing VPC
pub const PRIVATE_SUBNET_IDS: &str = "private-subnet-ids";

/// Keys the builders read; anything else is reported as unused.
pub const KNOWN_KEYS: &[&str] = &[
    CLUSTER_NAME,
    VPC_ID,
    PIPELINE_NAME,
    CODECOMMIT_REPO_NAME,
    CONFTEST_DOWNLOAD_URL,
    PRIVATE_SUBNET_IDS,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, String>);

/// TOML scalars accepted as context values.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarDe {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl<'de> Deserialize<'de> for Context {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, ScalarDe>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(k, v)| {
                    let text = match v {
                        ScalarDe::Text(s) => s,
                        ScalarDe::Integer(i) => i.to_string(),
                        ScalarDe::Float(f) => f.to_string(),
                        ScalarDe::Bool(b) => b.to_string(),
                    };
                    (k, text)
                })
                .collect(),
        ))
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Value for `key`; empty strings count as absent.
    pub fn try_get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value for `key`, or `ConfigurationMissing` naming it.
    pub fn require(&self, key: &str) -> EksforgeResult<&str> {
        self.try_get(key).ok_or_else(|| EksforgeError::missing(key))
    }

    /// Later entries win.
    pub fn merge(&mut self, other: &Context) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn unknown_keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|k| !KNOWN_KEYS.contains(k))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a `key=value` pair from the command line.
pub fn parse_context_pair(raw: &str) -> EksforgeResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(EksforgeError::InvalidContext {
            key: raw.to_string(),
            message: "expected key=value".to_string(),
        }),
    }
}
