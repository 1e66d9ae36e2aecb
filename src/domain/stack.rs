//! Stack envelope
//!
//! Every synthesized document is a named stack bound to a deployment
//! environment, wrapping one request plus its exported outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EksforgeResult;

/// Target account and region. Either may be left to the deploying tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeploymentEnv {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl DeploymentEnv {
    pub fn is_resolved(&self) -> bool {
        self.account.is_some() && self.region.is_some()
    }

    /// Read from the process environment.
    ///
    /// Region falls back to the standard AWS variables.
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            account: non_empty("EKSFORGE_DEFAULT_ACCOUNT"),
            region: non_empty("EKSFORGE_DEFAULT_REGION")
                .or_else(|| non_empty("AWS_REGION"))
                .or_else(|| non_empty("AWS_DEFAULT_REGION")),
        }
    }
}

/// Value of a stack output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    /// Known at synthesis time
    Literal(String),
    /// Attribute filled in by the provider after creation
    Attribute { resource: String, attribute: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack<T> {
    pub name: String,
    pub env: DeploymentEnv,
    pub request: T,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, OutputValue>,
}

impl<T: Serialize> Stack<T> {
    pub fn new(name: impl Into<String>, env: DeploymentEnv, request: T) -> Self {
        Self {
            name: name.into(),
            env,
            request,
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: OutputValue) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }

    /// File name of the synthesized template.
    pub fn template_file_name(&self) -> String {
        format!("{}.template.json", self.name)
    }

    /// Pretty JSON with a trailing newline; stable across runs.
    pub fn to_template(&self) -> EksforgeResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
