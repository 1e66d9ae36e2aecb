//! Build spec for the build-execution service
//!
//! Mirrors the `buildspec.yml` layout: a version and named phases, each an
//! ordered list of shell commands.

use serde::{Deserialize, Serialize};

use crate::error::EksforgeResult;

/// A single phase: commands run in order, first failure fails the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Phase {
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Phases {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_build: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<Phase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub version: String,
    pub phases: Phases,
}

impl BuildSpec {
    pub const VERSION: &'static str = "0.2";

    pub fn new<P, B>(pre_build: P, build: B) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            version: Self::VERSION.to_string(),
            phases: Phases {
                pre_build: Some(Phase {
                    commands: pre_build.into_iter().map(Into::into).collect(),
                }),
                build: Some(Phase {
                    commands: build.into_iter().map(Into::into).collect(),
                }),
            },
        }
    }

    /// All commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.phases
            .pre_build
            .iter()
            .chain(self.phases.build.iter())
            .flat_map(|phase| phase.commands.iter().map(String::as_str))
    }

    /// Render as `buildspec.yml` content.
    pub fn to_yaml(&self) -> EksforgeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}
