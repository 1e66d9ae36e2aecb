//! Delivery pipeline definition
//!
//! A pipeline is a linear list of stages. Each stage holds actions that run
//! in parallel unless a `run_order` sequences them. Build actions point at a
//! [`BuildProject`] declared alongside the stages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::buildspec::BuildSpec;
use crate::error::{EksforgeError, EksforgeResult};

/// Lowest and highest run-order the delivery service accepts.
pub const RUN_ORDER_RANGE: std::ops::RangeInclusive<u32> = 1..=999;

/// Named artifact passed between stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactName(pub String);

impl ArtifactName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// What an action does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ActionKind {
    /// Check out a branch of a source repository
    CodeCommitSource {
        repository: String,
        branch: String,
        output: ArtifactName,
    },
    /// Run a build project against an input artifact
    CodeBuild {
        project: String,
        input: ArtifactName,
    },
    /// Block until a human approves
    ManualApproval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub run_order: u32,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            run_order: 1,
            kind,
        }
    }

    pub fn with_run_order(mut self, run_order: u32) -> Self {
        self.run_order = run_order;
        self
    }

    pub fn is_source(&self) -> bool {
        matches!(self.kind, ActionKind::CodeCommitSource { .. })
    }

    fn input(&self) -> Option<&ArtifactName> {
        match &self.kind {
            ActionKind::CodeBuild { input, .. } => Some(input),
            _ => None,
        }
    }

    fn output(&self) -> Option<&ArtifactName> {
        match &self.kind {
            ActionKind::CodeCommitSource { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Stage {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Container image and size for a build project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironment {
    pub image: String,
    pub compute_type: String,
}

impl Default for BuildEnvironment {
    fn default() -> Self {
        Self {
            image: "aws/codebuild/standard:4.0".to_string(),
            compute_type: "BUILD_GENERAL1_SMALL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProject {
    pub id: String,
    pub environment: BuildEnvironment,
    pub build_spec: BuildSpec,
    /// AWS managed policies attached to the project's execution role
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_policies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    pub restart_execution_on_update: bool,
    pub stages: Vec<Stage>,
    pub build_projects: Vec<BuildProject>,
}

impl PipelineDefinition {
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn project(&self, id: &str) -> Option<&BuildProject> {
        self.build_projects.iter().find(|p| p.id == id)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Check the structural rules the delivery service enforces on create.
    pub fn validate(&self) -> EksforgeResult<()> {
        let invalid = |reason: String| Err(EksforgeError::InvalidPipeline { reason });

        if self.stages.len() < 2 {
            return invalid(format!(
                "pipeline must have at least two stages, found {}",
                self.stages.len()
            ));
        }

        let projects: HashSet<&str> = self.build_projects.iter().map(|p| p.id.as_str()).collect();
        let mut stage_names = HashSet::new();
        let mut produced: HashSet<&ArtifactName> = HashSet::new();

        for (index, stage) in self.stages.iter().enumerate() {
            if !stage_names.insert(stage.name.as_str()) {
                return invalid(format!("duplicate stage name '{}'", stage.name));
            }
            if stage.actions.is_empty() {
                return invalid(format!("stage '{}' has no actions", stage.name));
            }

            let mut action_names = HashSet::new();
            for action in &stage.actions {
                if !action_names.insert(action.name.as_str()) {
                    return invalid(format!(
                        "duplicate action name '{}' in stage '{}'",
                        action.name, stage.name
                    ));
                }
                if !RUN_ORDER_RANGE.contains(&action.run_order) {
                    return invalid(format!(
                        "action '{}' has run order {} outside {}..={}",
                        action.name,
                        action.run_order,
                        RUN_ORDER_RANGE.start(),
                        RUN_ORDER_RANGE.end()
                    ));
                }
                match (index == 0, action.is_source()) {
                    (true, false) => {
                        return invalid(format!(
                            "first stage may only contain source actions, found '{}'",
                            action.name
                        ))
                    }
                    (false, true) => {
                        return invalid(format!(
                            "source action '{}' must be in the first stage",
                            action.name
                        ))
                    }
                    _ => {}
                }
                if let Some(input) = action.input() {
                    if !produced.contains(input) {
                        return invalid(format!(
                            "action '{}' consumes artifact '{}' that no earlier stage produces",
                            action.name, input.0
                        ));
                    }
                }
                if let ActionKind::CodeBuild { project, .. } = &action.kind {
                    if !projects.contains(project.as_str()) {
                        return invalid(format!(
                            "action '{}' references unknown build project '{}'",
                            action.name, project
                        ));
                    }
                }
            }

            // Outputs become visible to later stages only.
            produced.extend(stage.actions.iter().filter_map(Action::output));
        }

        Ok(())
    }
}
