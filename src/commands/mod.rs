//! Command handlers for the eksforge binary.

pub mod cluster;
pub mod diff;
pub mod manifests;
pub mod pipeline;
pub mod version;

use std::path::{Path, PathBuf};

use eksforge::config::Config;

/// Everything a command needs after global flags and config are resolved.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub project: PathBuf,
    /// Layered config; `config.context` already includes `-c` flags
    pub config: Config,
    pub json: bool,
}

impl Invocation {
    pub fn with_manifest_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.config.project.manifest_dir = dir;
        }
        self
    }

    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.config.project.output_dir = dir;
        }
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir(&self.project)
    }

    pub fn project_root(&self) -> &Path {
        &self.project
    }
}
