//! Configuration module for eksforge
//!
//! Configuration hierarchy:
//! 1. CLI context flags (highest priority)
//! 2. Environment variables (EKSFORGE_*)
//! 3. Project config (eksforge.toml)
//! 4. User config (~/.config/eksforge/config.toml)
//! 5. Built-in defaults (lowest priority)

pub mod context;
mod env_validator;
mod loader;
mod types;

pub use context::{parse_context_pair, Context};
pub use env_validator::{levenshtein, suggest};
pub use loader::{ConfigWarning, LoadedConfig, PROJECT_CONFIG_FILE};
pub use types::{ClusterConfig, Config, PipelineConfig, ProjectConfig};
