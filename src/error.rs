//! Error types for eksforge
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for eksforge operations
pub type EksforgeResult<T> = Result<T, EksforgeError>;

/// Main error type for eksforge operations
#[derive(Error, Debug)]
pub enum EksforgeError {
    /// A required named context parameter is absent or empty
    #[error("unable to retrieve context variable of '{key}'")]
    ConfigurationMissing { key: String },

    /// A context parameter is present but unusable
    #[error("invalid context value for '{key}': {message}")]
    InvalidContext { key: String, message: String },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Manifest directory missing or not a directory
    #[error("manifest directory not found: {path}")]
    ManifestDirNotFound { path: PathBuf },

    /// Manifest directory could not be listed
    #[error("unable to read manifest directory {path}: {source}")]
    ManifestDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A matching manifest file could not be read
    #[error("unable to read manifest {file}: {source}")]
    ManifestUnreadable {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest content is not valid YAML
    #[error("invalid manifest {file}: {message}")]
    ManifestDecode { file: PathBuf, message: String },

    /// File name yields an empty component name (e.g. `.yaml`)
    #[error("manifest {file} has an empty component name")]
    InvalidComponentName { file: String },

    /// Two files map to the same component name
    #[error("component '{component}' is defined by both {first} and {second}")]
    DuplicateComponent {
        component: String,
        first: String,
        second: String,
    },

    /// Account/region could not be resolved where they are required
    #[error("deployment environment unresolved: {reason}")]
    EnvironmentUnresolved { reason: String },

    /// Pipeline definition violates a structural rule
    #[error("invalid pipeline: {reason}")]
    InvalidPipeline { reason: String },

    /// Output could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EksforgeError {
    pub(crate) fn missing(key: &str) -> Self {
        Self::ConfigurationMissing {
            key: key.to_string(),
        }
    }
}

impl From<serde_json::Error> for EksforgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

impl From<serde_yaml_ng::Error> for EksforgeError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
