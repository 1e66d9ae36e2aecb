//! Configuration loading
//!
//! Layers, lowest priority first:
//! 1. Built-in defaults
//! 2. User config (`<config_dir>/eksforge/config.toml`)
//! 3. Project config (`eksforge.toml`, or the `--config` path)
//! 4. Environment variables (`EKSFORGE_*`)
//!
//! Command-line context pairs are merged on top by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::manifest::ManifestMatch;
use crate::error::{EksforgeError, EksforgeResult};

use super::env_validator::{suggest, EnvVarValidator};
use super::types::Config;

pub const PROJECT_CONFIG_FILE: &str = "eksforge.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Result of layered loading.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
    /// Files that contributed, lowest priority first
    pub sources: Vec<PathBuf>,
}

/// Load one file and collect unknown-key warnings.
pub fn load_with_warnings(path: &Path) -> EksforgeResult<(Config, Vec<ConfigWarning>)> {
    let (table, warnings) = read_layer(path)?;
    let config = toml::Value::Table(table).try_into::<Config>().map_err(|e| invalid(path, e))?;
    Ok((config, warnings))
}

/// Load all layers; see module docs for precedence.
pub fn load_layered(project_root: &Path, explicit: Option<&Path>) -> EksforgeResult<LoadedConfig> {
    let mut merged = toml::Table::new();
    let mut loaded = LoadedConfig::default();

    let project_file = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(project_root.join(PROJECT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    for path in user_config_path()
        .filter(|p| p.is_file())
        .into_iter()
        .chain(project_file)
    {
        debug!(file = %path.display(), "loading config layer");
        let (table, warnings) = read_layer(&path)?;
        merge_tables(&mut merged, table);
        loaded.warnings.extend(warnings);
        loaded.sources.push(path);
    }

    let config = toml::Value::Table(merged).try_into::<Config>().map_err(|e| {
        EksforgeError::InvalidConfig {
            file: loaded.sources.last().cloned().unwrap_or_default(),
            message: e.to_string(),
        }
    })?;
    loaded.config = with_env_overrides(config);
    Ok(loaded)
}

/// Apply environment variable overrides (EKSFORGE_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_env_lookup(config, |key| std::env::var(key).ok())
}

pub(crate) fn with_env_lookup<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup("EKSFORGE_MANIFEST_DIR").filter(|v| !v.is_empty()) {
        config.project.manifest_dir = PathBuf::from(dir);
    }

    if let Some(dir) = lookup("EKSFORGE_OUTPUT_DIR").filter(|v| !v.is_empty()) {
        config.project.output_dir = PathBuf::from(dir);
    }

    if let Some(mode) = lookup("EKSFORGE_MANIFEST_MATCH") {
        let validator =
            EnvVarValidator::new("EKSFORGE_MANIFEST_MATCH", &["substring", "extension"]);
        config.project.manifest_match = validator.parse(
            &mode,
            |v| match v.to_lowercase().as_str() {
                "substring" => Some(ManifestMatch::Substring),
                "extension" => Some(ManifestMatch::Extension),
                _ => None,
            },
            config.project.manifest_match,
        );
    }

    if let Some(version) = lookup("EKSFORGE_KUBERNETES_VERSION").filter(|v| !v.is_empty()) {
        config.cluster.kubernetes_version = version;
    }

    config
}

fn read_layer(path: &Path) -> EksforgeResult<(toml::Table, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);
    let _: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| invalid(path, e))?;

    let table: toml::Table = toml::from_str(&content).map_err(|e| invalid(path, e))?;

    let mut warnings: Vec<ConfigWarning> = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest(&key, CONFIG_KEYS).map(str::to_string),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    // Context is a free-form map, so serde_ignored never sees typos there.
    if let Some(toml::Value::Table(context)) = table.get("context") {
        for key in context.keys() {
            if super::context::KNOWN_KEYS.contains(&key.as_str()) {
                continue;
            }
            warnings.push(ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, key),
                suggestion: suggest(key, super::context::KNOWN_KEYS).map(str::to_string),
            });
        }
    }

    Ok((table, warnings))
}

fn invalid(path: &Path, err: impl std::fmt::Display) -> EksforgeError {
    EksforgeError::InvalidConfig {
        file: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Deep-merge `overlay` into `base`; overlay scalars and arrays replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let incoming = match value {
            toml::Value::Table(incoming) => incoming,
            other => {
                base.insert(key, other);
                continue;
            }
        };
        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
        } else {
            base.insert(key, toml::Value::Table(incoming));
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("eksforge").join("config.toml"))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

const CONFIG_KEYS: &[&str] = &[
    "context",
    "project",
    "manifest_dir",
    "conftest_dir",
    "output_dir",
    "manifest_match",
    "cluster",
    "stack_name",
    "kubernetes_version",
    "pipeline",
    "branch",
    "build_image",
    "compute_type",
    "deploy_pre_build",
    "deploy_build",
];
