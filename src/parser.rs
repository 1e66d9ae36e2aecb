//! Manifest parser
//!
//! Discovers manifest files in a directory and decodes each into its YAML
//! documents.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::manifest::{component_name, content_digest, ManifestGroup, ManifestMatch};
use crate::domain::ports::ManifestSource;
use crate::error::{EksforgeError, EksforgeResult};
use crate::infrastructure::fs::LocalManifestDir;

/// Decode every document in a (possibly multi-document) YAML string.
///
/// Merge keys (`<<: *anchor`) are expanded. Documents that decode to null,
/// whether empty (a trailing `---`) or an explicit `null`, are dropped.
pub fn decode_documents(content: &str, file: &Path) -> EksforgeResult<Vec<serde_json::Value>> {
    let decode_error = |message: String| EksforgeError::ManifestDecode {
        file: file.to_path_buf(),
        message,
    };

    let mut documents = Vec::new();
    for document in serde_yaml_ng::Deserializer::from_str(content) {
        let mut value = serde_yaml_ng::Value::deserialize(document)
            .map_err(|e| decode_error(format_yaml_error(content, &e)))?;
        value
            .apply_merge()
            .map_err(|e| decode_error(format_yaml_error(content, &e)))?;
        if value.is_null() {
            continue;
        }
        let json = serde_json::to_value(&value)
            .map_err(|e| decode_error(format!("Unsupported YAML value - {}", e)))?;
        documents.push(json);
    }
    Ok(documents)
}

/// Collect manifest groups from a source, in listing order.
pub fn parse_source(
    source: &dyn ManifestSource,
    rule: ManifestMatch,
) -> EksforgeResult<Vec<ManifestGroup>> {
    let location = source.location();
    let entries = source.entries()?;
    debug!(dir = %location.display(), ?entries, "listed manifest directory");

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut groups = Vec::new();

    for name in entries {
        if !rule.matches(&name) {
            continue;
        }
        if rule.is_loose_hit(&name) {
            warn!(file = %name, "treating file as manifest because its name contains 'yaml'");
        }

        let component = component_name(&name);
        if component.is_empty() {
            return Err(EksforgeError::InvalidComponentName { file: name });
        }
        if let Some(first) = seen.get(component) {
            return Err(EksforgeError::DuplicateComponent {
                component: component.to_string(),
                first: first.clone(),
                second: name,
            });
        }

        let content = source.read(&name)?;
        let documents = decode_documents(&content, &location.join(&name))?;
        debug!(file = %name, component, documents = documents.len(), "decoded manifest");

        seen.insert(component.to_string(), name.clone());
        groups.push(ManifestGroup {
            component: component.to_string(),
            source_digest: content_digest(&content),
            source_file: name,
            documents,
        });
    }

    Ok(groups)
}

/// Collect manifest groups from a directory on disk.
pub fn parse_directory(dir: &Path, rule: ManifestMatch) -> EksforgeResult<Vec<ManifestGroup>> {
    let source = LocalManifestDir::open(dir)?;
    parse_source(&source, rule)
}

fn format_yaml_error(content: &str, err: &serde_yaml_ng::Error) -> String {
    let mut message = String::new();

    let err_str = err.to_string();
    if let Some(line) = err.location().map(|loc| loc.line()) {
        message.push_str(&format!("Line {}: Invalid YAML - {}", line, err_str));
        if let Some(text) = content.lines().nth(line.saturating_sub(1)) {
            message.push_str(&format!("\n  | {}", text));
        }
    } else {
        message.push_str(&format!("Invalid YAML - {}", err_str));
    }

    if err_str.contains("mapping values are not allowed") {
        message.push_str("\nHint: Strings with colons need quotes: value: \"a: b\"");
    } else if err_str.contains("expected a string") {
        message.push_str("\nHint: Kubernetes manifests only use string keys");
    }

    message
}
