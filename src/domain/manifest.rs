//! Manifest value objects
//!
//! A manifest directory holds Kubernetes resource files. Each matching file
//! becomes one [`ManifestGroup`] named after its component.

use serde::{Deserialize, Serialize};

/// Rule deciding which directory entries are manifest files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ManifestMatch {
    /// Name contains `yaml` anywhere (case-sensitive).
    ///
    /// This is the historical rule. It accepts `myyaml.json` and rejects
    /// `service.yml`.
    #[default]
    Substring,
    /// Name ends in `.yaml` or `.yml`.
    Extension,
}

impl ManifestMatch {
    /// Whether a directory entry with this name is a manifest file.
    pub fn matches(self, file_name: &str) -> bool {
        match self {
            ManifestMatch::Substring => file_name.contains("yaml"),
            ManifestMatch::Extension => {
                file_name.ends_with(".yaml") || file_name.ends_with(".yml")
            }
        }
    }

    /// Whether the substring rule accepts a name the extension rule would not.
    pub fn is_loose_hit(self, file_name: &str) -> bool {
        self == ManifestMatch::Substring
            && self.matches(file_name)
            && !ManifestMatch::Extension.matches(file_name)
    }
}

/// Component name for a manifest file: everything before the first `.`.
///
/// `ingress.yaml` -> `ingress`, `app.v1.yaml` -> `app`, `.hidden.yaml` -> ``.
pub fn component_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or_default()
}

/// All documents decoded from one manifest file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestGroup {
    /// Resource id of the manifest-apply request
    pub component: String,
    /// File name the group was read from
    pub source_file: String,
    /// `sha256:` digest of the raw file content
    pub source_digest: String,
    /// Decoded documents in file order
    pub documents: Vec<serde_json::Value>,
}

impl ManifestGroup {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// `kind/name` labels of the documents, for listings.
    pub fn resource_labels(&self) -> Vec<String> {
        self.documents
            .iter()
            .map(|doc| {
                let kind = doc.get("kind").and_then(|k| k.as_str()).unwrap_or("?");
                let name = doc
                    .pointer("/metadata/name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("?");
                format!("{}/{}", kind, name)
            })
            .collect()
    }
}

/// `sha256:<hex>` digest of manifest content.
pub fn content_digest(content: &str) -> String {
    use sha2::{Digest, Sha256};
    format!("sha256:{:x}", Sha256::digest(content.as_bytes()))
}
