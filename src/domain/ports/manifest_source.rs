//! Manifest Source Port
//!
//! Abstracts where manifest files come from so the cluster builder can be
//! exercised without touching disk.

use std::path::PathBuf;

use crate::error::EksforgeResult;

/// A flat directory of manifest files.
pub trait ManifestSource {
    /// Location used in error messages and logs
    fn location(&self) -> PathBuf;

    /// Entry names in listing order (not sorted)
    fn entries(&self) -> EksforgeResult<Vec<String>>;

    /// Full content of one entry
    fn read(&self, name: &str) -> EksforgeResult<String>;
}

/// In-memory source for tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestSource {
    pub files: Vec<(String, String)>,
}

#[cfg(test)]
impl MemoryManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: &str, content: &str) -> Self {
        self.files.push((name.to_string(), content.to_string()));
        self
    }
}

#[cfg(test)]
impl ManifestSource for MemoryManifestSource {
    fn location(&self) -> PathBuf {
        PathBuf::from("memory")
    }

    fn entries(&self) -> EksforgeResult<Vec<String>> {
        Ok(self.files.iter().map(|(name, _)| name.clone()).collect())
    }

    fn read(&self, name: &str) -> EksforgeResult<String> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| crate::error::EksforgeError::ManifestUnreadable {
                file: self.location().join(name),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            })
    }
}
