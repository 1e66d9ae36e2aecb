//! Local File System
//!
//! Disk-backed manifest source and atomic writes for synthesized output.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::ports::ManifestSource;
use crate::error::{EksforgeError, EksforgeResult};

/// Manifest directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalManifestDir {
    root: PathBuf,
}

impl LocalManifestDir {
    /// Open a directory, failing if it does not exist.
    pub fn open(root: &Path) -> EksforgeResult<Self> {
        if !root.is_dir() {
            return Err(EksforgeError::ManifestDirNotFound {
                path: root.to_path_buf(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl ManifestSource for LocalManifestDir {
    fn location(&self) -> PathBuf {
        self.root.clone()
    }

    fn entries(&self) -> EksforgeResult<Vec<String>> {
        let unreadable = |source: std::io::Error| EksforgeError::ManifestDirUnreadable {
            path: self.root.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> EksforgeResult<String> {
        let file = self.root.join(name);
        std::fs::read_to_string(&file).map_err(|source| match source.kind() {
            // read_to_string reports bad UTF-8 as InvalidData
            std::io::ErrorKind::InvalidData => EksforgeError::ManifestDecode {
                file,
                message: "content is not valid UTF-8".to_string(),
            },
            _ => EksforgeError::ManifestUnreadable { file, source },
        })
    }
}

/// Write via tempfile + rename so readers never see a partial file.
pub fn atomic_write(path: &Path, content: &[u8]) -> EksforgeResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
