//! Synthesis output
//!
//! Renders stacks into files (templates and buildspecs), writes them into
//! the output directory and diffs fresh renders against what is on disk.

use std::fs;
use std::path::{Path, PathBuf};

use similar::{ChangeTag, TextDiff};
use tracing::info;

use super::deploy::render_bundle;
use crate::domain::cluster::ClusterRequest;
use crate::domain::pipeline::PipelineDefinition;
use crate::domain::stack::Stack;
use crate::error::EksforgeResult;
use crate::infrastructure::fs::atomic_write;

/// Directory under the output dir holding rendered buildspecs.
pub const BUILDSPEC_DIR: &str = "buildspecs";

/// One rendered file, path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

/// Template first, then the deploy bundle the deploy project applies.
pub fn render_cluster(stack: &Stack<ClusterRequest>) -> EksforgeResult<Vec<Artifact>> {
    let mut artifacts = vec![Artifact {
        path: PathBuf::from(stack.template_file_name()),
        content: stack.to_template()?,
    }];
    artifacts.extend(render_bundle(stack)?);
    Ok(artifacts)
}

/// Template plus one `buildspecs/<project>.yml` per build project.
pub fn render_pipeline(stack: &Stack<PipelineDefinition>) -> EksforgeResult<Vec<Artifact>> {
    let mut artifacts = vec![Artifact {
        path: PathBuf::from(stack.template_file_name()),
        content: stack.to_template()?,
    }];
    for project in &stack.request.build_projects {
        artifacts.push(Artifact {
            path: Path::new(BUILDSPEC_DIR).join(format!("{}.yml", project.id)),
            content: project.build_spec.to_yaml()?,
        });
    }
    Ok(artifacts)
}

/// Write all artifacts; returns absolute paths written.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> EksforgeResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = out_dir.join(&artifact.path);
        atomic_write(&path, artifact.content.as_bytes())?;
        info!(file = %path.display(), bytes = artifact.content.len(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

/// Difference between an artifact on disk and a fresh render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDiff {
    pub path: PathBuf,
    /// Nothing on disk yet
    pub is_new: bool,
    pub additions: usize,
    pub deletions: usize,
    pub unified: String,
}

impl ArtifactDiff {
    pub fn has_changes(&self) -> bool {
        self.is_new || self.additions > 0 || self.deletions > 0
    }

    pub fn summary(&self) -> String {
        format!("+{}, -{}", self.additions, self.deletions)
    }
}

/// Compare fresh renders against files in `out_dir`.
pub fn diff_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> EksforgeResult<Vec<ArtifactDiff>> {
    let mut diffs = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let on_disk = out_dir.join(&artifact.path);
        let (old, is_new) = match fs::read_to_string(&on_disk) {
            Ok(content) => (content, false),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (String::new(), true),
            Err(e) => return Err(e.into()),
        };
        diffs.push(diff_text(&artifact.path, &old, &artifact.content, is_new));
    }
    Ok(diffs)
}

fn diff_text(path: &Path, old: &str, new: &str, is_new: bool) -> ArtifactDiff {
    let text_diff = TextDiff::from_lines(old, new);

    let (mut additions, mut deletions) = (0, 0);
    for change in text_diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => additions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }

    let display = path.display().to_string();
    let unified = text_diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", display), &format!("b/{}", display))
        .to_string();

    ArtifactDiff {
        path: path.to_path_buf(),
        is_new,
        additions,
        deletions,
        unified,
    }
}
