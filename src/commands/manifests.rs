use anyhow::Result;

use eksforge::parser::parse_directory;

use super::Invocation;
use crate::ui::json::emit_event;
use crate::ui::json::events::{CompleteEvent, ManifestEvent, StartEvent};

const COMMAND: &str = "manifests";

pub fn cmd_manifests(inv: &Invocation) -> Result<()> {
    if inv.json {
        emit_event(&StartEvent::new(COMMAND))?;
    }

    let dir = inv.config.manifest_dir(inv.project_root());
    let groups = parse_directory(&dir, inv.config.project.manifest_match)?;

    if inv.json {
        for group in &groups {
            emit_event(&ManifestEvent {
                event: "manifest",
                command: COMMAND,
                component: &group.component,
                file: &group.source_file,
                documents: group.len(),
                digest: &group.source_digest,
                resources: group.resource_labels(),
            })?;
        }
        emit_event(&CompleteEvent::success(COMMAND))?;
        return Ok(());
    }

    if groups.is_empty() {
        println!("No manifest files in {}", dir.display());
        return Ok(());
    }

    println!("Manifests in {}:", dir.display());
    for group in &groups {
        println!(
            "  {:<24} {} ({} document(s))",
            group.component,
            group.source_file,
            group.len()
        );
        for label in group.resource_labels() {
            println!("    - {}", label);
        }
    }
    Ok(())
}
