use std::time::Instant;

use anyhow::Result;

use eksforge::application::{cluster_stack, render_cluster, write_artifacts};
use eksforge::domain::stack::DeploymentEnv;

use super::Invocation;
use crate::ui::json::emit_event;
use crate::ui::json::events::{ArtifactEvent, CompleteEvent, StartEvent};
use crate::ui::output::{maybe_warn_existing_vpc, print_written};

const COMMAND: &str = "cluster";

pub fn cmd_cluster(inv: &Invocation, stdout: bool) -> Result<()> {
    let started = Instant::now();
    if inv.json {
        emit_event(&StartEvent::new(COMMAND))?;
    }

    let stack = cluster_stack(
        &inv.config,
        &inv.config.context,
        DeploymentEnv::from_process_env(),
        inv.project_root(),
    )?;
    maybe_warn_existing_vpc(&stack.request.network, inv.json);

    let artifacts = render_cluster(&stack)?;
    if stdout {
        // template only; the deploy bundle is meaningful on disk
        if let Some(template) = artifacts.first() {
            print!("{}", template.content);
        }
        return Ok(());
    }

    let out_dir = inv.output_dir();
    let written = write_artifacts(&out_dir, &artifacts)?;

    if inv.json {
        for (path, artifact) in written.iter().zip(&artifacts) {
            emit_event(&ArtifactEvent::new(
                COMMAND,
                path.display().to_string(),
                artifact.content.len(),
            ))?;
        }
        emit_event(
            &CompleteEvent::success(COMMAND)
                .with_stack(&stack.name)
                .with_duration(started.elapsed().as_millis() as u64),
        )?;
    } else {
        println!(
            "Cluster stack {} ({} manifest group(s), {} document(s))",
            stack.name,
            stack.request.manifests.len(),
            stack.request.document_count()
        );
        print_written(&out_dir, &written);
    }
    Ok(())
}
