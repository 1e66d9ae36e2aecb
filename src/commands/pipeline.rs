use std::time::Instant;

use anyhow::Result;

use eksforge::application::{pipeline_stack, render_pipeline, write_artifacts};
use eksforge::domain::stack::DeploymentEnv;

use super::Invocation;
use crate::ui::json::emit_event;
use crate::ui::json::events::{ArtifactEvent, CompleteEvent, StartEvent};
use crate::ui::output::print_written;

const COMMAND: &str = "pipeline";

pub fn cmd_pipeline(inv: &Invocation, stdout: bool) -> Result<()> {
    let started = Instant::now();
    if inv.json {
        emit_event(&StartEvent::new(COMMAND))?;
    }

    let stack = pipeline_stack(
        &inv.config,
        &inv.config.context,
        DeploymentEnv::from_process_env(),
    )?;
    let artifacts = render_pipeline(&stack)?;

    if stdout {
        // Buildspecs are embedded in the template; print only that.
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
            "Pipeline stack {} (pipeline {}: {})",
            stack.name,
            stack.request.name,
            stack.request.stage_names().join(" → ")
        );
        print_written(&out_dir, &written);
    }
    Ok(())
}
