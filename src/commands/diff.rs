use anyhow::Result;

use eksforge::application::{
    cluster_stack, diff_artifacts, pipeline_stack, render_cluster, render_pipeline, ArtifactDiff,
};
use eksforge::domain::stack::DeploymentEnv;

use super::Invocation;
use crate::cli::StackKind;
use crate::ui::json::emit_event;
use crate::ui::json::events::{CompleteEvent, DiffEvent, StartEvent};

const COMMAND: &str = "diff";

pub fn cmd_diff(inv: &Invocation, kind: StackKind, fail: bool) -> Result<()> {
    if inv.json {
        emit_event(&StartEvent::new(COMMAND))?;
    }

    let env = DeploymentEnv::from_process_env();
    let (stack_name, artifacts) = match kind {
        StackKind::Cluster => {
            let stack = cluster_stack(&inv.config, &inv.config.context, env, inv.project_root())?;
            (stack.name.clone(), render_cluster(&stack)?)
        }
        StackKind::Pipeline => {
            let stack = pipeline_stack(&inv.config, &inv.config.context, env)?;
            (stack.name.clone(), render_pipeline(&stack)?)
        }
    };

    let diffs = diff_artifacts(&inv.output_dir(), &artifacts)?;
    let changed: Vec<&ArtifactDiff> = diffs.iter().filter(|d| d.has_changes()).collect();

    if inv.json {
        for diff in &diffs {
            emit_event(&DiffEvent {
                event: "diff",
                command: COMMAND,
                path: diff.path.display().to_string(),
                is_new: diff.is_new,
                additions: diff.additions,
                deletions: diff.deletions,
            })?;
        }
        let complete = if changed.is_empty() || !fail {
            CompleteEvent::success(COMMAND)
        } else {
            CompleteEvent::failure(COMMAND)
        };
        emit_event(&complete.with_stack(&stack_name))?;
    } else if changed.is_empty() {
        println!("✓ {} is up to date", stack_name);
    } else {
        for diff in &changed {
            if diff.is_new {
                println!("+ {} (new)", diff.path.display());
            } else {
                println!("~ {} ({})", diff.path.display(), diff.summary());
            }
            print!("{}", diff.unified);
        }
        println!("\n{} of {} file(s) differ", changed.len(), diffs.len());
    }

    if fail && !changed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
