//! eksforge CLI - EKS cluster and delivery pipeline synthesizer
//!
//! Usage: eksforge [-c KEY=VALUE]... <COMMAND>
//!
//! Commands:
//!   cluster    Synthesize the cluster stack
//!   pipeline   Synthesize the pipeline stack and its buildspecs
//!   manifests  List manifest groups
//!   diff       Compare a fresh synthesis with the output directory
//!   version    Show version information

mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::Invocation;
use eksforge::config::{parse_context_pair, Config};
use eksforge::telemetry::{init_tracing, level_for_verbosity};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json, level_for_verbosity(cli.verbose));

    let command_name = command_name(&cli.command);
    let json = cli.json;
    let result = run(cli);

    if let Err(err) = &result {
        tracing::debug!(error = ?err, "command failed");
        if json {
            ui::json::emit_event(&ui::json::events::ErrorEvent::new(
                command_name,
                format!("{:#}", err),
            ))
            .ok();
        }
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        return commands::version::cmd_version(cli.json);
    }

    let loaded = Config::load_layered(&cli.project, cli.config.as_deref())?;
    tracing::debug!(sources = ?loaded.sources, "loaded configuration");
    if !cli.json {
        ui::output::print_config_warnings(&loaded.warnings);
    }

    let mut config = loaded.config;
    for raw in &cli.context {
        let (key, value) = parse_context_pair(raw)?;
        config.context.set(key, value);
    }
    for key in config.context.unknown_keys() {
        tracing::warn!(key, "unrecognized context key");
    }

    let inv = Invocation {
        project: cli.project,
        config,
        json: cli.json,
    };

    match cli.command {
        Commands::Cluster {
            manifests,
            out,
            stdout,
        } => commands::cluster::cmd_cluster(
            &inv.with_manifest_dir(manifests).with_output_dir(out),
            stdout,
        ),
        Commands::Pipeline { out, stdout } => {
            commands::pipeline::cmd_pipeline(&inv.with_output_dir(out), stdout)
        }
        Commands::Manifests { manifests } => {
            commands::manifests::cmd_manifests(&inv.with_manifest_dir(manifests))
        }
        Commands::Diff { stack, out, fail } => {
            commands::diff::cmd_diff(&inv.with_output_dir(out), stack, fail)
        }
        Commands::Version => commands::version::cmd_version(inv.json),
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Cluster { .. } => "cluster",
        Commands::Pipeline { .. } => "pipeline",
        Commands::Manifests { .. } => "manifests",
        Commands::Diff { .. } => "diff",
        Commands::Version => "version",
    }
}
