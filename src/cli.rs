use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// eksforge - EKS cluster and delivery pipeline synthesizer
#[derive(Parser, Debug)]
#[command(name = "eksforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI (NDJSON events)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root (holds eksforge.toml and the manifest directory)
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Config file to use instead of <project>/eksforge.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Context parameter, e.g. -c vpc-id=vpc-0abc (repeatable)
    #[arg(short = 'c', long = "context", global = true, value_name = "KEY=VALUE")]
    pub context: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize the cluster stack
    Cluster {
        /// Override the manifest directory (relative to the project root)
        #[arg(short, long)]
        manifests: Option<PathBuf>,

        /// Override the output directory (relative to the project root)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the template instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Synthesize the pipeline stack and its buildspecs
    Pipeline {
        /// Override the output directory (relative to the project root)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the template instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// List manifest groups discovered in the manifest directory
    Manifests {
        /// Override the manifest directory (relative to the project root)
        #[arg(short, long)]
        manifests: Option<PathBuf>,
    },

    /// Compare a fresh synthesis with the files in the output directory
    Diff {
        /// Which stack to compare
        #[arg(value_enum)]
        stack: StackKind,

        /// Override the output directory (relative to the project root)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Exit non-zero when anything differs
        #[arg(long)]
        fail: bool,
    },

    /// Show version information
    Version,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Cluster,
    Pipeline,
}
