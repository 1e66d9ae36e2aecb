//! Shared JSON event types for consistent CLI output.
//!
//! Every command emits a `start` event, zero or more data events and a
//! `complete` (or `error`) event, one JSON object per line.

use serde::Serialize;

/// Event emitted when a command starts.
#[derive(Debug, Clone, Serialize)]
pub struct StartEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub version: &'static str,
}

impl<'a> StartEvent<'a> {
    pub fn new(command: &'a str) -> Self {
        Self {
            event: "start",
            command,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Event emitted when a command completes.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl<'a> CompleteEvent<'a> {
    pub fn success(command: &'a str) -> Self {
        Self {
            event: "complete",
            command,
            success: true,
            stack: None,
            duration_ms: None,
        }
    }

    pub fn failure(command: &'a str) -> Self {
        Self {
            success: false,
            ..Self::success(command)
        }
    }

    pub fn with_stack(mut self, stack: &'a str) -> Self {
        self.stack = Some(stack);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Event emitted when a command fails.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub message: String,
}

impl<'a> ErrorEvent<'a> {
    pub fn new(command: &'a str, message: impl Into<String>) -> Self {
        Self {
            event: "error",
            command,
            message: message.into(),
        }
    }
}

/// One file written (or that would be written) to the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub path: String,
    pub bytes: usize,
}

impl<'a> ArtifactEvent<'a> {
    pub fn new(command: &'a str, path: impl Into<String>, bytes: usize) -> Self {
        Self {
            event: "artifact",
            command,
            path: path.into(),
            bytes,
        }
    }
}

/// One manifest group discovered in the manifest directory.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub component: &'a str,
    pub file: &'a str,
    pub documents: usize,
    pub digest: &'a str,
    pub resources: Vec<String>,
}

/// Per-file comparison between the output directory and a fresh synthesis.
#[derive(Debug, Clone, Serialize)]
pub struct DiffEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub path: String,
    pub is_new: bool,
    pub additions: usize,
    pub deletions: usize,
}
