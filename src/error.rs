//! Error type shared by the platform guard, the runner and the extractor.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors surfaced by `wincpu` operations.
///
/// Nothing in the library logs these; presenting them is up to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("unsupported platform: requires windows, host is {os}")]
    UnsupportedOs { os: String },

    #[error("query tool not found at {}", .path.display())]
    ToolMissing { path: PathBuf },

    #[error("query tool at {} is not accessible: {source}", .path.display())]
    ToolInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} reported an error: {stderr}")]
    ToolReported { program: String, stderr: String },

    #[error("{program} exited with status {}", describe_code(.code))]
    ExitStatus { program: String, code: Option<i32> },

    #[error("{program} did not finish within {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("{query} produced no output")]
    NoOutput { query: &'static str },

    #[error("filter {raw:?} has no characters left after sanitizing")]
    EmptyFilter { raw: String },
}

impl StatsError {
    /// True for the guard's strict-mode failures.
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(
            self,
            StatsError::UnsupportedOs { .. }
                | StatsError::ToolMissing { .. }
                | StatsError::ToolInaccessible { .. }
        )
    }

    /// True when the external command itself failed.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            StatsError::Launch { .. }
                | StatsError::ToolReported { .. }
                | StatsError::ExitStatus { .. }
                | StatsError::Timeout { .. }
        )
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

pub type Result<T, E = StatsError> = std::result::Result<T, E>;
