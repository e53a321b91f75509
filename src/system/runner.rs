use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::platform;
use crate::config::Config;
use crate::error::{Result, StatsError};

/// One external command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Spawned directly, no shell involved.
    Exec { program: PathBuf, args: Vec<String> },
    /// Handed to the platform shell as a single line (needed for pipes).
    Shell { line: String },
}

impl Invocation {
    pub fn exec<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::Exec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn shell(line: impl Into<String>) -> Self {
        Invocation::Shell { line: line.into() }
    }

    /// Short program name for error messages.
    pub fn label(&self) -> String {
        let program = match self {
            Invocation::Exec { program, .. } => program.as_path(),
            Invocation::Shell { line } => {
                Path::new(line.split_whitespace().next().unwrap_or_default().trim_matches('"'))
            }
        };
        program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs one [`Invocation`] to completion and captures its output.
///
/// A launch failure is an error; a non-zero exit or stderr text is not, and
/// is left for the caller to judge.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// Spawns through `tokio::process`. Dropping the future kills the child.
#[derive(Clone, Debug, Default)]
pub struct TokioRunner {
    timeout: Option<Duration>,
}

impl TokioRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        TokioRunner { timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.timeout())
    }
}

impl CommandRunner for TokioRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let program = invocation.label();
        tracing::debug!(%program, ?invocation, timeout = ?self.timeout, "spawning query tool");

        let mut cmd = match invocation {
            Invocation::Exec { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            Invocation::Shell { line } => platform::shell_command(line),
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(after) => tokio::time::timeout(after, cmd.output())
                .await
                .map_err(|_| StatsError::Timeout {
                    program: program.clone(),
                    after,
                })?,
            None => cmd.output().await,
        }
        .map_err(|source| StatsError::Launch {
            program: program.clone(),
            source,
        })?;

        tracing::debug!(%program, status = ?output.status.code(), "query tool finished");

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
