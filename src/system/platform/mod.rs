use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, StatsError};

/// The only OS family with `wmic.exe` and `tasklist`.
pub const REQUIRED_OS: &str = "windows";

pub trait PlatformExtensions {
    /// Ok when `path` is a regular file this process can open and run.
    fn check_tool_access(path: &Path) -> io::Result<()>;
    /// A command that hands `line` to the platform shell unmodified.
    fn shell_command(line: &str) -> tokio::process::Command;
}

#[cfg(target_os = "windows")]
mod windows;
#[cfg(not(target_os = "windows"))]
mod unix;

#[cfg(not(target_os = "windows"))]
use unix as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn shell_command(line: &str) -> tokio::process::Command {
    platform_impl::Platform::shell_command(line)
}

/// Answers whether this host can run the stats queries at all.
#[derive(Clone, Debug)]
pub struct PlatformGuard {
    os: String,
    tool: PathBuf,
}

impl PlatformGuard {
    pub fn for_host(config: &Config) -> Self {
        Self::new(std::env::consts::OS, config.wmic_path())
    }

    pub fn new(os: impl Into<String>, tool: impl Into<PathBuf>) -> Self {
        PlatformGuard {
            os: os.into(),
            tool: tool.into(),
        }
    }

    pub fn tool_path(&self) -> &Path {
        &self.tool
    }

    /// Non-failing probe. Any filesystem error counts as unsupported.
    pub fn is_supported(&self) -> bool {
        self.assert_supported().is_ok()
    }

    /// Strict probe: says why the host is unsupported.
    ///
    /// The OS family is checked first, so a non-Windows host never touches
    /// the filesystem.
    pub fn assert_supported(&self) -> Result<()> {
        if self.os != REQUIRED_OS {
            return Err(StatsError::UnsupportedOs {
                os: self.os.clone(),
            });
        }

        platform_impl::Platform::check_tool_access(&self.tool).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StatsError::ToolMissing {
                    path: self.tool.clone(),
                }
            } else {
                StatsError::ToolInaccessible {
                    path: self.tool.clone(),
                    source,
                }
            }
        })
    }
}
