use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const SYSTEM_ROOT_VAR: &str = "SystemRoot";

/// Location of the external tools and per-call limits.
///
/// The `wmic.exe` path is derived once from `system_root`; nothing re-reads
/// the environment after construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub system_root: PathBuf,
    /// Upper bound for a single external command, in milliseconds. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config::from_system_root(std::env::var_os(SYSTEM_ROOT_VAR))
    }
}

impl Config {
    pub fn from_system_root(root: Option<OsString>) -> Self {
        let system_root = root
            .filter(|r| !r.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/"));
        Config {
            system_root,
            timeout_ms: None,
        }
    }

    pub fn wmic_path(&self) -> PathBuf {
        self.system_root
            .join("System32")
            .join("wbem")
            .join("wmic.exe")
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
