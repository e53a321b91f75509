//! Windows CPU load, processor inventory and memory usage, read from the
//! `wmic` and `tasklist` command-line tools.
//!
//! [`PlatformGuard`] says whether the host can answer at all;
//! [`StatsExtractor`] runs the queries and shapes their output.

pub mod config;
pub mod error;
pub mod format;
pub mod system;

pub use config::Config;
pub use error::{Result, StatsError};
pub use system::extractor::StatsExtractor;
pub use system::platform::PlatformGuard;
pub use system::query::sanitize_argument;
pub use system::report::{
    LoadReport, MemoryUsageReport, ProcessEntry, ProcessFilter, ProcessorDescriptor,
    ProcessorLoadSample,
};
pub use system::runner::{CommandOutput, CommandRunner, Invocation, TokioRunner};
