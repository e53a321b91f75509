//! Command lines for each query, and the filter sanitizer that guards the one
//! place caller input reaches a shell.

use std::path::Path;

use super::report::ProcessFilter;
use super::runner::Invocation;

pub const TASKLIST: &str = "tasklist";

const PERF_PROCESS_CLASS: &str = "Win32_PerfFormattedData_PerfProc_Process";
const PERF_PROCESS_COLUMNS: &str = "Name,PercentProcessorTime,IDProcess";

pub fn cpu_load(wmic: &Path) -> Invocation {
    Invocation::exec(wmic, ["cpu", "get", "loadpercentage"])
}

pub fn cpu_names(wmic: &Path) -> Invocation {
    Invocation::exec(wmic, ["cpu", "get", "Name"])
}

pub fn process_listing() -> Invocation {
    Invocation::exec(TASKLIST, ["/FO", "csv", "/NH"])
}

/// Unfiltered enumeration runs `wmic` directly. A filter pipes through
/// `findstr /i /c:`, so `filter` must already be sanitized.
pub fn process_load(wmic: &Path, filter: Option<&ProcessFilter>) -> Invocation {
    match filter {
        None => Invocation::exec(wmic, ["path", PERF_PROCESS_CLASS, "get", PERF_PROCESS_COLUMNS]),
        Some(filter) => Invocation::shell(format!(
            "\"{}\" path {PERF_PROCESS_CLASS} get {PERF_PROCESS_COLUMNS} | findstr /i /c:{filter}",
            wmic.display()
        )),
    }
}

/// Restrict a filter to characters that are inert on a command line.
///
/// Pids pass through. Names are cut at the first whitespace and then reduced
/// to ASCII letters, digits and `.`. This is an allow-list, not shell
/// escaping: a name with a space in it ("Windows Defender") can only be
/// matched by its first word.
pub fn sanitize_argument(filter: &ProcessFilter) -> ProcessFilter {
    match filter {
        ProcessFilter::Pid(pid) => ProcessFilter::Pid(*pid),
        ProcessFilter::Name(name) => {
            let first = name.split(char::is_whitespace).next().unwrap_or_default();
            ProcessFilter::Name(
                first
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
                    .collect(),
            )
        }
    }
}
