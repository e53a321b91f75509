use std::path::PathBuf;

use super::parse::{self, ParseAnomaly};
use super::platform::PlatformGuard;
use super::query::{self, sanitize_argument};
use super::report::{
    LoadReport, MemoryUsageReport, ProcessFilter, ProcessorDescriptor, ProcessorLoadSample,
};
use super::runner::{CommandOutput, CommandRunner, Invocation, TokioRunner};
use crate::config::Config;
use crate::error::{Result, StatsError};

/// Runs the stats queries through an injected [`CommandRunner`].
///
/// Every call spawns exactly one external command; nothing is cached or
/// shared between calls.
pub struct StatsExtractor<R> {
    wmic: PathBuf,
    runner: R,
}

impl StatsExtractor<TokioRunner> {
    pub fn system(config: &Config) -> Self {
        Self::new(config, TokioRunner::from_config(config))
    }
}

impl<R: CommandRunner> StatsExtractor<R> {
    pub fn new(config: &Config, runner: R) -> Self {
        StatsExtractor {
            wmic: config.wmic_path(),
            runner,
        }
    }

    /// Like [`StatsExtractor::new`], but fails up front on an unsupported host.
    pub fn new_checked(config: &Config, runner: R) -> Result<Self> {
        PlatformGuard::for_host(config).assert_supported()?;
        Ok(Self::new(config, runner))
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Load per logical CPU, in the order `wmic` lists them. Output without
    /// any numbers yields an empty list, not an error.
    #[tracing::instrument(name = "wincpu.total_load", level = "debug", skip_all)]
    pub async fn total_load(&self) -> Result<Vec<ProcessorLoadSample>> {
        let stdout = self.run_checked(&query::cpu_load(&self.wmic)).await?;
        Ok(parse::parse_load_percentages(&stdout))
    }

    /// Per-process load, optionally narrowed by pid or name substring.
    ///
    /// Nothing matching is an empty report. A name filter with no characters
    /// left after [`sanitize_argument`] is rejected instead of widening to
    /// every process.
    #[tracing::instrument(name = "wincpu.find_load", level = "debug", skip(self))]
    pub async fn find_load(&self, filter: Option<ProcessFilter>) -> Result<LoadReport> {
        let filter = match filter {
            Some(raw) => {
                let clean = sanitize_argument(&raw);
                if matches!(&clean, ProcessFilter::Name(name) if name.is_empty()) {
                    return Err(StatsError::EmptyFilter {
                        raw: raw.to_string(),
                    });
                }
                Some(clean)
            }
            None => None,
        };

        let invocation = query::process_load(&self.wmic, filter.as_ref());
        let output = self.runner.run(&invocation).await?;

        // findstr exits 1 with no output when nothing matched.
        let no_match = filter.is_some()
            && !output.success
            && output.stdout.trim().is_empty()
            && output.stderr.trim().is_empty();
        if no_match {
            return Ok(LoadReport::empty());
        }

        let stdout = check_output(&invocation, output)?;
        if stdout.trim().is_empty() {
            return Ok(LoadReport::empty());
        }

        let parsed = parse::parse_process_rows(&stdout);
        trace_anomalies(&parsed.anomalies);

        let mut report = LoadReport::from_entries(parsed.records);
        if let Some(ProcessFilter::Pid(pid)) = filter {
            report.retain(|entry| entry.process_id == pid);
        }
        Ok(report)
    }

    pub async fn node_load(&self) -> Result<LoadReport> {
        self.find_load(Some(ProcessFilter::from("node"))).await
    }

    /// Load of the calling process; at most one entry.
    pub async fn this_load(&self) -> Result<LoadReport> {
        self.find_load(Some(ProcessFilter::Pid(std::process::id()))).await
    }

    /// Installed processors, header row excluded. Fails when `wmic` printed no lines.
    #[tracing::instrument(name = "wincpu.cpu_info", level = "debug", skip_all)]
    pub async fn cpu_info(&self) -> Result<Vec<ProcessorDescriptor>> {
        let stdout = self.run_checked(&query::cpu_names(&self.wmic)).await?;
        parse::parse_processor_names(&stdout).ok_or(StatsError::NoOutput { query: "cpu_info" })
    }

    /// Sum of the working-set column over every process `tasklist` lists.
    #[tracing::instrument(name = "wincpu.total_memory_usage", level = "debug", skip_all)]
    pub async fn total_memory_usage(&self) -> Result<MemoryUsageReport> {
        let stdout = self.run_checked(&query::process_listing()).await?;
        let parsed = parse::parse_tasklist_memory(&stdout);
        trace_anomalies(&parsed.anomalies);

        let kilobytes = parsed
            .records
            .iter()
            .fold(0u64, |acc, kb| acc.saturating_add(*kb));
        Ok(MemoryUsageReport::from_kilobytes(kilobytes))
    }

    async fn run_checked(&self, invocation: &Invocation) -> Result<String> {
        let output = self.runner.run(invocation).await?;
        check_output(invocation, output)
    }
}

/// Stderr text or a failing exit status makes the call an error.
fn check_output(invocation: &Invocation, output: CommandOutput) -> Result<String> {
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        return Err(StatsError::ToolReported {
            program: invocation.label(),
            stderr: stderr.to_string(),
        });
    }
    if !output.success {
        return Err(StatsError::ExitStatus {
            program: invocation.label(),
            code: output.code,
        });
    }
    Ok(output.stdout)
}

fn trace_anomalies(anomalies: &[ParseAnomaly]) {
    for anomaly in anomalies {
        tracing::trace!(%anomaly, "skipped row");
    }
}
