use std::fmt;

use serde::Serialize;

/// One logical CPU's load, in percent.
pub type ProcessorLoadSample = u32;

/// One installed processor as named by the inventory query.
pub type ProcessorDescriptor = String;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessEntry {
    pub process_id: u32,
    pub process_name: String,
    pub load_percent: u64,
}

/// Processes matched by a load lookup and their summed load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    total_load: u64,
    entries: Vec<ProcessEntry>,
}

impl LoadReport {
    pub fn from_entries(entries: Vec<ProcessEntry>) -> Self {
        let total_load = sum_loads(&entries);
        LoadReport {
            total_load,
            entries,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total_load(&self) -> u64 {
        self.total_load
    }

    pub fn entries(&self) -> &[ProcessEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ProcessEntry> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only matching entries; the total follows.
    pub fn retain(&mut self, keep: impl FnMut(&ProcessEntry) -> bool) {
        self.entries.retain(keep);
        self.total_load = sum_loads(&self.entries);
    }
}

fn sum_loads(entries: &[ProcessEntry]) -> u64 {
    entries
        .iter()
        .fold(0u64, |acc, e| acc.saturating_add(e.load_percent))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MemoryUsageReport {
    kilobytes: u64,
    megabytes: f64,
    gigabytes: f64,
}

impl MemoryUsageReport {
    pub fn from_kilobytes(kilobytes: u64) -> Self {
        let megabytes = kilobytes as f64 / 1024.0;
        let gigabytes = megabytes / 1024.0;
        MemoryUsageReport {
            kilobytes,
            megabytes,
            gigabytes,
        }
    }

    pub fn kilobytes(&self) -> u64 {
        self.kilobytes
    }

    pub fn megabytes(&self) -> f64 {
        self.megabytes
    }

    pub fn gigabytes(&self) -> f64 {
        self.gigabytes
    }
}

/// Process lookup key for load queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProcessFilter {
    Pid(u32),
    Name(String),
}

impl From<u32> for ProcessFilter {
    fn from(pid: u32) -> Self {
        ProcessFilter::Pid(pid)
    }
}

impl From<&str> for ProcessFilter {
    fn from(name: &str) -> Self {
        ProcessFilter::Name(name.to_string())
    }
}

impl From<String> for ProcessFilter {
    fn from(name: String) -> Self {
        ProcessFilter::Name(name)
    }
}

impl fmt::Display for ProcessFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessFilter::Pid(pid) => write!(f, "{pid}"),
            ProcessFilter::Name(name) => f.write_str(name),
        }
    }
}
