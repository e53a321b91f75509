//! Column-schema parsers for `wmic` and `tasklist` text output.
//!
//! Everything here is pure: text in, records out. A row that does not fit its
//! schema is reported as a [`ParseAnomaly`] next to the rows that did, so one
//! bad line never costs the rest of the read.

use super::report::{ProcessEntry, ProcessorDescriptor, ProcessorLoadSample};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// Runs of non-newline whitespace separate fields.
    Whitespace,
    /// `"a","b","c"`: double-quoted fields joined by commas.
    QuotedComma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact,
    AtLeast,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnSchema {
    pub columns: &'static [&'static str],
    pub delimiter: Delimiter,
    pub arity: Arity,
}

/// `wmic path Win32_PerfFormattedData_PerfProc_Process get Name,PercentProcessorTime,IDProcess`
/// prints its columns alphabetically.
pub const PROCESS_LOAD_SCHEMA: ColumnSchema = ColumnSchema {
    columns: &["IDProcess", "Name", "PercentProcessorTime"],
    delimiter: Delimiter::Whitespace,
    arity: Arity::Exact,
};

/// `tasklist /FO csv /NH`
pub const TASKLIST_SCHEMA: ColumnSchema = ColumnSchema {
    columns: &["Image Name", "PID", "Session Name", "Session#", "Mem Usage"],
    delimiter: Delimiter::QuotedComma,
    arity: Arity::AtLeast,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseAnomaly {
    #[error("expected {expected} fields, found {found}: {line:?}")]
    FieldCount {
        line: String,
        expected: usize,
        found: usize,
    },
    #[error("column {column} is not an integer ({value:?}): {line:?}")]
    NotAnInteger {
        line: String,
        column: &'static str,
        value: String,
    },
}

/// Records that parsed, plus the rows that were skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub anomalies: Vec<ParseAnomaly>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Parsed {
            records: Vec::new(),
            anomalies: Vec::new(),
        }
    }
}

impl ColumnSchema {
    pub fn split<'a>(&self, line: &'a str) -> Result<Vec<&'a str>, ParseAnomaly> {
        let fields: Vec<&str> = match self.delimiter {
            Delimiter::Whitespace => line.split_whitespace().collect(),
            Delimiter::QuotedComma => {
                let trimmed = line.trim();
                let inner = trimmed.strip_prefix('"').unwrap_or(trimmed);
                let inner = inner.strip_suffix('"').unwrap_or(inner);
                inner.split("\",\"").collect()
            }
        };

        let expected = self.columns.len();
        let fits = match self.arity {
            Arity::Exact => fields.len() == expected,
            Arity::AtLeast => fields.len() >= expected,
        };
        if fits {
            Ok(fields)
        } else {
            Err(ParseAnomaly::FieldCount {
                line: line.trim().to_string(),
                expected,
                found: fields.len(),
            })
        }
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// The tool echoing the column names back as its first row.
    fn is_header(&self, fields: &[&str]) -> bool {
        fields.len() == self.columns.len()
            && fields
                .iter()
                .zip(self.columns)
                .all(|(f, c)| f.eq_ignore_ascii_case(c))
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

fn integer_field<T: std::str::FromStr>(
    line: &str,
    column: &'static str,
    value: &str,
) -> Result<T, ParseAnomaly> {
    value.parse().map_err(|_| ParseAnomaly::NotAnInteger {
        line: line.to_string(),
        column,
        value: value.to_string(),
    })
}

/// Every run of ASCII digits in `text`, in order. Runs too large for a `u32` are dropped.
pub fn parse_load_percentages(text: &str) -> Vec<ProcessorLoadSample> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse().ok())
        .collect()
}

pub fn parse_process_rows(text: &str) -> Parsed<ProcessEntry> {
    let schema = PROCESS_LOAD_SCHEMA;
    let mut parsed = Parsed::default();

    for line in lines(text) {
        let fields = match schema.split(line) {
            Ok(fields) => fields,
            Err(anomaly) => {
                parsed.anomalies.push(anomaly);
                continue;
            }
        };
        if schema.is_header(&fields) {
            continue;
        }

        let row = integer_field::<u32>(line, schema.columns[0], fields[0]).and_then(|pid| {
            let load = integer_field::<u64>(line, schema.columns[2], fields[2])?;
            Ok(ProcessEntry {
                process_id: pid,
                process_name: fields[1].to_string(),
                load_percent: load,
            })
        });
        match row {
            Ok(entry) => parsed.records.push(entry),
            Err(anomaly) => parsed.anomalies.push(anomaly),
        }
    }

    parsed
}

/// Processor names below the header row. `None` when the tool printed nothing at all.
pub fn parse_processor_names(text: &str) -> Option<Vec<ProcessorDescriptor>> {
    let mut rows = lines(text);
    rows.next()?;
    Some(rows.map(str::to_string).collect())
}

/// Working-set KB per process row. Digits are pulled out of the memory column
/// (`"12,345 K"` is 12345); a column with no digits counts as 0.
pub fn parse_tasklist_memory(text: &str) -> Parsed<u64> {
    let schema = TASKLIST_SCHEMA;
    let column = schema.index_of("Mem Usage").unwrap_or(4);
    let mut parsed = Parsed::default();

    for line in lines(text) {
        match schema.split(line) {
            Ok(fields) => {
                let digits: String = fields[column]
                    .chars()
                    .filter(char::is_ascii_digit)
                    .collect();
                parsed.records.push(digits.parse().unwrap_or(0));
            }
            Err(anomaly) => parsed.anomalies.push(anomaly),
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPU_LOAD_TWO: &str = "LoadPercentage  \r\r\n7               \r\r\n93              \r\r\n\r\r\n";

    const PROCESS_ROWS: &str = "IDProcess  Name                 PercentProcessorTime  \r\r\n\
        0          Idle                 97                    \r\r\n\
        4          System               0                     \r\r\n\
        9120       node                 3                     \r\r\n\
        9344       node#1               12                    \r\r\n\
        0          _Total               100                   \r\r\n";

    #[test]
    fn load_percentages_skip_header() {
        assert_eq!(parse_load_percentages(CPU_LOAD_TWO), vec![7, 93]);
    }

    #[test]
    fn load_percentages_empty_when_no_digits() {
        assert!(parse_load_percentages("LoadPercentage\r\n\r\n").is_empty());
        assert!(parse_load_percentages("").is_empty());
    }

    #[test]
    fn load_percentages_drop_overflowing_runs() {
        assert_eq!(parse_load_percentages("5\n99999999999999999999\n6"), vec![5, 6]);
    }

    #[test]
    fn process_rows_parse_three_columns() {
        let parsed = parse_process_rows(PROCESS_ROWS);
        assert!(parsed.anomalies.is_empty(), "{:?}", parsed.anomalies);
        assert_eq!(parsed.records.len(), 5);
        assert_eq!(
            parsed.records[2],
            ProcessEntry {
                process_id: 9120,
                process_name: "node".into(),
                load_percent: 3,
            }
        );
    }

    #[test]
    fn process_rows_skip_malformed_lines() {
        let text = "IDProcess Name PercentProcessorTime\n\
            12 short\n\
            abc node 4\n\
            77 node 5\n\
            78 two words 1\n\
            79 node x\n";
        let parsed = parse_process_rows(text);
        assert_eq!(
            parsed.records,
            vec![ProcessEntry {
                process_id: 77,
                process_name: "node".into(),
                load_percent: 5,
            }]
        );
        assert_eq!(parsed.anomalies.len(), 4);
        assert!(matches!(
            parsed.anomalies[0],
            ParseAnomaly::FieldCount {
                expected: 3,
                found: 2,
                ..
            }
        ));
        assert!(matches!(
            parsed.anomalies[1],
            ParseAnomaly::NotAnInteger {
                column: "IDProcess",
                ..
            }
        ));
        assert!(matches!(
            parsed.anomalies[3],
            ParseAnomaly::NotAnInteger {
                column: "PercentProcessorTime",
                ..
            }
        ));
    }

    #[test]
    fn process_rows_empty_input() {
        let parsed = parse_process_rows("");
        assert!(parsed.records.is_empty());
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn processor_names_drop_header() {
        let text = "Name                                      \r\r\n\
            Intel(R) Core(TM) i7-8650U CPU @ 1.90GHz  \r\r\n\r\r\n";
        assert_eq!(
            parse_processor_names(text),
            Some(vec!["Intel(R) Core(TM) i7-8650U CPU @ 1.90GHz".to_string()])
        );
    }

    #[test]
    fn processor_names_none_without_lines() {
        assert_eq!(parse_processor_names(""), None);
        assert_eq!(parse_processor_names("\r\n  \r\n"), None);
        assert_eq!(parse_processor_names("Name\r\n"), Some(vec![]));
    }

    #[test]
    fn tasklist_memory_strips_separators() {
        let text = "\"System Idle Process\",\"0\",\"Services\",\"0\",\"8 K\"\r\n\
            \"System\",\"4\",\"Services\",\"0\",\"1,352 K\"\r\n\
            \"chrome.exe\",\"5120\",\"Console\",\"1\",\"245.880 K\"\r\n";
        let parsed = parse_tasklist_memory(text);
        assert_eq!(parsed.records, vec![8, 1352, 245_880]);
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn tasklist_memory_unparseable_column_is_zero() {
        let text = "\"odd.exe\",\"1\",\"Console\",\"1\",\"N/A\"\r\n";
        assert_eq!(parse_tasklist_memory(text).records, vec![0]);
    }

    #[test]
    fn tasklist_memory_short_row_is_anomaly() {
        let text = "INFO: No tasks are running which match the specified criteria.\r\n\
            \"a.exe\",\"1\",\"Console\",\"1\",\"10 K\"\r\n";
        let parsed = parse_tasklist_memory(text);
        assert_eq!(parsed.records, vec![10]);
        assert_eq!(parsed.anomalies.len(), 1);
    }

    #[test]
    fn schema_index_lookup() {
        assert_eq!(TASKLIST_SCHEMA.index_of("Mem Usage"), Some(4));
        assert_eq!(PROCESS_LOAD_SCHEMA.index_of("Name"), Some(1));
        assert_eq!(PROCESS_LOAD_SCHEMA.index_of("Missing"), None);
    }
}
