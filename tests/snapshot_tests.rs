use insta::assert_debug_snapshot;
use wincpu::MemoryUsageReport;
use wincpu::system::parse::{parse_process_rows, parse_processor_names, parse_tasklist_memory};

const WMIC_PROCESS_OUTPUT: &str = "IDProcess  Name       PercentProcessorTime  \r\r\n\
    0          Idle       95                    \r\r\n\
    4          System     0                     \r\r\n\
    3320       svchost#4  1                     \r\r\n\
    7788       node       4                     \r\r\n\
    No Instance(s)\r\r\n";

const TASKLIST_OUTPUT: &str = "\"MsMpEng.exe\",\"3312\",\"Services\",\"0\",\"2,097,152 K\"\r\n\
    \"node.exe\",\"7788\",\"Console\",\"1\",\"1,572,864 K\"\r\n\
    \"Registry\",\"96\",\"Services\",\"0\",\"N/A\"\r\n";

#[test]
fn process_rows_with_anomalies() {
    let parsed = parse_process_rows(WMIC_PROCESS_OUTPUT);
    assert_debug_snapshot!("process_rows_with_anomalies", parsed);
}

#[test]
fn processor_inventory() {
    let text = "Name                                            \r\r\n\
        Intel(R) Xeon(R) Gold 6230 CPU @ 2.10GHz        \r\r\n\
        Intel(R) Xeon(R) Gold 6230 CPU @ 2.10GHz        \r\r\n\
        \r\r\n";
    let names = parse_processor_names(text);
    assert_debug_snapshot!("processor_inventory", names);
}

#[test]
fn memory_report_from_tasklist() {
    let parsed = parse_tasklist_memory(TASKLIST_OUTPUT);
    let report = MemoryUsageReport::from_kilobytes(parsed.records.iter().sum());
    assert_debug_snapshot!("memory_report_from_tasklist", report);
}
