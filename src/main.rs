use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wincpu::format::{fit_column, format_memory};
use wincpu::{
    Config, LoadReport, MemoryUsageReport, PlatformGuard, ProcessFilter, ProcessorDescriptor,
    ProcessorLoadSample, StatsExtractor, sanitize_argument,
};

#[derive(Parser)]
#[command(
    name = "wincpu",
    about = "Windows CPU load, processor and memory stats via wmic and tasklist"
)]
struct Cli {
    /// Windows directory containing System32\wbem\wmic.exe
    #[arg(long, env = "SystemRoot", global = true)]
    system_root: Option<PathBuf>,

    /// Give up on a query tool after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Print results as JSON
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Write logs to stderr as JSON lines
    #[arg(long, default_value_t = false, global = true)]
    log_json: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether this host can run the queries
    Supported,
    /// Load per logical CPU
    Load,
    /// Per-process load, optionally narrowed to a pid or name
    Find { filter: Option<String> },
    /// Load of every process whose name contains "node"
    Node,
    /// Load of this process
    This,
    /// Installed processors
    Cpus,
    /// Working-set memory summed over all processes
    Memory,
    /// Every query at once
    All,
    /// Show what a filter value becomes before it reaches the command line
    Sanitize { arg: String },
}

#[derive(Serialize)]
struct Summary {
    total_load: Vec<ProcessorLoadSample>,
    processes: LoadReport,
    cpus: Vec<ProcessorDescriptor>,
    memory: MemoryUsageReport,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    let config = load_config_for_cli(&cli);

    run(cli.command, &config, cli.json).await
}

async fn run(command: Command, config: &Config, json: bool) -> Result<()> {
    let extractor = StatsExtractor::system(config);

    match command {
        Command::Supported => {
            let guard = PlatformGuard::for_host(config);
            guard
                .assert_supported()
                .wrap_err("this host cannot run wincpu queries")?;
            if json {
                print_json(&serde_json::json!({ "supported": true, "tool": guard.tool_path() }))?;
            } else {
                println!("supported ({})", guard.tool_path().display());
            }
        }
        Command::Load => {
            let loads = extractor.total_load().await.wrap_err("cpu load query failed")?;
            if json {
                print_json(&loads)?;
            } else {
                print_cpu_loads(&loads);
            }
        }
        Command::Find { filter } => {
            let report = extractor
                .find_load(filter.as_deref().map(parse_filter))
                .await
                .wrap_err("process load query failed")?;
            output_load(&report, json)?;
        }
        Command::Node => {
            let report = extractor.node_load().await.wrap_err("node load query failed")?;
            output_load(&report, json)?;
        }
        Command::This => {
            let report = extractor.this_load().await.wrap_err("own load query failed")?;
            output_load(&report, json)?;
        }
        Command::Cpus => {
            let cpus = extractor.cpu_info().await.wrap_err("cpu inventory query failed")?;
            if json {
                print_json(&cpus)?;
            } else {
                for (i, name) in cpus.iter().enumerate() {
                    println!("CPU{i}  {name}");
                }
            }
        }
        Command::Memory => {
            let memory = extractor
                .total_memory_usage()
                .await
                .wrap_err("memory query failed")?;
            if json {
                print_json(&memory)?;
            } else {
                println!("{}", format_memory(&memory));
            }
        }
        Command::All => {
            let (total_load, processes, cpus, memory) = futures::try_join!(
                extractor.total_load(),
                extractor.find_load(None),
                extractor.cpu_info(),
                extractor.total_memory_usage(),
            )
            .wrap_err("stats query failed")?;
            let summary = Summary {
                total_load,
                processes,
                cpus,
                memory,
            };
            if json {
                print_json(&summary)?;
            } else {
                print_cpu_loads(&summary.total_load);
                for name in &summary.cpus {
                    println!("{name}");
                }
                println!("{}", format_memory(&summary.memory));
                print_load_table(&summary.processes);
            }
        }
        Command::Sanitize { arg } => {
            let clean = sanitize_argument(&parse_filter(&arg));
            if json {
                print_json(&clean)?;
            } else {
                println!("{clean}");
            }
        }
    }

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = Config::default();

    if let Some(ref root) = cli.system_root {
        config.system_root = root.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout_ms = Some(ms);
    }

    config
}

fn init_tracing(verbose: u8, json: bool) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "wincpu=debug",
        _ => "wincpu=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// All-digit arguments are pids; anything else is a name.
fn parse_filter(raw: &str) -> ProcessFilter {
    match raw.parse::<u32>() {
        Ok(pid) => ProcessFilter::Pid(pid),
        Err(_) => ProcessFilter::Name(raw.to_string()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_cpu_loads(loads: &[ProcessorLoadSample]) {
    for (i, load) in loads.iter().enumerate() {
        println!("CPU{i}  {load:>3}%");
    }
}

fn output_load(report: &LoadReport, json: bool) -> Result<()> {
    if json {
        print_json(report)
    } else {
        print_load_table(report);
        Ok(())
    }
}

fn print_load_table(report: &LoadReport) {
    println!("{:>8}  {}  {:>5}", "PID", fit_column("NAME", 28), "LOAD%");
    for entry in report.entries() {
        println!(
            "{:>8}  {}  {:>5}",
            entry.process_id,
            fit_column(&entry.process_name, 28),
            entry.load_percent
        );
    }
    println!("{:>8}  {}  {:>5}", "", fit_column("total", 28), report.total_load());
}
