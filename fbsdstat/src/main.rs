use clap::{Arg, Command};
use fbsdstat_core::{Config, MetricsCollector};
use std::{path::PathBuf, process, thread};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("fbsdstat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("FreeBSD memory, swap, ARC and process telemetry collector")
        .arg(
            Arg::new("refresh")
                .long("refresh")
                .value_name("MS")
                .help("Refresh interval in milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .short('a')
                .help("Include kernel-owned processes")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .short('f')
                .value_name("SUBSTRING")
                .help("Keep only processes whose name contains any given substring")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Collect a single snapshot and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json-config")
                .long("json-config")
                .value_name("PATH")
                .help("Path to JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    let cli_config = fbsdstat_core::config::CliConfig {
        refresh_ms: matches.get_one::<u64>("refresh").copied(),
        include_kernel_processes: matches.get_flag("all"),
        process_filter: matches
            .get_many::<String>("filter")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
    };

    let json_config_path = matches.get_one::<PathBuf>("json-config");
    let config = Config::load(Some(&cli_config), json_config_path)?;
    let once = matches.get_flag("once");

    run_poll_loop(config, once)
}

/// Drive the collector at a fixed cadence, printing one JSON snapshot
/// per cycle.
fn run_poll_loop(config: Config, once: bool) -> anyhow::Result<()> {
    let mut collector = MetricsCollector::new()?;
    tracing::info!(
        refresh_ms = config.refresh_ms,
        page_size = collector.page_info().size(),
        "starting collector"
    );
    collector.set_scope(config.process_scope());
    if !config.process_filter.is_empty() {
        collector.set_process_filter(config.process_filter.clone());
    }

    loop {
        let snapshot = collector.collect();
        println!("{}", serde_json::to_string(&snapshot)?);

        if once {
            return Ok(());
        }
        thread::sleep(config.refresh_interval());
    }
}
