//! RESmart Log CLI Application
//!
//! Command-line front end for the resmart-decoder library. It adds:
//! - Discovery of numbered log files in a directory
//! - TOML configuration with command-line overrides
//! - Day coverage listing
//! - CSV export to a file

use anyhow::{bail, Context, Result};
use clap::Parser;
use resmart_decoder::{
    summarize_days, CsvExporter, FieldRegistry, SampleRate, SeriesAssembler, ValueColumns,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

mod config;
mod input;

use config::AppConfig;

/// RESmart Log Reader - Extract data from BMC RESmart raw data files
#[derive(Parser, Debug)]
#[command(name = "resmart")]
#[command(about = "Extract data from BMC RESmart raw data files", long_about = None)]
#[command(version)]
struct Args {
    /// Output CSV file (default: RESmart_data.csv)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Directory containing the numbered log files (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print one coverage line per recorded day instead of writing CSV
    #[arg(short = 'l', long, alias = "list-dates")]
    info: bool,

    /// Print all 25 Hz (flow) data; output is 25x as big
    #[arg(short = '2', long = "f25-hz", conflicts_with = "f10_hz")]
    f25_hz: bool,

    /// Print all 10 Hz (pulse) data; output is 10x as big
    #[arg(short = '1', long = "f10-hz")]
    f10_hz: bool,

    /// Print all 1 Hz data fields, known or unknown
    #[arg(short, long)]
    all_data: bool,

    /// Print the timestamp as year, month, day, hour, minute, second fields
    #[arg(short = 'y', long)]
    time_ymd: bool,

    /// Print the timestamp in seconds
    #[arg(short = 's', long)]
    time_seconds: bool,

    /// Write a header row with column labels
    #[arg(long)]
    header: bool,

    /// Only export these dates: START [END], inclusive, as YYYY-MM-DD
    #[arg(long, value_name = "DATE", num_args = 1..=2)]
    dates: Vec<String>,

    /// Print the data word labels as JSON and exit
    #[arg(long)]
    list_fields: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Do not print progress and info to stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    let config = apply_args(&args, file_config);

    // Initialize logging
    init_logging(args.verbose, config.output.quiet);

    log::info!("RESmart Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", resmart_decoder::VERSION);

    let registry = FieldRegistry::global();

    if args.list_fields {
        let json = serde_json::to_string_pretty(&registry.entries())?;
        println!("{}", json);
        return Ok(());
    }

    run(&config, registry)
}

/// Overlay command-line flags on the file configuration
fn apply_args(args: &Args, mut config: AppConfig) -> AppConfig {
    if let Some(dir) = &args.dir {
        config.input.dir = dir.clone();
    }
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    config.output.info |= args.info;
    config.output.quiet |= args.quiet;

    let export = &mut config.export;
    export.time_seconds |= args.time_seconds;
    export.time_ymd |= args.time_ymd;
    export.header |= args.header;
    if args.all_data {
        export.values = ValueColumns::All;
    }
    if args.f10_hz {
        export.rate = SampleRate::TenHz;
    } else if args.f25_hz {
        export.rate = SampleRate::TwentyFiveHz;
    }
    if !args.dates.is_empty() {
        export.dates = args.dates.clone();
    }

    config
}

/// Decode all input files, then list days or export CSV
fn run(config: &AppConfig, registry: &FieldRegistry) -> Result<()> {
    // Reject a bad date range before touching any input
    let exporter = CsvExporter::new(registry, config.export.clone())
        .context("Invalid date range")?;

    let files = input::discover_input_files(&config.input.dir)?;
    if files.is_empty() {
        bail!("No numbered log files (*.NNN) found in {:?}", config.input.dir);
    }

    // The output is opened once up front; BufWriter flushes on drop, so an
    // aborted run leaves whatever was written
    let mut out = if config.output.info {
        None
    } else {
        let file = File::create(&config.output.path)
            .with_context(|| format!("Failed to create output file: {:?}", config.output.path))?;
        Some(BufWriter::new(file))
    };

    let mut assembler = SeriesAssembler::new(registry);
    for path in &files {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let name = path.display().to_string();
        assembler
            .add_source(&name, &bytes)
            .with_context(|| format!("Failed to decode {:?}", path))?;
    }
    let packets = assembler.into_packets();

    match out.as_mut() {
        None => {
            for day in summarize_days(&packets) {
                println!("{}", day);
            }
            log::info!("Durations count one second per packet and are approximate");
        }
        Some(writer) => {
            let stats = exporter
                .export(&packets, writer)
                .with_context(|| format!("Failed to write {:?}", config.output.path))?;
            writer.flush()?;
            log::info!(
                "Wrote {} lines to {:?}",
                stats.lines_written,
                config.output.path
            );
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
