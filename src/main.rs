//! json2txt: convert a JSON-lines ratings dataset to space-separated text
//!
//! Usage: json2txt [OPTIONS] <FILEPATH>

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process;

use json2txt::logging::{parse_level, LOG_LEVELS};
use json2txt::{ConvertCommand, Dataset, Diagnostics, LogConfig, Result};

const EXAMPLES: &str = "\
Examples:
  json2txt reviews_Office_Products_5.json.gz | gzip > reviews_Office_Products_5.txt.gz
  json2txt -d googlelocal reviews.clean.json.gz > reviews.clean.txt";

#[derive(Parser)]
#[command(name = "json2txt")]
#[command(version)]
#[command(about = "Convert reviews.json.gz to reviews.txt", long_about = None)]
#[command(after_help = EXAMPLES)]
struct Cli {
    /// Input file (JSON lines, optionally gzip or zstd compressed)
    filepath: PathBuf,

    /// Kind of dataset
    #[arg(short, long, default_value = "amazon", value_parser = Dataset::NAMES)]
    dataset: String,

    /// Minimum level of diagnostics written to stderr
    #[arg(long, default_value = "debug", value_parser = LOG_LEVELS)]
    log_level: String,

    /// Records per batch; progress is logged after each batch
    #[arg(long, default_value = "10000")]
    batch_size: usize,
}

fn log_config(level: &str) -> Result<LogConfig> {
    Ok(LogConfig::default().with_level(parse_level(level)?))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        let config = log_config(&cli.log_level).unwrap_or_default();
        Diagnostics::new(config).error(format_args!("{}", e));
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Profile selection happens before any file I/O
    let dataset: Dataset = cli.dataset.parse()?;
    let cmd = ConvertCommand::new(dataset, log_config(&cli.log_level)?)
        .with_batch_size(cli.batch_size)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let stats = cmd.run(&cli.filepath, &mut handle)?;

    cmd.diagnostics().debug(format_args!("finished: {}", stats));
    Ok(())
}
