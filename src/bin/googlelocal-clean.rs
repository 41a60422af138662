//! googlelocal-clean: turn the raw Google Local review dump into JSON lines
//!
//! Usage: zcat reviews.clean.json.gz | googlelocal-clean | gzip > reviews.json.gz

use clap::Parser;
use std::io;
use std::process;

use json2txt::logging::{parse_level, LOG_LEVELS};
use json2txt::{CleanCommand, Diagnostics, LogConfig, Result};

#[derive(Parser)]
#[command(name = "googlelocal-clean")]
#[command(version)]
#[command(about = "Convert Python-literal Google Local reviews on stdin to JSON lines on stdout", long_about = None)]
struct Cli {
    /// Keep rows whose rating, place, time or user is missing or None
    #[arg(long)]
    keep_null: bool,

    /// Minimum level of diagnostics written to stderr
    #[arg(long, default_value = "info", value_parser = LOG_LEVELS)]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    let diagnostics = Diagnostics::new(
        parse_level(&cli.log_level)
            .map(|level| LogConfig::default().with_level(level))
            .unwrap_or_default(),
    );

    match run(&cli) {
        Ok(stats) => diagnostics.info(format_args!("{}", stats)),
        Err(e) => {
            diagnostics.error(format_args!("{}", e));
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<json2txt::CleanStats> {
    let cmd = CleanCommand::new().with_keep_null(cli.keep_null);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    cmd.run_stdin(&mut handle)
}
