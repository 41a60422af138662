//! json2txt: ratings dataset conversion for recommender training
//!
//! Converts line-delimited JSON review dumps (optionally gzip or zstd
//! compressed) into the space-separated `user item value time` text format
//! read by TransRec-style trainers.
//!
//! # Features
//!
//! - **Streaming I/O**: records are processed in bounded batches
//! - **Compression inference**: gzip and zstd input detected from content
//! - **Dataset profiles**: Amazon reviews and Google Local
//!
//! # Example
//!
//! ```rust,no_run
//! use json2txt::{ConvertCommand, Dataset, LogConfig};
//!
//! let cmd = ConvertCommand::new(Dataset::Amazon, LogConfig::default());
//! let stdout = std::io::stdout();
//! let stats = cmd.run("reviews_Office_Products_5.json.gz", &mut stdout.lock()).unwrap();
//! eprintln!("{}", stats);
//! ```

pub mod clean;
pub mod convert;
pub mod dataset;
pub mod error;
pub mod input;
pub mod line_count;
pub mod logging;
pub mod output;
pub mod pyliteral;
pub mod record;

// Re-export commonly used types
pub use clean::{CleanCommand, CleanStats};
pub use convert::{ConvertCommand, ConvertStats};
pub use dataset::{Dataset, DatasetProfile};
pub use error::{ConvertError, Result};
pub use line_count::count_lines;
pub use logging::{Diagnostics, LogConfig, LogStream};
pub use record::{Record, RecordReader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
