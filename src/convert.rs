//! Streaming JSON-lines to text conversion.
//!
//! The input is read twice: once as raw bytes to count lines for the
//! progress estimate, then decompressed and parsed batch by batch. Each
//! record becomes one `user item value time` line and each batch is flushed
//! before progress is logged, so downstream pipes see data as it is produced.
//!
//! Memory: O(batch size).

use crate::dataset::{Dataset, DatasetProfile};
use crate::error::{ConvertError, Result};
use crate::input::{open_input, Compression};
use crate::line_count::count_lines;
use crate::logging::{Diagnostics, LogConfig};
use crate::output::RatingWriter;
use crate::record::{RecordReader, DEFAULT_BATCH_SIZE};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

/// Statistics from a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub records: u64,
    pub batches: u64,
    pub total_lines: u64,
}

impl ConvertStats {
    /// Progress as an integer percentage of the raw line count.
    ///
    /// May exceed 100 when the raw count undercounts records, which is the
    /// normal case for compressed input. `None` when nothing was counted.
    pub fn percent(&self) -> Option<u64> {
        (self.records * 100).checked_div(self.total_lines)
    }
}

impl fmt::Display for ConvertStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Records: {}, Batches: {}, Raw lines: {}",
            self.records, self.batches, self.total_lines
        )
    }
}

/// Converts a ratings dataset into space-separated text.
pub struct ConvertCommand {
    pub dataset: Dataset,
    /// Records per batch (progress is reported after each batch)
    pub batch_size: usize,
    diagnostics: Diagnostics,
}

impl ConvertCommand {
    pub fn new(dataset: Dataset, log: LogConfig) -> Self {
        Self {
            dataset,
            batch_size: DEFAULT_BATCH_SIZE,
            diagnostics: Diagnostics::new(log),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ConvertError::InvalidArgument(
                "batch size must be greater than 0".to_string(),
            ));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    pub fn profile(&self) -> DatasetProfile {
        self.dataset.profile()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Convert the file at `path`, writing lines to `output`.
    pub fn run<P: AsRef<Path>, W: Write>(
        &self,
        input_path: P,
        output: &mut W,
    ) -> Result<ConvertStats> {
        let path = input_path.as_ref();

        let total_lines = count_lines(path)?;
        self.diagnostics.info(format_args!(
            "{}: {} lines, dataset {}",
            path.display(),
            total_lines,
            self.dataset
        ));

        let input = open_input(path)?;
        if input.compression != Compression::None {
            self.diagnostics.debug(format_args!(
                "decompressing {} input",
                input.compression.name()
            ));
        }

        self.convert(input.reader, total_lines, output, Some(path))
    }

    /// Convert an already opened, decompressed JSON-lines stream.
    ///
    /// `total_lines` is the progress denominator.
    pub fn run_reader<R: BufRead, W: Write>(
        &self,
        reader: R,
        total_lines: u64,
        output: &mut W,
    ) -> Result<ConvertStats> {
        self.convert(reader, total_lines, output, None)
    }

    fn convert<R: BufRead, W: Write>(
        &self,
        reader: R,
        total_lines: u64,
        output: &mut W,
        source: Option<&Path>,
    ) -> Result<ConvertStats> {
        let mut stats = ConvertStats {
            total_lines,
            ..Default::default()
        };
        let [user, item, value, time] = self.profile().keys();
        let mut writer = RatingWriter::new(output);

        for batch in RecordReader::new(reader).batches(self.batch_size) {
            let batch = batch.map_err(|e| match (e, source) {
                (ConvertError::Io(err), Some(path)) => ConvertError::file_access(path, err),
                (other, _) => other,
            })?;

            for record in &batch {
                let fields = [
                    record.field(user)?,
                    record.field(item)?,
                    record.field(value)?,
                    record.field(time)?,
                ];
                writer.write_fields(&fields)?;
            }

            stats.records += batch.len() as u64;
            stats.batches += 1;
            writer.flush()?;
            self.report_progress(&stats);
        }

        writer.flush()?;
        Ok(stats)
    }

    fn report_progress(&self, stats: &ConvertStats) {
        match stats.percent() {
            Some(pct) => self
                .diagnostics
                .info(format_args!("completed {} rows ({}%)", stats.records, pct)),
            None => self
                .diagnostics
                .info(format_args!("completed {} rows", stats.records)),
        }
    }
}
