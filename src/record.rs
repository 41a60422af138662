//! Streaming line-delimited JSON reader.
//!
//! Each non-blank line must be a JSON object. Records are handed out either
//! one at a time or in fixed-size batches; a batch is dropped by the caller
//! once its lines are written, so memory stays bounded to one batch.

use crate::error::{ConvertError, Result};
use serde_json::{Map, Value};
use std::io::{self, BufRead, ErrorKind};

/// Default number of records per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// A single input record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line number in the decompressed input.
    pub line: usize,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(line: usize, fields: Map<String, Value>) -> Self {
        Self { line, fields }
    }

    /// Look up `key`, failing with `MissingField` if the record lacks it.
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.fields.get(key).ok_or_else(|| ConvertError::MissingField {
            line: self.line,
            key: key.to_string(),
        })
    }
}

/// A streaming JSON-lines reader.
pub struct RecordReader<R: BufRead> {
    reader: R,
    line_number: usize,
    buffer: Vec<u8>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Read the next record, skipping blank lines.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            self.buffer.clear();
            let bytes_read = self
                .reader
                .read_until(b'\n', &mut self.buffer)
                .map_err(|e| self.read_error(e))?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = std::str::from_utf8(&self.buffer).map_err(|e| ConvertError::Parse {
                line: self.line_number,
                message: format!("invalid UTF-8: {}", e),
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    /// A corrupt or truncated compressed stream is bad content, reported
    /// against the line being read.
    fn read_error(&self, err: io::Error) -> ConvertError {
        match err.kind() {
            ErrorKind::InvalidData | ErrorKind::UnexpectedEof => ConvertError::Parse {
                line: self.line_number + 1,
                message: format!("corrupt input: {}", err),
            },
            _ => ConvertError::Io(err),
        }
    }

    fn parse_line(&self, line: &str) -> Result<Record> {
        let value: Value = serde_json::from_str(line).map_err(|e| ConvertError::Parse {
            line: self.line_number,
            message: e.to_string(),
        })?;

        match value {
            Value::Object(fields) => Ok(Record::new(self.line_number, fields)),
            other => Err(ConvertError::Parse {
                line: self.line_number,
                message: format!("expected a JSON object, got {}", kind_name(&other)),
            }),
        }
    }

    /// Get an iterator over all records.
    pub fn records(self) -> RecordIter<R> {
        RecordIter { reader: self }
    }

    /// Get an iterator over batches of at most `size` records.
    pub fn batches(self, size: usize) -> RecordBatches<R> {
        RecordBatches {
            reader: self,
            size: size.max(1),
            done: false,
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Iterator over records.
pub struct RecordIter<R: BufRead> {
    reader: RecordReader<R>,
}

impl<R: BufRead> Iterator for RecordIter<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Lazy, non-restartable sequence of record batches.
///
/// Every batch except the last holds exactly `size` records. After an error
/// the iterator is exhausted.
pub struct RecordBatches<R: BufRead> {
    reader: RecordReader<R>,
    size: usize,
    done: bool,
}

impl<R: BufRead> Iterator for RecordBatches<R> {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.size.min(DEFAULT_BATCH_SIZE));
        while batch.len() < self.size {
            match self.reader.read_record() {
                Ok(Some(record)) => batch.push(record),
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}

/// Parse records from a string (useful for testing).
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    RecordReader::new(content.as_bytes()).records().collect()
}
