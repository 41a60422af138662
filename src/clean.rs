//! Google Local dump cleaning.
//!
//! Converts the raw Python-literal review dump into JSON lines holding only
//! the four fields the `googlelocal` profile reads. Rows where any of them
//! is `None` or absent are dropped unless `keep_null` is set.

use crate::error::{ConvertError, Result};
use crate::pyliteral;
use serde_json::{Map, Value};
use std::fmt;
use std::io::{self, BufRead, BufWriter, Write};

/// Output key order.
pub const CLEAN_KEYS: [&str; 4] = ["rating", "gPlusPlaceId", "unixReviewTime", "gPlusUserId"];

const BUF_SIZE: usize = 256 * 1024;

/// Statistics from a cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub rows_read: u64,
    pub rows_written: u64,
    pub rows_dropped: u64,
}

impl fmt::Display for CleanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rows read: {}, Written: {}, Dropped: {}",
            self.rows_read, self.rows_written, self.rows_dropped
        )
    }
}

/// Python-literal to JSON-lines cleaner.
#[derive(Debug, Clone, Default)]
pub struct CleanCommand {
    /// Write rows with null or missing fields instead of dropping them
    pub keep_null: bool,
}

impl CleanCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keep_null(mut self, keep_null: bool) -> Self {
        self.keep_null = keep_null;
        self
    }

    /// Clean stdin into `output`.
    pub fn run_stdin<W: Write>(&self, output: &mut W) -> Result<CleanStats> {
        let stdin = io::stdin();
        self.run_reader(stdin.lock(), output)
    }

    pub fn run_reader<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        output: &mut W,
    ) -> Result<CleanStats> {
        let mut stats = CleanStats::default();
        let mut writer = BufWriter::with_capacity(BUF_SIZE, output);
        let mut raw = Vec::with_capacity(4096);
        let mut line_number = 0usize;

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            line_number += 1;

            // The dumps are not guaranteed to be valid UTF-8
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim();
            if line.is_empty() {
                continue;
            }
            stats.rows_read += 1;

            let row = self.clean_line(line).map_err(|e| ConvertError::Parse {
                line: line_number,
                message: e.to_string(),
            })?;

            match row {
                Some(row) => {
                    serde_json::to_writer(&mut writer, &row).map_err(io::Error::from)?;
                    writer.write_all(b"\n")?;
                    stats.rows_written += 1;
                }
                None => stats.rows_dropped += 1,
            }
        }

        writer.flush()?;
        Ok(stats)
    }

    /// Project one literal line; `None` means the row is dropped.
    pub fn clean_line(
        &self,
        line: &str,
    ) -> std::result::Result<Option<Value>, pyliteral::SyntaxError> {
        let value = pyliteral::parse(line)?;
        let Value::Object(fields) = value else {
            return Err(pyliteral::SyntaxError {
                offset: 0,
                message: "expected a dict".to_string(),
            });
        };

        let mut row = Map::new();
        for key in CLEAN_KEYS {
            let value = fields.get(key).cloned().unwrap_or(Value::Null);
            if value.is_null() && !self.keep_null {
                return Ok(None);
            }
            row.insert(key.to_string(), value);
        }
        Ok(Some(Value::Object(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn clean(cmd: &CleanCommand, content: &str) -> (Result<CleanStats>, String) {
        let mut output = Vec::new();
        let result = cmd.run_reader(content.as_bytes(), &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_clean_rows() {
        let content = "\
{'rating': 4.0, 'reviewerName': u'A', 'gPlusPlaceId': u'P1', 'unixReviewTime': 1389221137, 'gPlusUserId': u'U1'}
{'rating': 5.0, 'gPlusPlaceId': u'P2', 'unixReviewTime': None, 'gPlusUserId': u'U2'}

{'rating': 3.0, 'gPlusPlaceId': u'P3', 'unixReviewTime': 1, 'gPlusUserId': u'U3', 'categories': None}
";
        let (result, out) = clean(&CleanCommand::new(), content);
        let stats = result.unwrap();

        assert_eq!(
            out,
            "{\"rating\":4.0,\"gPlusPlaceId\":\"P1\",\"unixReviewTime\":1389221137,\"gPlusUserId\":\"U1\"}\n\
             {\"rating\":3.0,\"gPlusPlaceId\":\"P3\",\"unixReviewTime\":1,\"gPlusUserId\":\"U3\"}\n"
        );
        assert_eq!(
            stats,
            CleanStats {
                rows_read: 3,
                rows_written: 2,
                rows_dropped: 1,
            }
        );
    }

    #[test]
    fn test_keep_null() {
        let cmd = CleanCommand::new().with_keep_null(true);
        let (result, out) = clean(&cmd, "{'rating': None, 'gPlusPlaceId': u'P'}\n");

        assert_eq!(result.unwrap().rows_written, 1);
        assert_eq!(
            out,
            "{\"rating\":null,\"gPlusPlaceId\":\"P\",\"unixReviewTime\":null,\"gPlusUserId\":null}\n"
        );
    }

    #[test]
    fn test_missing_key_dropped() {
        let (result, out) = clean(&CleanCommand::new(), "{'rating': 1.0}\n");
        assert_eq!(result.unwrap().rows_dropped, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_escaped_output() {
        let line = "{'rating': 5.0, 'gPlusPlaceId': u'P\\'1\"', 'unixReviewTime': 7, 'gPlusUserId': u'caf\\xe9'}\n";
        let (_, out) = clean(&CleanCommand::new(), line);
        assert_eq!(
            out,
            "{\"rating\":5.0,\"gPlusPlaceId\":\"P'1\\\"\",\"unixReviewTime\":7,\"gPlusUserId\":\"café\"}\n"
        );
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let content = "{'rating': 1.0, 'gPlusPlaceId': u'P', 'unixReviewTime': 1, 'gPlusUserId': u'U'}\n{'rating': }\n";
        let (result, _) = clean(&CleanCommand::new(), content);
        assert!(matches!(result, Err(ConvertError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_not_a_dict() {
        let cmd = CleanCommand::new();
        assert!(cmd.clean_line("[1, 2]").is_err());
    }

    #[test]
    fn test_output_matches_profile() {
        let profile = Dataset::GoogleLocal.profile();
        for key in profile.keys() {
            assert!(CLEAN_KEYS.contains(&key));
        }
    }
}
