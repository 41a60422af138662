//! Output formatting for converted rating lines.
//!
//! Uses itoa for integer formatting and ryu for float formatting
//! to avoid allocation in the hot path.

use crate::error::Result;
use serde_json::Value;
use std::io::{BufWriter, Write};

/// Default output buffer size (2 MB).
pub const DEFAULT_OUTPUT_BUFFER: usize = 2 * 1024 * 1024;

/// Writer for `user item value time` lines.
pub struct RatingWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
}

impl<W: Write> RatingWriter<W> {
    /// Create a new RatingWriter with the default 2MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a new RatingWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
        }
    }

    /// Write the given fields separated by single spaces, then a newline.
    #[inline]
    pub fn write_fields(&mut self, fields: &[&Value]) -> Result<()> {
        for (i, value) in fields.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b" ")?;
            }
            self.write_value(value)?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write one JSON value in its plain text form.
    ///
    /// Strings are written without quotes, numbers in shortest form,
    /// containers as compact JSON.
    #[inline]
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.writer.write_all(s.as_bytes())?,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.writer.write_all(self.itoa_buf.format(i).as_bytes())?;
                } else if let Some(u) = n.as_u64() {
                    self.writer.write_all(self.itoa_buf.format(u).as_bytes())?;
                } else if let Some(f) = n.as_f64() {
                    self.write_float(f)?;
                } else {
                    write!(self.writer, "{}", n)?;
                }
            }
            Value::Bool(true) => self.writer.write_all(b"true")?,
            Value::Bool(false) => self.writer.write_all(b"false")?,
            Value::Null => self.writer.write_all(b"null")?,
            Value::Array(_) | Value::Object(_) => {
                serde_json::to_writer(&mut self.writer, value).map_err(std::io::Error::from)?;
            }
        }
        Ok(())
    }

    /// Write a float using ryu.
    #[inline]
    pub fn write_float(&mut self, f: f64) -> Result<()> {
        self.writer.write_all(self.ryu_buf.format(f).as_bytes())?;
        Ok(())
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(fields: &[Value]) -> String {
        let mut output = Vec::new();
        {
            let mut writer = RatingWriter::new(&mut output);
            let refs: Vec<&Value> = fields.iter().collect();
            writer.write_fields(&refs).unwrap();
            writer.flush().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_write_amazon_line() {
        let line = render(&[json!("U1"), json!("I1"), json!(5), json!(100)]);
        assert_eq!(line, "U1 I1 5 100\n");
    }

    #[test]
    fn test_write_floats() {
        assert_eq!(render(&[json!(4.5)]), "4.5\n");
        assert_eq!(render(&[json!(5.0)]), "5.0\n");
        assert_eq!(render(&[json!(-0.25)]), "-0.25\n");
    }

    #[test]
    fn test_write_large_integers() {
        assert_eq!(render(&[json!(u64::MAX)]), format!("{}\n", u64::MAX));
        assert_eq!(render(&[json!(-42)]), "-42\n");
    }

    #[test]
    fn test_write_other_values() {
        let line = render(&[json!(null), json!(true), json!(["a", 1]), json!({"k": "v"})]);
        assert_eq!(line, "null true [\"a\",1] {\"k\":\"v\"}\n");
    }

    #[test]
    fn test_strings_are_unquoted() {
        assert_eq!(render(&[json!("A2 B\"3")]), "A2 B\"3\n");
    }
}
