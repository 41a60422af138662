//! Parser for Python literal syntax, producing JSON values.
//!
//! The raw Google Local dumps store one Python `repr()` of a dict per line:
//! single-quoted and `u'...'` strings, `None`, `True`/`False`, tuples. This
//! module turns such a line into a [`serde_json::Value`].

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Deepest container nesting accepted before parsing fails.
pub const MAX_DEPTH: usize = 128;

/// A syntax error with the byte offset where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

/// Parse a complete Python literal. Trailing non-space input is an error.
pub fn parse(src: &str) -> Result<Value, SyntaxError> {
    let mut parser = Parser {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &str) -> SyntaxError {
        SyntaxError {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), SyntaxError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn value(&mut self) -> Result<Value, SyntaxError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(b'{' | b'[' | b'(') => self.container(),
            Some(b'\'' | b'"') => self.string().map(Value::String),
            Some(b'+' | b'-' | b'.' | b'0'..=b'9') => self.number(),
            Some(b) if b.is_ascii_alphabetic() => self.word(),
            Some(_) => Err(self.error("unexpected character")),
        }
    }

    fn container(&mut self) -> Result<Value, SyntaxError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = match self.peek() {
            Some(b'{') => self.dict(),
            Some(b'[') => self.sequence(b'[', b']'),
            _ => self.sequence(b'(', b')'),
        };
        self.depth -= 1;
        value
    }

    fn dict(&mut self) -> Result<Value, SyntaxError> {
        self.expect(b'{')?;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = match self.value()? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.skip_ws();
            self.expect(b':')?;
            self.skip_ws();
            let value = self.value()?;
            map.insert(key, value);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}' in dict")),
            }
        }
    }

    fn sequence(&mut self, open: u8, close: u8) -> Result<Value, SyntaxError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {}
                _ => {
                    return Err(self.error(&format!(
                        "expected ',' or '{}' in sequence",
                        close as char
                    )))
                }
            }
        }
    }

    /// Identifiers: `None`, `True`, `False`, or a string prefix (`u'..'`).
    fn word(&mut self) -> Result<Value, SyntaxError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let src = self.src;
        let word = &src[start..self.pos];

        if matches!(self.peek(), Some(b'\'' | b'"')) && is_string_prefix(word) {
            let raw = word.contains(['r', 'R']);
            return self.quoted(raw).map(Value::String);
        }

        match word {
            "None" => Ok(Value::Null),
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            _ => {
                self.pos = start;
                Err(self.error(&format!("unsupported name '{}'", word)))
            }
        }
    }

    fn string(&mut self) -> Result<String, SyntaxError> {
        self.quoted(false)
    }

    fn quoted(&mut self, raw: bool) -> Result<String, SyntaxError> {
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.error("expected quoted string")),
        };
        self.pos += 1;

        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated string"));
            };

            if b == quote {
                out.push_str(&self.src[run_start..self.pos]);
                self.pos += 1;
                return Ok(out);
            }

            if b == b'\\' {
                out.push_str(&self.src[run_start..self.pos]);
                self.pos += 1;
                if raw {
                    // Raw strings keep the backslash; an escaped quote does not end them
                    out.push('\\');
                    if let Some(next) = self.peek() {
                        if next == quote || next == b'\\' {
                            out.push(next as char);
                            self.pos += 1;
                        }
                    }
                } else {
                    self.escape(&mut out)?;
                }
                run_start = self.pos;
                continue;
            }

            self.pos += 1;
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), SyntaxError> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape sequence"));
        };
        self.pos += 1;

        match b {
            b'\\' => out.push('\\'),
            b'\'' => out.push('\''),
            b'"' => out.push('"'),
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'a' => out.push('\x07'),
            b'b' => out.push('\x08'),
            b'f' => out.push('\x0c'),
            b'v' => out.push('\x0b'),
            b'0' => out.push('\0'),
            b'\n' => {}
            b'x' => {
                let code = self.hex(2)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            b'u' => {
                let code = self.hex(4)?;
                out.push(self.utf16_unit(code)?);
            }
            b'U' => {
                let code = self.hex(8)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            _ => {
                // Unknown escapes are kept verbatim
                self.pos -= 1;
                let ch = self.src[self.pos..]
                    .chars()
                    .next()
                    .ok_or_else(|| self.error("unterminated escape sequence"))?;
                out.push('\\');
                out.push(ch);
                self.pos += ch.len_utf8();
            }
        }
        Ok(())
    }

    /// Decode a `\u` unit, joining a following low surrogate if present.
    fn utf16_unit(&mut self, code: u32) -> Result<char, SyntaxError> {
        if (0xD800..0xDC00).contains(&code) && self.bytes[self.pos..].starts_with(b"\\u") {
            let save = self.pos;
            self.pos += 2;
            let low = self.hex(4)?;
            if (0xDC00..0xE000).contains(&low) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            self.pos = save;
        }
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn hex(&mut self, digits: usize) -> Result<u32, SyntaxError> {
        let end = self.pos + digits;
        let text = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated hex escape"))?;
        let code = u32::from_str_radix(text, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos = end;
        Ok(code)
    }

    fn number(&mut self) -> Result<Value, SyntaxError> {
        let start = self.pos;
        if let Some(b'+' | b'-') = self.peek() {
            self.pos += 1;
        }

        let mut is_float = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => {}
                b'.' => is_float = true,
                b'e' | b'E' => {
                    is_float = true;
                    if let Some(b'+' | b'-') = self.bytes.get(self.pos + 1).copied() {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }

        let text = self.src[start..self.pos].trim_start_matches('+');
        // Python 2 long suffix
        if let Some(b'L' | b'l') = self.peek() {
            self.pos += 1;
        }

        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::from(i));
            }
            if let Ok(u) = text.parse::<u64>() {
                return Ok(Value::from(u));
            }
        }

        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| SyntaxError {
                offset: start,
                message: format!("invalid number '{}'", &self.src[start..self.pos]),
            })
    }
}

fn is_string_prefix(word: &str) -> bool {
    !word.is_empty()
        && word.len() <= 2
        && word
            .chars()
            .all(|c| matches!(c, 'u' | 'U' | 'b' | 'B' | 'r' | 'R'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_review_line() {
        let line = "{'rating': 5.0, 'reviewerName': u'Sam', 'reviewText': None, \
                    'categories': [u'Cafe', u'Bakery'], 'gPlaceId': u'P1', \
                    'unixReviewTime': 1372686659, 'reviewTime': u'Jul 1, 2013'}";
        let value = parse(line).unwrap();

        assert_eq!(value["rating"], json!(5.0));
        assert_eq!(value["reviewerName"], json!("Sam"));
        assert_eq!(value["reviewText"], Value::Null);
        assert_eq!(value["categories"], json!(["Cafe", "Bakery"]));
        assert_eq!(value["unixReviewTime"], json!(1372686659));
        assert_eq!(value["reviewTime"], json!("Jul 1, 2013"));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(parse(r"'it\'s'").unwrap(), json!("it's"));
        assert_eq!(parse(r#""say \"hi\"""#).unwrap(), json!("say \"hi\""));
        assert_eq!(parse(r"u'caf\xe9'").unwrap(), json!("café"));
        assert_eq!(parse(r"u'\u65e5\u672c'").unwrap(), json!("日本"));
        assert_eq!(parse(r"u'\U0001f600'").unwrap(), json!("😀"));
        assert_eq!(parse(r"u'\ud83d\ude00'").unwrap(), json!("😀"));
        assert_eq!(parse(r"'a\nb\tc\\d'").unwrap(), json!("a\nb\tc\\d"));
        assert_eq!(parse(r"'keep \q'").unwrap(), json!("keep \\q"));
        assert_eq!(parse(r"r'C:\path'").unwrap(), json!("C:\\path"));
    }

    #[test]
    fn test_non_ascii_passthrough() {
        assert_eq!(parse("u'Zürich'").unwrap(), json!("Zürich"));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse("None").unwrap(), Value::Null);
        assert_eq!(parse("True").unwrap(), json!(true));
        assert_eq!(parse("False").unwrap(), json!(false));
        assert_eq!(parse("-12").unwrap(), json!(-12));
        assert_eq!(parse("+3").unwrap(), json!(3));
        assert_eq!(parse("123L").unwrap(), json!(123));
        assert_eq!(parse("4.5").unwrap(), json!(4.5));
        assert_eq!(parse("1e3").unwrap(), json!(1000.0));
        assert_eq!(parse("18446744073709551615").unwrap(), json!(u64::MAX));
    }

    #[test]
    fn test_nested_containers() {
        let value = parse("{'gps': (37.5, -122.1), 'hours': [['Mon', [['9:00 am--5:00 pm']]]], 'x': {}}")
            .unwrap();
        assert_eq!(value["gps"], json!([37.5, -122.1]));
        assert_eq!(value["hours"], json!([["Mon", [["9:00 am--5:00 pm"]]]]));
        assert_eq!(value["x"], json!({}));
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(parse("[1, 2, ]").unwrap(), json!([1, 2]));
        assert_eq!(parse("{'a': 1,}").unwrap(), json!({"a": 1}));
        assert_eq!(parse("(1,)").unwrap(), json!([1]));
    }

    #[test]
    fn test_errors() {
        let err = parse("{'a' 1}").unwrap_err();
        assert_eq!(err.offset, 5);

        assert!(parse("{'a': 1").is_err());
        assert!(parse("'open").is_err());
        assert!(parse("{'a': nan}").is_err());
        assert!(parse("{'a': 1} extra").is_err());
        assert!(parse("").is_err());
        assert!(parse(r"'\x4'").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let err = parse(&"[".repeat(200_000)).unwrap_err();
        assert_eq!(err.message, "nesting too deep");
        assert_eq!(err.offset, MAX_DEPTH);

        let nested = format!("{}{}", "[(".repeat(50), ")]".repeat(50));
        assert!(parse(&nested).is_ok());

        let at_limit = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse(&at_limit).is_ok());
        let over = format!("{{'a': {}1{}}}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse(&over).is_err());
    }
}
