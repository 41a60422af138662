//! Diagnostics output.
//!
//! Progress and status lines go through a logger built from an explicit
//! [`LogConfig`] instead of a process-wide logger, so a converter can be
//! constructed with its own destination, threshold and line template.

use crate::error::{ConvertError, Result};
use chrono::Local;
use log::{Level, LevelFilter, Log, Record};
use std::fmt;
use std::io::Write;

/// Timestamp layout for the `{time}` placeholder.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default line template: `2024-01-31 12:00:00 INFO     message`.
pub const DEFAULT_FORMAT: &str = "{time} {level} {message}";

/// Level names accepted by [`parse_level`].
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Parse a level threshold name (case-insensitive).
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        _ => Err(ConvertError::InvalidArgument(format!(
            "unknown log level '{}'",
            name
        ))),
    }
}

/// Where diagnostics are written.
pub enum LogStream {
    Stderr,
    Stdout,
    /// Any writer, e.g. a file or an in-memory buffer.
    Pipe(Box<dyn Write + Send + 'static>),
}

impl fmt::Debug for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStream::Stderr => f.write_str("Stderr"),
            LogStream::Stdout => f.write_str("Stdout"),
            LogStream::Pipe(_) => f.write_str("Pipe(..)"),
        }
    }
}

/// Logging configuration: destination stream, level threshold and template.
///
/// The template understands `{time}`, `{level}` (padded to 8 columns) and
/// `{message}`. Anything else is copied through unchanged.
#[derive(Debug)]
pub struct LogConfig {
    pub stream: LogStream,
    pub level: LevelFilter,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            stream: LogStream::Stderr,
            level: LevelFilter::Debug,
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl LogConfig {
    pub fn with_stream(mut self, stream: LogStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_format<S: Into<String>>(mut self, format: S) -> Self {
        self.format = format.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Time,
    Level,
    Message,
}

fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open..];
        let Some(close) = after.find('}') else {
            rest = after;
            break;
        };

        let placeholder = match &after[1..close] {
            "time" => Some(Segment::Time),
            "level" => Some(Segment::Level),
            "message" => Some(Segment::Message),
            _ => None,
        };
        match placeholder {
            Some(segment) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
            }
            None => literal.push_str(&after[..=close]),
        }
        rest = &after[close + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// A logger owned by one conversion run.
pub struct Diagnostics {
    logger: env_logger::Logger,
}

impl Diagnostics {
    pub fn new(config: LogConfig) -> Self {
        let segments = parse_template(&config.format);
        let target = match config.stream {
            LogStream::Stderr => env_logger::Target::Stderr,
            LogStream::Stdout => env_logger::Target::Stdout,
            LogStream::Pipe(pipe) => env_logger::Target::Pipe(pipe),
        };

        let logger = env_logger::Builder::new()
            .target(target)
            .filter_level(config.level)
            .write_style(env_logger::WriteStyle::Never)
            .format(move |buf, record| {
                for segment in &segments {
                    match segment {
                        Segment::Literal(s) => buf.write_all(s.as_bytes())?,
                        Segment::Time => write!(buf, "{}", Local::now().format(TIME_FORMAT))?,
                        Segment::Level => write!(buf, "{:<8}", record.level())?,
                        Segment::Message => write!(buf, "{}", record.args())?,
                    }
                }
                writeln!(buf)
            })
            .build();

        Self { logger }
    }

    /// Diagnostics that discard everything.
    pub fn disabled() -> Self {
        Self::new(LogConfig::default().with_level(LevelFilter::Off))
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.logger.filter()
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.logger.log(
            &Record::builder()
                .args(args)
                .level(level)
                .target(env!("CARGO_PKG_NAME"))
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn flush(&self) {
        self.logger.flush();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory log sink shared between a test and its logger.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(config: LogConfig) -> (Diagnostics, SharedBuf) {
        let sink = SharedBuf::default();
        let diag = Diagnostics::new(config.with_stream(LogStream::Pipe(Box::new(sink.clone()))));
        (diag, sink)
    }

    #[test]
    fn test_parse_template() {
        assert_eq!(
            parse_template(DEFAULT_FORMAT),
            vec![
                Segment::Time,
                Segment::Literal(" ".to_string()),
                Segment::Level,
                Segment::Literal(" ".to_string()),
                Segment::Message,
            ]
        );
        assert_eq!(
            parse_template("[{pid}] {message} {"),
            vec![
                Segment::Literal("[{pid}] ".to_string()),
                Segment::Message,
                Segment::Literal(" {".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_line_layout() {
        let (diag, sink) = capture(LogConfig::default());
        diag.info(format_args!("completed {} rows ({}%)", 10000, 50));
        diag.flush();

        let out = sink.contents();
        let line = out.lines().next().unwrap();
        // "YYYY-MM-DD HH:MM:SS " is 20 bytes
        let (stamp, rest) = line.split_at(20);
        assert!(chrono::NaiveDateTime::parse_from_str(stamp.trim_end(), TIME_FORMAT).is_ok());
        assert_eq!(rest, "INFO     completed 10000 rows (50%)");
    }

    #[test]
    fn test_level_threshold() {
        let (diag, sink) = capture(
            LogConfig::default()
                .with_level(LevelFilter::Warn)
                .with_format("{level}|{message}"),
        );
        diag.info(format_args!("hidden"));
        diag.debug(format_args!("hidden"));
        diag.warn(format_args!("shown"));
        diag.error(format_args!("also shown"));
        diag.flush();

        assert_eq!(sink.contents(), "WARN    |shown\nERROR   |also shown\n");
        assert!(!diag.enabled(Level::Info));
    }

    #[test]
    fn test_parse_level() {
        for name in LOG_LEVELS {
            assert!(parse_level(name).is_ok());
        }
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert!(matches!(
            parse_level("verbose"),
            Err(ConvertError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_disabled() {
        let diag = Diagnostics::disabled();
        assert!(!diag.enabled(Level::Error));
        diag.error(format_args!("nothing happens"));
    }
}
