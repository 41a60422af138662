//! Input opening with compression inference.
//!
//! Compression is inferred from the first bytes of the file, falling back to
//! the file extension. Gzip input is read with a multi-member decoder so that
//! concatenated `.gz` files decode completely.

use crate::error::{ConvertError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

/// Default input buffer size (256 KB).
pub const DEFAULT_INPUT_BUFFER: usize = 256 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Compression applied to an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Infer compression from the leading bytes, then from the extension.
    pub fn detect(path: &Path, head: &[u8]) -> Self {
        if head.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        if head.starts_with(&ZSTD_MAGIC) {
            return Compression::Zstd;
        }
        Self::from_extension(path)
    }

    /// Infer compression from the file extension alone.
    pub fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") | Some("gzip") => Compression::Gzip,
            Some("zst") | Some("zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zstd => "zstd",
        }
    }
}

/// An opened input: the decompressed byte stream and how it was encoded.
pub struct Input {
    pub reader: Box<dyn BufRead>,
    pub compression: Compression,
}

/// Open `path` for reading, decompressing if needed.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Input> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ConvertError::file_access(path, e))?;
    let mut raw = BufReader::with_capacity(DEFAULT_INPUT_BUFFER, file);

    let head = raw.fill_buf().map_err(|e| ConvertError::file_access(path, e))?;
    let compression = Compression::detect(path, head);

    let reader: Box<dyn BufRead> = match compression {
        Compression::None => Box::new(raw),
        Compression::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER,
            Decoded::new(compression, MultiGzDecoder::new(raw)),
        )),
        Compression::Zstd => {
            let decoder = zstd::stream::read::Decoder::with_buffer(raw)
                .map_err(|e| ConvertError::file_access(path, e))?;
            Box::new(BufReader::with_capacity(
                DEFAULT_INPUT_BUFFER,
                Decoded::new(compression, decoder),
            ))
        }
    };

    Ok(Input {
        reader,
        compression,
    })
}

/// Decoder wrapper that reports every decode failure as `InvalidData`.
///
/// flate2 and zstd use different error kinds for a corrupt or truncated
/// stream; downstream readers only need to tell bad content from a failing
/// file.
struct Decoded<R> {
    compression: Compression,
    inner: R,
}

impl<R: Read> Decoded<R> {
    fn new(compression: Compression, inner: R) -> Self {
        Self { compression, inner }
    }
}

impl<R: Read> Read for Decoded<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(|e| match e.kind() {
            ErrorKind::Interrupted => e,
            _ => io::Error::new(
                ErrorKind::InvalidData,
                format!("{} stream: {}", self.compression.name(), e),
            ),
        })
    }
}
