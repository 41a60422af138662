//! Raw newline counting used as the progress denominator.
//!
//! The count is taken over the bytes on disk. For compressed input this is
//! the number of newline bytes in the compressed stream, so the progress
//! percentage of a gzip file is only a rough indication.

use crate::error::{ConvertError, Result};
use memchr::memchr_iter;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read block size (1 MiB).
pub const COUNT_BUFFER: usize = 1024 * 1024;

/// Count newline bytes in the file at `path`.
pub fn count_lines<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ConvertError::file_access(path, e))?;
    count_lines_reader(file).map_err(|e| match e {
        ConvertError::Io(source) => ConvertError::file_access(path, source),
        other => other,
    })
}

/// Count newline bytes in any reader, one fixed-size block at a time.
pub fn count_lines_reader<R: Read>(mut reader: R) -> Result<u64> {
    let mut buf = vec![0u8; COUNT_BUFFER];
    let mut lines: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        lines += memchr_iter(b'\n', &buf[..n]).count() as u64;
    }

    Ok(lines)
}
