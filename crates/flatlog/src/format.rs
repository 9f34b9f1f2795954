//! Flat format constants and the position-tracking reader the decoder runs on.
//!
//! ```text
//! [entry_count: u64 LE]
//! [is_numeric: u8][key_len: u64 LE][key]
//!     numeric:     [value_count: u64 LE][f64 LE ...]
//!     categorical: [value_count: u64 LE]([str_len: u64 LE][str])...
//! ```
//!
//! Counts were written as the controller's `size_t`; every log in use comes
//! from a 64-bit build, so they are read as `u64`.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Read, Write};

/// Flag byte written for numeric columns. Any nonzero flag reads as numeric.
pub const NUMERIC_FLAG: u8 = 1;

/// Flag byte for categorical (string) columns.
pub const CATEGORICAL_FLAG: u8 = 0;

/// Size of one encoded sample of a numeric column.
pub const F64_BYTES: u64 = 8;

/// Length prefix that marks a missing name or sample.
pub const MISSING_LENGTH: u64 = 0;

/// Upper bound on capacity reserved from an untrusted count. Larger columns
/// still decode, they just grow as bytes actually arrive.
pub const PREALLOC_LIMIT: u64 = 64 * 1024;

/// Returns `true` if a column flag byte denotes a numeric column.
#[inline]
#[must_use]
pub fn is_numeric_flag(flag: u8) -> bool {
    flag != CATEGORICAL_FLAG
}

/// Writes a length-prefixed byte string: `[len: u64 LE][bytes]`.
pub fn write_prefixed<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    w.write_u64::<LittleEndian>(bytes.len() as u64)?;
    w.write_all(bytes)
}

/// A `Read` adapter that counts consumed bytes, so errors can report the
/// offset they happened at.
pub struct CountingReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}
