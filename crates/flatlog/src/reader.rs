use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use config::{DecoderConfig, UnnamedColumnPolicy};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{FlatError, Location, Result};
use crate::format::{is_numeric_flag, CountingReader, F64_BYTES, MISSING_LENGTH, PREALLOC_LIMIT};
use crate::intern::{StringInternTable, MAX_LEVELS};
use crate::table::{Column, LogTable};

/// Decodes the flat log at `path` with the default [`DecoderConfig`].
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode<P: AsRef<Path>>(path: P) -> Result<LogTable> {
    decode_with(path, &DecoderConfig::default())
}

/// Decodes the flat log at `path`.
///
/// The file is read once, front to back, through a buffered handle. The
/// returned table is complete; on any failure nothing is returned.
///
/// # Errors
///
/// Any [`FlatError`], wrapped in [`FlatError::File`] so the message names
/// the file. Use [`FlatError::root`] to match on the underlying variant.
pub fn decode_with<P: AsRef<Path>>(path: P, config: &DecoderConfig) -> Result<LogTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FlatError::from(e).at_path(path))?;
    let table = FlatReader::new(BufReader::new(file), config)
        .read_table()
        .map_err(|e| e.at_path(path))?;

    debug!(
        path = %path.display(),
        columns = table.len(),
        samples = table.sample_count().unwrap_or(0),
        "decoded flat log"
    );
    Ok(table)
}

/// Decodes a flat log held in memory.
///
/// # Errors
///
/// Same as [`FlatReader::read_table`].
pub fn decode_bytes(bytes: &[u8], config: &DecoderConfig) -> Result<LogTable> {
    FlatReader::new(bytes, config).read_table()
}

/// Single-pass flat log decoder over any `Read` implementor.
///
/// Declared sizes are never trusted for allocation: payloads are read through
/// a bounded `take`, so a corrupt count fails with
/// [`FlatError::TruncatedInput`] once the input runs out instead of reserving
/// memory up front.
pub struct FlatReader<'c, R: Read> {
    rdr: CountingReader<R>,
    config: &'c DecoderConfig,
    /// Column currently being read, for error locations.
    column: Option<u64>,
}

impl<'c, R: Read> FlatReader<'c, R> {
    pub fn new(reader: R, config: &'c DecoderConfig) -> Self {
        Self {
            rdr: CountingReader::new(reader),
            config,
            column: None,
        }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.rdr.position()
    }

    /// Reads the whole log.
    ///
    /// # Errors
    ///
    /// - [`FlatError::TruncatedInput`] if the input ends early.
    /// - [`FlatError::InvalidEncoding`] on non-ASCII names or samples.
    /// - [`FlatError::InconsistentColumnLength`] if lengths differ and
    ///   `check_column_lengths` is set.
    /// - [`FlatError::UnnamedColumn`] for a zero-length name under
    ///   [`UnnamedColumnPolicy::Reject`].
    /// - [`FlatError::DuplicateColumn`] if a name repeats.
    /// - [`FlatError::LimitExceeded`] if a name, sample or level count is
    ///   over its limit.
    /// - [`FlatError::ReadFailed`] if the underlying reader fails.
    pub fn read_table(mut self) -> Result<LogTable> {
        let entry_count = self.read_count("column count")?;
        let mut table = LogTable::new();

        for index in 0..entry_count {
            self.column = Some(index);
            let start = self.here();
            let (name, column) = self.read_column(index)?;

            if table.contains(&name) {
                return Err(FlatError::DuplicateColumn {
                    name,
                    index,
                    at: Some(start),
                });
            }
            if self.config.check_column_lengths {
                if let Some((first, first_column)) = table.iter().next() {
                    if first_column.len() != column.len() {
                        return Err(FlatError::InconsistentColumnLength {
                            at: start,
                            first: first.to_string(),
                            expected: first_column.len(),
                            actual: column.len(),
                            name,
                        });
                    }
                }
            }

            debug!(
                column = index,
                name = %name,
                kind = %column.kind(),
                len = column.len(),
                "decoded column"
            );
            table.push(name, column);
        }

        self.column = None;
        self.skip_trailing()?;
        Ok(table)
    }

    fn read_column(&mut self, index: u64) -> Result<(String, Column)> {
        let is_numeric = is_numeric_flag(self.read_u8("column kind flag")?);

        let key_at = self.here();
        let name = match self.read_string("column name", self.config.max_key_bytes)? {
            Some(name) => name,
            None => match self.config.unnamed_columns {
                UnnamedColumnPolicy::Reject => {
                    return Err(FlatError::UnnamedColumn { at: key_at });
                }
                UnnamedColumnPolicy::Placeholder => {
                    let name = UnnamedColumnPolicy::placeholder_name(index);
                    warn!(column = index, name = %name, "column has no name, using placeholder");
                    name
                }
            },
        };

        let column = if is_numeric {
            self.read_numeric()?
        } else {
            self.read_categorical()?
        };
        Ok((name, column))
    }

    fn read_numeric(&mut self) -> Result<Column> {
        let count = self.read_count("numeric value count")?;
        let bytes = self.read_bytes(count.saturating_mul(F64_BYTES), "numeric values")?;

        // from_bits per value: NaN payloads survive untouched.
        let mut values = vec![0f64; bytes.len() / F64_BYTES as usize];
        LittleEndian::read_f64_into(&bytes, &mut values);
        Ok(Column::Numeric(values))
    }

    fn read_categorical(&mut self) -> Result<Column> {
        let count = self.read_count("categorical value count")?;
        let mut interner = StringInternTable::new();
        let mut codes = Vec::with_capacity(count.min(PREALLOC_LIMIT) as usize);

        for _ in 0..count {
            let at = self.here();
            let value = self.read_string("categorical value", self.config.max_string_bytes)?;
            let code = interner
                .intern(value.as_deref())
                .map_err(|_| FlatError::LimitExceeded {
                    at,
                    what: "distinct categorical values",
                    size: MAX_LEVELS + 1,
                    limit: MAX_LEVELS,
                })?;
            codes.push(code);
        }

        Ok(Column::Categorical(interner.into_column(codes)))
    }

    /// Reads `[len: u64][len ASCII bytes]`. A zero length is the missing
    /// marker and yields `None`.
    fn read_string(&mut self, what: &'static str, limit: u64) -> Result<Option<String>> {
        let at = self.here();
        let len = self.read_count(what)?;
        if len == MISSING_LENGTH {
            return Ok(None);
        }
        if len > limit {
            return Err(FlatError::LimitExceeded {
                at,
                what,
                size: len,
                limit,
            });
        }

        let bytes = self.read_bytes(len, what)?;
        if !bytes.is_ascii() {
            return Err(FlatError::InvalidEncoding { at, what });
        }
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| FlatError::InvalidEncoding { at, what })
    }

    fn read_bytes(&mut self, len: u64, what: &'static str) -> Result<Vec<u8>> {
        let at = self.here();
        let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT) as usize);
        let res = (&mut self.rdr).take(len).read_to_end(&mut buf);
        res.map_err(|source| FlatError::ReadFailed { at, source })?;

        let got = buf.len() as u64;
        if got < len {
            return Err(FlatError::TruncatedInput {
                at,
                what,
                expected: len,
                got,
            });
        }
        Ok(buf)
    }

    fn read_count(&mut self, what: &'static str) -> Result<u64> {
        let at = self.here();
        let res = self.rdr.read_u64::<LittleEndian>();
        res.map_err(|e| self.short_read(e, at, what, 8))
    }

    fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        let at = self.here();
        let res = self.rdr.read_u8();
        res.map_err(|e| self.short_read(e, at, what, 1))
    }

    /// Maps an EOF from a fixed-size read to `TruncatedInput`, anything else
    /// to `ReadFailed`.
    fn short_read(&self, e: io::Error, at: Location, what: &'static str, expected: u64) -> FlatError {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FlatError::TruncatedInput {
                at,
                what,
                expected,
                got: self.rdr.position() - at.offset,
            }
        } else {
            FlatError::ReadFailed { at, source: e }
        }
    }

    fn skip_trailing(&mut self) -> Result<()> {
        let at = self.here();
        let res = io::copy(&mut self.rdr, &mut io::sink());
        let trailing = res.map_err(|source| FlatError::ReadFailed { at, source })?;
        if trailing > 0 {
            warn!(offset = at.offset, trailing_bytes = trailing, "ignoring bytes after the last column");
        }
        Ok(())
    }

    fn here(&self) -> Location {
        Location {
            offset: self.rdr.position(),
            column: self.column,
        }
    }
}
