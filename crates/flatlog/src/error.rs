//! Error types for flat log decoding and encoding.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Position in the input where a failing read started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Byte offset from the start of the input.
    pub offset: u64,
    /// Index of the column being read, `None` while reading the header.
    pub column: Option<u64>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte {}", self.offset)?;
        if let Some(column) = self.column {
            write!(f, " (column {})", column)?;
        }
        Ok(())
    }
}

/// Errors produced while reading or writing flat logs.
///
/// Decoding is all-or-nothing: any of these aborts the decode and no
/// partial table is returned.
#[derive(Debug, Error)]
pub enum FlatError {
    /// An underlying I/O error other than a short read.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// An I/O error other than a short read, raised partway through the input.
    #[error("read failed at {at}: {source}")]
    ReadFailed {
        at: Location,
        #[source]
        source: io::Error,
    },

    /// The input ended before a declared count or length was satisfied.
    #[error("truncated input at {at}: {what} needs {expected} bytes, only {got} available")]
    TruncatedInput {
        at: Location,
        what: &'static str,
        expected: u64,
        got: u64,
    },

    /// A column name or categorical sample contains non-ASCII bytes.
    #[error("invalid encoding at {at}: {what} is not ASCII")]
    InvalidEncoding { at: Location, what: &'static str },

    /// A column's length differs from the first column's.
    #[error("column {name:?} at {at} has {actual} samples but {first:?} has {expected}")]
    InconsistentColumnLength {
        at: Location,
        name: String,
        first: String,
        expected: usize,
        actual: usize,
    },

    /// A column has a zero-length name and the config rejects those.
    #[error("column at {at} has no name")]
    UnnamedColumn { at: Location },

    /// Two columns share a name. `at` is set when the duplicate came from
    /// decoded input.
    #[error("duplicate column name {name:?} (column {index})")]
    DuplicateColumn {
        name: String,
        index: u64,
        at: Option<Location>,
    },

    /// A declared size is above the configured limit.
    #[error("{what} at {at} is {size}, limit is {limit}")]
    LimitExceeded {
        at: Location,
        what: &'static str,
        size: u64,
        limit: u64,
    },

    /// The table holds something the flat format cannot represent.
    #[error("cannot encode column {column:?}: {reason}")]
    Unencodable { column: String, reason: String },

    /// Any of the above, raised while processing `path`.
    #[error("{}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<FlatError>,
    },
}

impl FlatError {
    /// Returns the innermost error, looking through [`FlatError::File`].
    #[must_use]
    pub fn root(&self) -> &FlatError {
        match self {
            FlatError::File { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns where in the input the error was raised, if known.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        match self.root() {
            FlatError::TruncatedInput { at, .. }
            | FlatError::InvalidEncoding { at, .. }
            | FlatError::UnnamedColumn { at }
            | FlatError::LimitExceeded { at, .. }
            | FlatError::ReadFailed { at, .. }
            | FlatError::InconsistentColumnLength { at, .. } => Some(*at),
            FlatError::DuplicateColumn { at, .. } => *at,
            _ => None,
        }
    }

    pub(crate) fn at_path(self, path: &Path) -> FlatError {
        FlatError::File {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlatError>;
