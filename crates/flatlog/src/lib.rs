//! # FlatLog - robot telemetry log decoder
//!
//! Reads the binary "flat" log format written by the robot controller and
//! turns it into a [`LogTable`]: an ordered map from column name to column
//! data. Each column is either a run of `f64` samples or a run of
//! categorical samples stored as small integer codes plus the list of
//! distinct strings they stand for.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ entry_count (u64)                                             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ COLUMN (repeated entry_count times)                           │
//! │                                                               │
//! │ is_numeric (u8) | key_len (u64) | key (ASCII)                 │
//! │                                                               │
//! │ numeric:     value_count (u64) | value_count x f64            │
//! │ categorical: value_count (u64) | value_count x                │
//! │              [str_len (u64) | str (ASCII)]                    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. There is no magic number, version or
//! checksum. A `key_len` or `str_len` of zero marks a missing name or a
//! missing sample.
//!
//! ## Example
//!
//! ```rust,no_run
//! use flatlog::{decode, Column};
//!
//! let table = decode("controller.flat").unwrap();
//! if let Some(Column::Numeric(t)) = table.get("t") {
//!     println!("{} samples", t.len());
//! }
//! ```

mod derive;
mod error;
mod format;
mod intern;
mod reader;
mod table;
mod writer;

pub use config::{DecoderConfig, UnnamedColumnPolicy};
pub use error::{FlatError, Location, Result};
pub use format::{CATEGORICAL_FLAG, NUMERIC_FLAG};
pub use intern::{LevelOverflow, StringInternTable, MAX_LEVELS};
pub use reader::{decode, decode_bytes, decode_with, FlatReader};
pub use table::{CategoricalColumn, Column, ColumnKind, LogTable};
pub use writer::FlatWriter;

#[cfg(test)]
mod tests;
