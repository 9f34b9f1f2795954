use byteorder::{LittleEndian, WriteBytesExt};
use std::collections::HashSet;
use std::fs::{remove_file, rename, OpenOptions};
use std::io::{BufWriter, IntoInnerError, Write};
use std::path::Path;

use crate::error::{FlatError, Result};
use crate::format::{write_prefixed, CATEGORICAL_FLAG, MISSING_LENGTH, NUMERIC_FLAG};
use crate::table::{Column, LogTable};

/// Encodes a [`LogTable`] in the flat format.
///
/// Stateless, like the decoder's free functions: [`encode`](FlatWriter::encode)
/// targets any `Write`, [`write_file`](FlatWriter::write_file) adds crash-safe
/// file replacement on top.
pub struct FlatWriter {}

impl FlatWriter {
    /// Writes `table` to `w`.
    ///
    /// The table is checked in full before the first byte is written, so a
    /// rejected table leaves `w` untouched.
    ///
    /// # Errors
    ///
    /// [`FlatError::Unencodable`] if the table holds something the format
    /// cannot carry:
    ///
    /// - an empty or non-ASCII column name,
    /// - an empty or non-ASCII categorical level (an empty one would read
    ///   back as missing),
    /// - the same level twice in one column,
    /// - a code with no level behind it.
    ///
    /// [`FlatError::Io`] on write failure.
    pub fn encode<W: Write>(table: &LogTable, w: &mut W) -> Result<()> {
        Self::check_encodable(table)?;

        w.write_u64::<LittleEndian>(table.len() as u64)?;
        for (name, column) in table.iter() {
            match column {
                Column::Numeric(values) => {
                    w.write_u8(NUMERIC_FLAG)?;
                    write_prefixed(w, name.as_bytes())?;
                    w.write_u64::<LittleEndian>(values.len() as u64)?;
                    for v in values {
                        w.write_f64::<LittleEndian>(*v)?;
                    }
                }
                Column::Categorical(cat) => {
                    w.write_u8(CATEGORICAL_FLAG)?;
                    write_prefixed(w, name.as_bytes())?;
                    w.write_u64::<LittleEndian>(cat.len() as u64)?;
                    for value in cat.values() {
                        match value {
                            Some(s) => write_prefixed(w, s.as_bytes())?,
                            None => w.write_u64::<LittleEndian>(MISSING_LENGTH)?,
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes `table` to a new file at `path`.
    ///
    /// # Crash Safety
    ///
    /// Writes to `path.flat.tmp` (the extension replaced), calls
    /// `sync_all()`, then atomically renames over `path`. If any step fails
    /// the temp file is removed.
    ///
    /// # Errors
    ///
    /// Same as [`encode`](FlatWriter::encode), wrapped in
    /// [`FlatError::File`].
    pub fn write_file<P: AsRef<Path>>(path: P, table: &LogTable) -> Result<()> {
        let path = path.as_ref();
        Self::write_file_inner(path, table).map_err(|e| e.at_path(path))
    }

    fn write_file_inner(path: &Path, table: &LogTable) -> Result<()> {
        let tmp_path = path.with_extension("flat.tmp");
        if let Err(e) = Self::write_temp_and_rename(&tmp_path, path, table) {
            let _ = remove_file(&tmp_path);
            return Err(e);
        }

        if let Some(parent) = path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    fn write_temp_and_rename(tmp_path: &Path, path: &Path, table: &LogTable) -> Result<()> {
        let raw_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(tmp_path)?;
        let mut file = BufWriter::new(raw_file);

        Self::encode(table, &mut file)?;
        file.flush()?;
        file.into_inner()
            .map_err(IntoInnerError::into_error)?
            .sync_all()?;
        rename(tmp_path, path)?;
        Ok(())
    }

    fn check_encodable(table: &LogTable) -> Result<()> {
        let reject = |column: &str, reason: String| FlatError::Unencodable {
            column: column.to_string(),
            reason,
        };

        for (name, column) in table.iter() {
            if name.is_empty() {
                return Err(reject(name, "empty column name".into()));
            }
            if !name.is_ascii() {
                return Err(reject(name, "column name is not ASCII".into()));
            }

            let Column::Categorical(cat) = column else {
                continue;
            };
            let mut seen = HashSet::with_capacity(cat.levels().len());
            for level in cat.levels() {
                if level.is_empty() {
                    return Err(reject(name, "empty level reads back as missing".into()));
                }
                if !level.is_ascii() {
                    return Err(reject(name, format!("level {:?} is not ASCII", level)));
                }
                if !seen.insert(level.as_str()) {
                    return Err(reject(name, format!("level {:?} appears twice", level)));
                }
            }
            if let Some(code) = cat
                .codes()
                .iter()
                .flatten()
                .find(|&&c| cat.level(c).is_none())
            {
                return Err(reject(name, format!("code {} has no level", code)));
            }
        }
        Ok(())
    }
}
