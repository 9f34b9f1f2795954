//! In-memory result of a decode: [`LogTable`] and its [`Column`]s.

use std::collections::HashMap;
use std::fmt;

use crate::error::{FlatError, Result};
use crate::intern::{LevelOverflow, StringInternTable};

/// The two kinds of column the flat format stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => f.write_str("numeric"),
            ColumnKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// Samples of a string-valued column, stored as codes into `levels`.
///
/// `codes[i] == Some(c)` means sample `i` is `levels[c]`; `None` means the
/// sample was missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoricalColumn {
    codes: Vec<Option<i32>>,
    levels: Vec<String>,
}

impl CategoricalColumn {
    /// Builds a column from raw parts. Nothing is validated here; the
    /// encoder rejects codes that have no level.
    pub fn new(codes: Vec<Option<i32>>, levels: Vec<String>) -> Self {
        Self { codes, levels }
    }

    /// Interns `values` in order, the same way the decoder does.
    pub fn from_values<'a, I>(values: I) -> std::result::Result<Self, LevelOverflow>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut interner = StringInternTable::new();
        let codes = values
            .into_iter()
            .map(|v| interner.intern(v))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(interner.into_column(codes))
    }

    pub fn codes(&self) -> &[Option<i32>] {
        &self.codes
    }

    /// Distinct strings in code order.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// String behind `code`.
    #[must_use]
    pub fn level(&self, code: i32) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.levels.get(i))
            .map(String::as_str)
    }

    /// Code assigned to `value`, if it occurs in the column.
    #[must_use]
    pub fn code_of(&self, value: &str) -> Option<i32> {
        self.levels
            .iter()
            .position(|l| l == value)
            .and_then(|i| i32::try_from(i).ok())
    }

    /// Sample `index` as a string; `None` if missing or out of range.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.codes
            .get(index)
            .copied()
            .flatten()
            .and_then(|c| self.level(c))
    }

    /// Samples as strings, `None` for missing ones.
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.codes
            .iter()
            .map(move |&c| c.and_then(|c| self.level(c)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// One decoded column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(CategoricalColumn),
}

impl Column {
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(c) => c.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalColumn> {
        match self {
            Column::Numeric(_) => None,
            Column::Categorical(c) => Some(c),
        }
    }
}

/// Column name to column data, in file order.
///
/// Names are unique. A table coming out of the decoder is never modified in
/// place; derivations such as
/// [`with_joint_derivations`](LogTable::with_joint_derivations) consume it
/// and return a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogTable {
    columns: Vec<(String, Column)>,
    index: HashMap<String, usize>,
}

impl LogTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(name, column)` pairs, keeping their order.
    ///
    /// # Errors
    ///
    /// [`FlatError::DuplicateColumn`] if a name repeats.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (i, (name, column)) in columns.into_iter().enumerate() {
            let name = name.into();
            if table.contains(&name) {
                return Err(FlatError::DuplicateColumn {
                    name,
                    index: i as u64,
                    at: None,
                });
            }
            table.push(name, column);
        }
        Ok(table)
    }

    /// Appends a column. Callers guarantee `name` is not already present.
    pub(crate) fn push(&mut self, name: String, column: Column) {
        debug_assert!(!self.index.contains_key(&name));
        self.index.insert(name.clone(), self.columns.len());
        self.columns.push((name, column));
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i].1)
    }

    /// The named column's samples, if it exists and is numeric.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.get(name).and_then(Column::as_numeric)
    }

    /// The named column, if it exists and is categorical.
    pub fn categorical(&self, name: &str) -> Option<&CategoricalColumn> {
        self.get(name).and_then(Column::as_categorical)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of samples, taken from the first column. `None` for a table
    /// with no columns.
    #[must_use]
    pub fn sample_count(&self) -> Option<usize> {
        self.columns.first().map(|(_, c)| c.len())
    }

    /// Column names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, column)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }
}
