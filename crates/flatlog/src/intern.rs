//! Per-column string interning for categorical samples.

use std::collections::HashMap;

use crate::table::CategoricalColumn;

/// Most distinct strings one column can hold: codes are `i32` and never
/// negative.
pub const MAX_LEVELS: u64 = i32::MAX as u64 + 1;

/// Returned when a column would need a code above `i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOverflow;

/// Assigns codes to distinct strings in order of first appearance.
///
/// The first distinct string gets `0`, the next new one `1`, and so on.
/// Comparison is byte-exact and case-sensitive. A missing sample is never
/// given a code: [`intern(None)`](StringInternTable::intern) yields `None`.
#[derive(Debug, Default, Clone)]
pub struct StringInternTable {
    codes: HashMap<String, i32>,
    levels: Vec<String>,
}

impl StringInternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `value`, assigning the next free one if the
    /// string has not been seen before.
    ///
    /// # Errors
    ///
    /// [`LevelOverflow`] if `value` is new and every code is taken.
    pub fn intern(&mut self, value: Option<&str>) -> Result<Option<i32>, LevelOverflow> {
        let Some(value) = value else {
            return Ok(None);
        };
        if let Some(&code) = self.codes.get(value) {
            return Ok(Some(code));
        }
        let code = i32::try_from(self.levels.len()).map_err(|_| LevelOverflow)?;
        self.codes.insert(value.to_owned(), code);
        self.levels.push(value.to_owned());
        Ok(Some(code))
    }

    /// Code previously assigned to `value`, if any.
    #[must_use]
    pub fn code_of(&self, value: &str) -> Option<i32> {
        self.codes.get(value).copied()
    }

    /// String behind `code`.
    #[must_use]
    pub fn level(&self, code: i32) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.levels.get(i))
            .map(String::as_str)
    }

    /// Distinct strings in code order.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Number of distinct strings seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Freezes the table into a column holding `codes`.
    pub fn into_column(self, codes: Vec<Option<i32>>) -> CategoricalColumn {
        CategoricalColumn::new(codes, self.levels)
    }
}
