//! # Config - decoder settings
//!
//! Settings that control how strictly a flat log is decoded and how much
//! memory a single declared length may claim.
//!
//! A [`DecoderConfig`] is built once at process start (usually through
//! [`DecoderConfig::from_env`]) and passed by reference to every decode call.
//! Nothing in the workspace reads these values from ambient global state.
//!
//! ## Environment variables
//!
//! ```text
//! FLATLOG_CHECK_LENGTHS     verify equal column lengths  (default: "true")
//! FLATLOG_UNNAMED           "reject" | "placeholder"     (default: "reject")
//! FLATLOG_MAX_KEY_BYTES     max column name size         (default: 65536)
//! FLATLOG_MAX_STRING_BYTES  max categorical sample size  (default: 1048576)
//! ```

use std::str::FromStr;

/// Default cap on a column name (64 KiB).
pub const DEFAULT_MAX_KEY_BYTES: u64 = 64 * 1024;

/// Default cap on a single categorical sample (1 MiB).
pub const DEFAULT_MAX_STRING_BYTES: u64 = 1024 * 1024;

/// What the decoder does with a column whose name has zero length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnnamedColumnPolicy {
    /// Fail the whole decode.
    #[default]
    Reject,
    /// Store the column as `<unnamed:{index}>`, `index` being its position
    /// in the file.
    Placeholder,
}

impl UnnamedColumnPolicy {
    /// Name used for the column at `index` under the placeholder policy.
    #[must_use]
    pub fn placeholder_name(index: u64) -> String {
        format!("<unnamed:{}>", index)
    }
}

impl FromStr for UnnamedColumnPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "placeholder" => Ok(Self::Placeholder),
            other => Err(format!("unknown unnamed-column policy: {}", other)),
        }
    }
}

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Fail with an inconsistent-length error when columns differ in length.
    pub check_column_lengths: bool,
    /// Handling of zero-length column names.
    pub unnamed_columns: UnnamedColumnPolicy,
    /// Largest column name accepted, in bytes.
    pub max_key_bytes: u64,
    /// Largest categorical sample accepted, in bytes.
    pub max_string_bytes: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            check_column_lengths: true,
            unnamed_columns: UnnamedColumnPolicy::Reject,
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_string_bytes: DEFAULT_MAX_STRING_BYTES,
        }
    }
}

impl DecoderConfig {
    /// Builds a config from `FLATLOG_*` environment variables.
    ///
    /// Unset or unparsable variables fall back to the default for that field.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`,
    /// so callers (and tests) can supply their own source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            check_column_lengths: parse_or(
                lookup("FLATLOG_CHECK_LENGTHS"),
                defaults.check_column_lengths,
            ),
            unnamed_columns: parse_or(lookup("FLATLOG_UNNAMED"), defaults.unnamed_columns),
            max_key_bytes: parse_or(lookup("FLATLOG_MAX_KEY_BYTES"), defaults.max_key_bytes),
            max_string_bytes: parse_or(
                lookup("FLATLOG_MAX_STRING_BYTES"),
                defaults.max_string_bytes,
            ),
        }
    }

    /// Disables the equal-length check.
    #[must_use]
    pub fn lenient_lengths(mut self) -> Self {
        self.check_column_lengths = false;
        self
    }

    /// Sets the unnamed-column policy.
    #[must_use]
    pub fn with_unnamed_columns(mut self, policy: UnnamedColumnPolicy) -> Self {
        self.unnamed_columns = policy;
        self
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests;
