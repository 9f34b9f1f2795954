use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_are_strict() {
    let cfg = DecoderConfig::default();
    assert!(cfg.check_column_lengths);
    assert_eq!(cfg.unnamed_columns, UnnamedColumnPolicy::Reject);
    assert_eq!(cfg.max_key_bytes, DEFAULT_MAX_KEY_BYTES);
    assert_eq!(cfg.max_string_bytes, DEFAULT_MAX_STRING_BYTES);
}

#[test]
fn empty_lookup_gives_defaults() {
    let cfg = DecoderConfig::from_lookup(|_| None);
    assert_eq!(cfg, DecoderConfig::default());
}

#[test]
fn lookup_overrides_every_field() {
    let cfg = DecoderConfig::from_lookup(lookup_from(&[
        ("FLATLOG_CHECK_LENGTHS", "false"),
        ("FLATLOG_UNNAMED", "Placeholder"),
        ("FLATLOG_MAX_KEY_BYTES", "16"),
        ("FLATLOG_MAX_STRING_BYTES", " 32 "),
    ]));
    assert!(!cfg.check_column_lengths);
    assert_eq!(cfg.unnamed_columns, UnnamedColumnPolicy::Placeholder);
    assert_eq!(cfg.max_key_bytes, 16);
    assert_eq!(cfg.max_string_bytes, 32);
}

#[test]
fn garbage_values_fall_back_to_defaults() {
    let cfg = DecoderConfig::from_lookup(lookup_from(&[
        ("FLATLOG_CHECK_LENGTHS", "maybe"),
        ("FLATLOG_UNNAMED", "drop"),
        ("FLATLOG_MAX_KEY_BYTES", "-1"),
    ]));
    assert_eq!(cfg, DecoderConfig::default());
}

#[test]
fn builders_adjust_fields() {
    let cfg = DecoderConfig::default()
        .lenient_lengths()
        .with_unnamed_columns(UnnamedColumnPolicy::Placeholder);
    assert!(!cfg.check_column_lengths);
    assert_eq!(cfg.unnamed_columns, UnnamedColumnPolicy::Placeholder);
}

#[test]
fn placeholder_name_uses_index() {
    assert_eq!(UnnamedColumnPolicy::placeholder_name(3), "<unnamed:3>");
}
