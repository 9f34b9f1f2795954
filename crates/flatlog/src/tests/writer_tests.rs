use super::helpers::{same_bits, FlatBytes};
use crate::*;
use anyhow::Result;
use tempfile::tempdir;

fn sample_table() -> LogTable {
    LogTable::from_columns([
        ("t", Column::Numeric(vec![0.0, 0.005, 0.01, 0.015])),
        ("qIn_0", Column::Numeric(vec![0.1, f64::NAN, -0.0, 1e-310])),
        (
            "state",
            Column::Categorical(
                CategoricalColumn::from_values([Some("idle"), None, Some("run"), Some("idle")])
                    .unwrap(),
            ),
        ),
    ])
    .unwrap()
}

fn assert_same_table(a: &LogTable, b: &LogTable) {
    assert_eq!(a.names().collect::<Vec<_>>(), b.names().collect::<Vec<_>>());
    for ((_, x), (name, y)) in a.iter().zip(b.iter()) {
        match (x, y) {
            (Column::Numeric(x), Column::Numeric(y)) => {
                assert!(same_bits(x, y), "numeric column {name} differs");
            }
            (Column::Categorical(x), Column::Categorical(y)) => {
                let xs: Vec<_> = x.values().collect();
                let ys: Vec<_> = y.values().collect();
                assert_eq!(xs, ys, "categorical column {name} differs");
            }
            _ => panic!("column {name} changed kind"),
        }
    }
}

// -------------------- Round trip --------------------

#[test]
fn encode_then_decode_round_trips() -> Result<()> {
    let table = sample_table();
    let mut buf = Vec::new();
    FlatWriter::encode(&table, &mut buf)?;

    let back = decode_bytes(&buf, &DecoderConfig::default())?;
    assert_same_table(&table, &back);
    Ok(())
}

#[test]
fn encoder_output_matches_hand_built_layout() -> Result<()> {
    let table = LogTable::from_columns([
        ("t", Column::Numeric(vec![0.0, 0.1, 0.2])),
        (
            "state",
            Column::Categorical(
                CategoricalColumn::from_values([Some("idle"), Some("run"), Some("idle")]).unwrap(),
            ),
        ),
    ])?;
    let mut buf = Vec::new();
    FlatWriter::encode(&table, &mut buf)?;

    let mut expected = FlatBytes::new(2);
    expected
        .numeric("t", &[0.0, 0.1, 0.2])
        .categorical("state", &["idle", "run", "idle"]);
    assert_eq!(buf, expected.bytes());
    Ok(())
}

#[test]
fn missing_samples_are_written_as_zero_length() -> Result<()> {
    let col = CategoricalColumn::from_values([Some("a"), None]).unwrap();
    let table = LogTable::from_columns([("c", Column::Categorical(col))])?;
    let mut buf = Vec::new();
    FlatWriter::encode(&table, &mut buf)?;

    let mut expected = FlatBytes::new(1);
    expected.categorical("c", &["a", ""]);
    assert_eq!(buf, expected.bytes());
    Ok(())
}

#[test]
fn write_file_round_trips_and_leaves_no_temp() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.flat");
    let table = sample_table();

    FlatWriter::write_file(&path, &table)?;
    assert!(path.exists());
    assert!(!dir.path().join("out.flat.tmp").exists());

    assert_same_table(&table, &decode(&path)?);
    Ok(())
}

#[test]
fn write_file_replaces_existing_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.flat");
    std::fs::write(&path, b"old contents")?;

    FlatWriter::write_file(&path, &sample_table())?;
    assert_eq!(decode(&path)?.len(), 3);
    Ok(())
}

// -------------------- Rejections --------------------

fn encode_err(table: &LogTable) -> FlatError {
    let mut buf = Vec::new();
    let err = FlatWriter::encode(table, &mut buf).expect_err("encode should fail");
    assert!(buf.is_empty(), "nothing may be written for a rejected table");
    err
}

#[test]
fn rejects_empty_and_non_ascii_names() {
    let t = LogTable::from_columns([("", Column::Numeric(vec![]))]).unwrap();
    assert!(matches!(encode_err(&t), FlatError::Unencodable { .. }));

    let t = LogTable::from_columns([("µ", Column::Numeric(vec![]))]).unwrap();
    assert!(matches!(encode_err(&t), FlatError::Unencodable { .. }));
}

#[test]
fn rejects_levels_that_would_not_read_back() {
    let empty_level = CategoricalColumn::new(vec![Some(0)], vec![String::new()]);
    let t = LogTable::from_columns([("c", Column::Categorical(empty_level))]).unwrap();
    assert!(matches!(encode_err(&t), FlatError::Unencodable { .. }));

    let twice = CategoricalColumn::new(vec![Some(0), Some(1)], vec!["a".into(), "a".into()]);
    let t = LogTable::from_columns([("c", Column::Categorical(twice))]).unwrap();
    assert!(matches!(encode_err(&t), FlatError::Unencodable { .. }));

    let dangling = CategoricalColumn::new(vec![Some(0), Some(5)], vec!["a".into()]);
    let t = LogTable::from_columns([("c", Column::Categorical(dangling))]).unwrap();
    match encode_err(&t) {
        FlatError::Unencodable { column, reason } => {
            assert_eq!(column, "c");
            assert!(reason.contains("code 5"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_write_file_removes_temp() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad.flat");
    let t = LogTable::from_columns([("", Column::Numeric(vec![]))])?;

    let err = FlatWriter::write_file(&path, &t).expect_err("must fail");
    assert!(matches!(err.root(), FlatError::Unencodable { .. }));
    assert!(!path.exists());
    assert!(!dir.path().join("bad.flat.tmp").exists());
    Ok(())
}

#[test]
fn failed_rename_removes_temp() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.flat");
    std::fs::create_dir(&path)?;
    std::fs::write(path.join("occupied"), b"x")?;

    let err = FlatWriter::write_file(&path, &sample_table()).expect_err("rename onto a directory");
    assert!(matches!(err.root(), FlatError::Io(_)));
    assert!(path.is_dir());
    assert!(!dir.path().join("out.flat.tmp").exists());
    Ok(())
}

#[test]
fn from_columns_rejects_duplicates() {
    let err = LogTable::from_columns([
        ("t", Column::Numeric(vec![])),
        ("t", Column::Numeric(vec![])),
    ])
    .expect_err("duplicate");
    assert!(matches!(err, FlatError::DuplicateColumn { index: 1, .. }));
}
