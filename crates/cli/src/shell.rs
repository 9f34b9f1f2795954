//! Command dispatch for the inspection shell.

use flatlog::{Column, LogTable};
use std::io::{self, Write};

/// Number of samples `SHOW` prints when no count is given.
const DEFAULT_SHOW_COUNT: usize = 10;

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Runs one command line against `table`, writing its output to `out`.
///
/// Command errors (unknown column, bad arguments) are reported on `out` as
/// `ERR ...` lines; only write failures come back as `Err`.
pub fn execute<W: Write>(table: &mut LogTable, line: &str, out: &mut W) -> io::Result<Flow> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(Flow::Continue);
    };

    match cmd.to_uppercase().as_str() {
        "COLUMNS" => columns(table, out)?,
        "INFO" => info(table, out)?,
        "SHOW" => match parts.next() {
            Some(name) => {
                let start = parts.next().map(str::parse::<usize>);
                let count = parts.next().map(str::parse::<usize>);
                match (start.unwrap_or(Ok(0)), count.unwrap_or(Ok(DEFAULT_SHOW_COUNT))) {
                    (Ok(start), Ok(count)) => show(table, name, start, count, out)?,
                    _ => writeln!(out, "ERR usage: SHOW name [start] [count]")?,
                }
            }
            None => writeln!(out, "ERR usage: SHOW name [start] [count]")?,
        },
        "LEVELS" => match parts.next() {
            Some(name) => levels(table, name, out)?,
            None => writeln!(out, "ERR usage: LEVELS name")?,
        },
        "DERIVE" => {
            let before = table.len();
            *table = std::mem::take(table).with_joint_derivations();
            writeln!(out, "OK (+{} columns)", table.len() - before)?;
        }
        "EXIT" | "QUIT" => {
            writeln!(out, "bye")?;
            return Ok(Flow::Exit);
        }
        other => writeln!(out, "unknown command: {}", other)?,
    }
    Ok(Flow::Continue)
}

fn columns<W: Write>(table: &LogTable, out: &mut W) -> io::Result<()> {
    for (name, column) in table.iter() {
        writeln!(out, "{}\t{}\t{}", name, column.kind(), column.len())?;
    }
    writeln!(out, "({} columns)", table.len())
}

fn info<W: Write>(table: &LogTable, out: &mut W) -> io::Result<()> {
    let numeric = table
        .iter()
        .filter(|(_, c)| matches!(c, Column::Numeric(_)))
        .count();
    writeln!(out, "samples: {}", table.sample_count().unwrap_or(0))?;
    writeln!(out, "numeric: {}", numeric)?;
    writeln!(out, "categorical: {}", table.len() - numeric)?;

    let sensors = table.force_sensors();
    if sensors.is_empty() {
        writeln!(out, "force sensors: (none)")
    } else {
        writeln!(out, "force sensors: {}", sensors.join(", "))
    }
}

fn show<W: Write>(
    table: &LogTable,
    name: &str,
    start: usize,
    count: usize,
    out: &mut W,
) -> io::Result<()> {
    let Some(column) = table.get(name) else {
        return writeln!(out, "ERR no such column: {}", name);
    };

    let end = start.saturating_add(count).min(column.len());
    for i in start..end {
        match column {
            Column::Numeric(values) => writeln!(out, "{}\t{}", i, values[i])?,
            Column::Categorical(cat) => match cat.value(i) {
                Some(s) => writeln!(out, "{}\t{}", i, s)?,
                None => writeln!(out, "{}\t(missing)", i)?,
            },
        }
    }
    writeln!(out, "({} of {})", end.saturating_sub(start), column.len())
}

fn levels<W: Write>(table: &LogTable, name: &str, out: &mut W) -> io::Result<()> {
    match table.get(name) {
        None => writeln!(out, "ERR no such column: {}", name),
        Some(Column::Numeric(_)) => writeln!(out, "ERR column {} is not categorical", name),
        Some(Column::Categorical(cat)) => {
            for (code, level) in cat.levels().iter().enumerate() {
                writeln!(out, "{}\t{}", code, level)?;
            }
            writeln!(out, "({} levels)", cat.levels().len())
        }
    }
}
