//! # flatlog - flat log inspection shell
//!
//! Decodes one flat log, then reads commands from stdin and prints results
//! to stdout. Works interactively or with commands piped in.
//!
//! ## Commands
//!
//! ```text
//! COLUMNS                      List columns (name, kind, length)
//! INFO                         Sample count, column kinds, force sensors
//! SHOW name [start] [count]    Print samples (categorical as strings)
//! LEVELS name                  Print a categorical column's codes
//! DERIVE                       Add per-joint error/limit columns
//! EXIT / QUIT                  Leave
//! ```
//!
//! ## Configuration
//!
//! ```text
//! FLATLOG_PATH               log to open when no argument is given
//! FLATLOG_CHECK_LENGTHS      verify equal column lengths  (default: "true")
//! FLATLOG_UNNAMED            "reject" | "placeholder"     (default: "reject")
//! FLATLOG_MAX_KEY_BYTES      max column name size         (default: 65536)
//! FLATLOG_MAX_STRING_BYTES   max categorical sample size  (default: 1048576)
//! RUST_LOG                   tracing filter               (default: "warn")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ flatlog controller.flat
//! loaded controller.flat (212 columns, 30000 samples)
//! > SHOW state 0 2
//! 0	idle
//! 1	idle
//! (2 of 30000)
//! > EXIT
//! bye
//! ```

mod shell;

use anyhow::{Context, Result};
use config::DecoderConfig;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

use crate::shell::{execute, Flow};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FLATLOG_PATH").ok())
        .context("usage: flatlog <log.flat> (or set FLATLOG_PATH)")?;
    let config = DecoderConfig::from_env();

    let mut table = match flatlog::decode_with(&path, &config) {
        Ok(table) => table,
        Err(e) => {
            let e = anyhow::Error::new(e).context("decode failed");
            println!("ERR {:#}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(path = %path, columns = table.len(), "log loaded");
    println!(
        "loaded {} ({} columns, {} samples)",
        path,
        table.len(),
        table.sample_count().unwrap_or(0)
    );
    println!("Commands: COLUMNS | INFO | SHOW name [start] [count] | LEVELS name");
    println!("          DERIVE | EXIT");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "> ")?;
    out.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if execute(&mut table, &line, &mut out)? == Flow::Exit {
            break;
        }
        write!(out, "> ")?;
        out.flush()?;
    }

    Ok(())
}
