//! Import command: replaces the stored history with export files.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lh_core::{load_history_files, validate_files};
use lh_db::Store;

pub fn run<W: Write>(writer: &mut W, store: &mut Store, paths: &[PathBuf]) -> Result<()> {
    let files = load_history_files(paths)?;
    let report = validate_files(&files)?;

    for file in &report.files {
        writeln!(
            writer,
            "{}: {} valid, {} invalid",
            file.name, file.valid, file.invalid
        )?;
    }

    let saved = store
        .save_entries(&report.entries)
        .context("failed to save entries")?;
    tracing::info!(saved, invalid = report.invalid_count, "imported history");

    writeln!(
        writer,
        "Imported {saved} entries ({} invalid)",
        report.invalid_count
    )?;
    Ok(())
}
