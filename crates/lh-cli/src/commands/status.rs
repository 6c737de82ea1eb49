//! Status command for showing what is stored.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use lh_db::Store;

pub fn run<W: Write>(writer: &mut W, store: &Store, database_path: &Path) -> Result<()> {
    let stats = store.stats().context("failed to read store stats")?;

    writeln!(writer, "Listening history status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if stats.entry_count == 0 {
        writeln!(writer, "No history imported.")?;
        return Ok(());
    }

    writeln!(writer, "Entries: {}", stats.entry_count)?;
    if let Some(metadata) = stats.metadata {
        writeln!(
            writer,
            "Uploaded: {}",
            metadata
                .uploaded_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;

    use crate::commands::fixtures;

    #[test]
    fn status_command_outputs_entry_count() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("history.db");
        let mut store = Store::open(&db_path).unwrap();
        let uploaded_at = Utc.with_ymd_and_hms(2025, 1, 29, 16, 0, 0).unwrap();
        store
            .save_entries_at(&fixtures::entries(), uploaded_at)
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &store, &db_path).unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&db_path.display().to_string(), "[TEMP]/history.db");
        assert_snapshot!(output, @r"
Listening history status
Database: [TEMP]/history.db
Entries: 4
Uploaded: 2025-01-29T16:00:00Z
");
    }

    #[test]
    fn status_command_on_empty_store() {
        let store = Store::open_in_memory().unwrap();
        let output = fixtures::render(|w| run(w, &store, Path::new("/tmp/history.db")));
        assert_snapshot!(output, @r"
Listening history status
Database: /tmp/history.db
No history imported.
");
    }
}
