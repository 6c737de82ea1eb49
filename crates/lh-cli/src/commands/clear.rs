//! Clear command.

use std::io::Write;

use anyhow::{Context, Result};
use lh_db::Store;

pub fn run<W: Write>(writer: &mut W, store: &mut Store) -> Result<()> {
    store.clear().context("failed to clear stored history")?;
    tracing::info!("cleared stored history");
    writeln!(writer, "Cleared listening history.")?;
    Ok(())
}
