//! Reading streaming-history export files.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;

use crate::entry::StreamingEntry;
use crate::validation::validate_batch;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {name}: invalid JSON")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{name} does not contain an array")]
    NotAnArray { name: String },

    #[error("no valid entries found")]
    NoValidEntries,
}

/// One decoded export file.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFile {
    pub name: String,
    pub records: Vec<Value>,
}

/// Per-file validation counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub valid: usize,
    pub invalid: usize,
}

/// Validated entries of every file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub entries: Vec<StreamingEntry>,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub files: Vec<FileReport>,
}

/// Decodes one file's text. The top level must be a JSON array.
pub fn parse_history_file(name: &str, text: &str) -> Result<Vec<Value>, IngestError> {
    let value: Value = serde_json::from_str(text).map_err(|source| IngestError::InvalidJson {
        name: name.to_string(),
        source,
    })?;
    match value {
        Value::Array(records) => Ok(records),
        _ => Err(IngestError::NotAnArray {
            name: name.to_string(),
        }),
    }
}

fn load_history_file(path: &Path) -> Result<HistoryFile, IngestError> {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_history_file(&name, &text)?;
    tracing::debug!(file = %name, records = records.len(), "decoded history file");
    Ok(HistoryFile { name, records })
}

/// Reads and decodes files in parallel. Output order matches `paths`.
///
/// The first unreadable or malformed file fails the whole load.
pub fn load_history_files<P>(paths: &[P]) -> Result<Vec<HistoryFile>, IngestError>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| load_history_file(path.as_ref()))
        .collect()
}

/// Validates every decoded file and concatenates the valid entries.
pub fn validate_files(files: &[HistoryFile]) -> Result<IngestReport, IngestError> {
    let mut entries = Vec::new();
    let mut reports = Vec::with_capacity(files.len());
    let mut invalid_count = 0;

    for file in files {
        let result = validate_batch(&file.records);
        if result.invalid_count > 0 {
            tracing::warn!(file = %file.name, invalid = result.invalid_count, "dropped invalid records");
        }
        reports.push(FileReport {
            name: file.name.clone(),
            valid: result.valid.len(),
            invalid: result.invalid_count,
        });
        invalid_count += result.invalid_count;
        entries.extend(result.valid);
    }

    if entries.is_empty() {
        return Err(IngestError::NoValidEntries);
    }

    Ok(IngestReport {
        valid_count: entries.len(),
        invalid_count,
        entries,
        files: reports,
    })
}
