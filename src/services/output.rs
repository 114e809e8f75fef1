use crate::models::WardMap;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur reading or writing result files
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column {column} has {found} rows, expected {expected}")]
    RaggedColumns {
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("Nothing to write")]
    EmptyInput,
}

/// File name used for a zip code's ward mapping
pub fn ward_file_name(zip: &str) -> String {
    format!("wardbyzip{}.json", zip)
}

/// Read a JSON file into any deserializable type
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, OutputError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write a value as JSON.
///
/// The bytes land in a temporary file in the destination directory which is
/// then renamed over `path`, so readers never see a half-written file.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<(), OutputError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut tmp, value)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| OutputError::Io(e.error))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Persist a zip code's ward mapping into `dir` as `wardbyzip<zip>.json`
pub fn persist_ward_map(dir: impl AsRef<Path>, zip: &str, wards: &WardMap) -> Result<PathBuf, OutputError> {
    let path = dir.as_ref().join(ward_file_name(zip));
    write_json(&path, wards)?;
    tracing::info!(zip = %zip, people = wards.len(), path = %path.display(), "Saved ward mapping");
    Ok(path)
}

/// Read a CSV with a header row into columns, in header order.
///
/// The header itself is dropped. Rows whose field count differs from the
/// header are skipped.
pub fn read_csv_columns(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>, OutputError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let width = reader.headers()?.len();
    let mut columns = vec![Vec::new(); width];

    for row in reader.records() {
        let row = row?;
        if row.len() != width {
            tracing::warn!(
                line = row.position().map(|p| p.line()),
                fields = row.len(),
                expected = width,
                "Skipping malformed CSV row"
            );
            continue;
        }
        for (column, field) in columns.iter_mut().zip(row.iter()) {
            column.push(field.to_string());
        }
    }

    Ok(columns)
}

/// Append columns to a CSV file as rows: row `i` holds element `i` of each column.
///
/// The row count is taken from the first column; every other column must be
/// at least that long.
pub fn append_columns_csv<T: ToString>(columns: &[Vec<T>], path: impl AsRef<Path>) -> Result<(), OutputError> {
    let rows = columns.first().ok_or(OutputError::EmptyInput)?.len();
    if let Some((column, short)) = columns.iter().enumerate().find(|(_, c)| c.len() < rows) {
        return Err(OutputError::RaggedColumns {
            column,
            expected: rows,
            found: short.len(),
        });
    }

    let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    for i in 0..rows {
        writer.write_record(columns.iter().map(|c| c[i].to_string()))?;
    }
    writer.flush()?;

    Ok(())
}
