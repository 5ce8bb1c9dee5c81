//! CSV loading with type inference.

use crate::data::Dataset;
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Which column, if any, becomes the row identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexColumn {
    #[default]
    None,
    /// The first column, whatever its header says
    First,
    Named(String),
}

/// Load a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>, index: &IndexColumn) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|source| LoadError::Io {
        source_name: source_name.clone(),
        source,
    })?;

    let data = parse_csv(file, index, &source_name)?;
    log::debug!(
        "Loaded {} rows x {} columns from {}",
        data.len(),
        data.headers.len(),
        source_name
    );
    Ok(data)
}

/// Parse CSV text from any reader. `source_name` is only used in error messages.
pub fn parse_csv<R: Read>(
    input: R,
    index: &IndexColumn,
    source_name: &str,
) -> Result<Dataset, LoadError> {
    let malformed = |message: String| LoadError::Malformed {
        source_name: source_name.to_string(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| classify_csv_error(e, source_name))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    validate_headers(&headers).map_err(malformed)?;

    let mut raw_rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| classify_csv_error(e, source_name))?;
        raw_rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<String>>());
    }

    let index_pos = match index {
        IndexColumn::None => None,
        IndexColumn::First => Some(0),
        IndexColumn::Named(name) => Some(
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| malformed(format!("index column '{}' not found", name)))?,
        ),
    };

    let Some(pos) = index_pos else {
        return Ok(Dataset::from_raw(headers, raw_rows));
    };

    let mut headers = headers;
    let index_name = headers.remove(pos);
    let mut labels = Vec::with_capacity(raw_rows.len());
    for row in raw_rows.iter_mut() {
        labels.push(row.remove(pos).trim().to_string());
    }

    Ok(Dataset::from_raw(headers, raw_rows).with_index(index_name, labels))
}

/// A header row must exist, name every column (the first may be blank, as
/// written for an unnamed row index) and not look like a data row.
fn validate_headers(headers: &[String]) -> Result<(), String> {
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err("missing header row".to_string());
    }

    if headers.iter().all(|h| h.is_empty() || h.parse::<f64>().is_ok()) {
        return Err(format!(
            "missing header row (first row looks like data: {})",
            headers.join(",")
        ));
    }

    if let Some(pos) = headers.iter().skip(1).position(|h| h.is_empty()) {
        return Err(format!("column {} has an empty header", pos + 2));
    }

    let mut seen = HashSet::new();
    for h in headers {
        if !seen.insert(h.as_str()) {
            return Err(format!("duplicate column '{}'", h));
        }
    }

    Ok(())
}

fn classify_csv_error(err: csv::Error, source_name: &str) -> LoadError {
    let source_name = source_name.to_string();
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            let line = pos.as_ref().map(|p| p.line()).unwrap_or(0);
            format!(
                "line {} has {} fields, expected {}",
                line, len, expected_len
            )
        }
        csv::ErrorKind::Utf8 { pos, .. } => {
            let line = pos.as_ref().map(|p| p.line()).unwrap_or(0);
            format!("line {} is not valid UTF-8", line)
        }
        _ => err.to_string(),
    };

    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::Io {
            source_name,
            source,
        },
        _ => LoadError::Malformed {
            source_name,
            message,
        },
    }
}
