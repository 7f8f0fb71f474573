//! Delimited-text reader for hospital data sources.

use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{RaterError, Result};

/// A fully materialized tabular source.
///
/// `rows[0]` is the header row; `header_index` maps each cleaned header name
/// to its zero-based column.
#[derive(Debug, Clone)]
pub struct TabularSource {
    pub path: PathBuf,
    pub rows: Vec<Vec<String>>,
    pub header_index: HashMap<String, usize>,
}

impl TabularSource {
    /// Data rows, i.e. everything after the header.
    pub fn records(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().skip(1).map(Vec::as_slice)
    }

    pub fn column(&self, name: &str) -> Result<usize> {
        self.header_index
            .get(name)
            .copied()
            .ok_or_else(|| RaterError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }
}

/// Reads a comma-separated, double-quote quoted file into a [`TabularSource`].
///
/// # Errors
///
/// [`RaterError::SourceNotFound`] when the file does not exist,
/// [`RaterError::MalformedRow`] when a row's cell count differs from the
/// header's, and [`RaterError::MalformedHeader`] for an empty source.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_source(path: &Path) -> Result<TabularSource> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RaterError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => RaterError::io(path, e),
    })?;

    let source = parse_source(path, file)?;
    debug!(
        rows = source.rows.len(),
        columns = source.header_index.len(),
        "Source loaded"
    );
    Ok(source)
}

/// Parses delimited text from any reader; `path` is used for error reporting.
pub fn parse_source<R: Read>(path: &Path, reader: R) -> Result<TabularSource> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| row_error(path, e))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let header = rows.first().ok_or_else(|| RaterError::MalformedHeader {
        path: path.to_path_buf(),
        reason: "source is empty".to_string(),
    })?;

    let mut header_index = HashMap::with_capacity(header.len());
    for (i, heading) in header.iter().enumerate() {
        let cleaned = clean_heading(heading);
        if cleaned.is_empty() {
            continue;
        }
        if header_index.insert(cleaned.clone(), i).is_some() {
            return Err(RaterError::MalformedHeader {
                path: path.to_path_buf(),
                reason: format!("duplicate column '{cleaned}'"),
            });
        }
    }

    Ok(TabularSource {
        path: path.to_path_buf(),
        rows,
        header_index,
    })
}

fn clean_heading(heading: &str) -> String {
    heading
        .trim_start_matches('\u{feff}')
        .replace('"', "")
        .trim()
        .to_string()
}

fn row_error(path: &Path, err: csv::Error) -> RaterError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return RaterError::MalformedRow {
            path: path.to_path_buf(),
            line: pos.as_ref().map(|p| p.line()).unwrap_or_default(),
            expected: *expected_len,
            found: *len,
        };
    }

    RaterError::Csv {
        path: path.to_path_buf(),
        source: err,
    }
}
