//! Output formatting and persistence.
//!
//! Files are written through a temporary sibling and renamed into place, so
//! a failed run never leaves a truncated document behind.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{RaterError, Result};
use crate::stats::IngestStats;

/// Logs ingestion statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &IngestStats) {
    debug!("{:#?}", stats);
}

/// A serialized document waiting in a temporary sibling of its target.
///
/// Dropping it without [`StagedJson::commit`] removes the temporary file.
#[derive(Debug)]
pub struct StagedJson {
    path: PathBuf,
    file: NamedTempFile,
}

impl StagedJson {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renames the staged file over its target.
    pub fn commit(self) -> Result<()> {
        let StagedJson { path, file } = self;
        file.persist(&path).map_err(|e| RaterError::io(&path, e.error))?;

        info!(path = %path.display(), "Output written");
        Ok(())
    }
}

/// Serializes `value` into a temporary file next to `path`, leaving `path`
/// itself untouched.
pub fn stage_json(path: &Path, value: &impl Serialize) -> Result<StagedJson> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| RaterError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(&mut file);
        serde_json::to_writer(&mut writer, value).map_err(|e| RaterError::json(path, e))?;
        writer.flush().map_err(|e| RaterError::io(path, e))?;
    }

    debug!(path = %path.display(), "Output staged");
    Ok(StagedJson {
        path: path.to_path_buf(),
        file,
    })
}

/// Serializes `value` as JSON and atomically replaces `path` with it.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    stage_json(path, value)?.commit()
}
