use serde::Serialize;

use crate::sources::SourceKind;

/// Row accounting for one ingested source.
#[derive(Debug, Clone, Serialize)]
pub struct IngestStats {
    pub kind: SourceKind,
    pub source: String,

    pub rows: usize,
    pub merged: usize,
    /// Rows dropped by the source's measure allow-list.
    pub filtered: usize,
    /// Rows with an empty or blank hospital name.
    pub skipped: usize,
    /// Hospitals first seen in this source.
    pub documents_created: usize,

    // primary source only
    pub with_coordinates: usize,
}

impl IngestStats {
    pub fn new(kind: SourceKind, source: impl Into<String>) -> Self {
        IngestStats {
            kind,
            source: source.into(),
            rows: 0,
            merged: 0,
            filtered: 0,
            skipped: 0,
            documents_created: 0,
            with_coordinates: 0,
        }
    }
}
