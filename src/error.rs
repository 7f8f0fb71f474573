//! Error types shared by the merge and criteria stages.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaterError {
    #[error("Source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed header in {path}: {reason}")]
    MalformedHeader { path: PathBuf, reason: String },

    #[error("Source {path} has no column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Malformed row in {path} at line {line}: expected {expected} cells, found {found}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: u64,
        found: u64,
    },

    #[error("Invalid criterion '{name}': {reason}")]
    InvalidCriteria { name: String, reason: String },

    #[error("Insufficient data for metric {metric}: {found} present value(s), at least 2 required")]
    InsufficientData { metric: String, found: usize },

    #[error("Distribution for metric {metric} is not finite (mean {mean}, stdDev {std_dev})")]
    NonFiniteDistribution {
        metric: String,
        mean: f64,
        std_dev: f64,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RaterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub fn insufficient_data(metric: &[String], found: usize) -> Self {
        Self::InsufficientData {
            metric: metric_label(metric),
            found,
        }
    }

    pub fn non_finite_distribution(metric: &[String], mean: f64, std_dev: f64) -> Self {
        Self::NonFiniteDistribution {
            metric: metric_label(metric),
            mean,
            std_dev,
        }
    }
}

/// Formats a metric path the way it appears in criteria files.
fn metric_label(metric: &[String]) -> String {
    format!("[{}]", metric.join(", "))
}

pub type Result<T> = std::result::Result<T, RaterError>;
