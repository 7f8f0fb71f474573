use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::analyzers::distribution::{AnnotateSummary, annotate};
use crate::analyzers::types::CriteriaTree;
use crate::config::SourcePaths;
use crate::document::EntityDocument;
use crate::error::{RaterError, Result};
use crate::merge::merge_sources;
use crate::output::{print_pretty, stage_json, write_json};

/// Loads a persisted hospital collection (a JSON array of documents).
pub fn load_population(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RaterError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => RaterError::io(path, e),
    })?;
    serde_json::from_str(&content).map_err(|e| RaterError::json(path, e))
}

/// Converts merged documents into the form the criteria resolver walks.
pub fn population_of(documents: &[EntityDocument]) -> Result<Vec<Value>> {
    documents
        .iter()
        .map(|d| serde_json::to_value(d).map_err(|e| RaterError::json("<merged collection>", e)))
        .collect()
}

/// Annotates `criteria` over the collection at `data_path` and writes the
/// enriched tree to `output`. Nothing is written if any leaf fails.
#[tracing::instrument(skip_all, fields(data = %data_path.display(), output = %output.display()))]
pub fn analyze(data_path: &Path, mut criteria: CriteriaTree, output: &Path) -> Result<AnnotateSummary> {
    let population = load_population(data_path)?;
    info!(hospitals = population.len(), "Hospital data loaded");

    let summary = annotate(&mut criteria, &population)?;
    write_json(output, &criteria)?;

    info!(
        leaves = summary.leaves,
        present = summary.present,
        missing = summary.missing,
        malformed = summary.malformed,
        "Criteria annotated"
    );
    Ok(summary)
}

/// Merges the sources to `data_out`.
#[tracing::instrument(skip_all, fields(output = %data_out.display()))]
pub fn merge_to(paths: &SourcePaths, data_out: &Path) -> Result<usize> {
    let (documents, stats) = merge_sources(paths)?;
    stats.iter().for_each(print_pretty);

    write_json(data_out, &documents)?;
    info!(hospitals = documents.len(), "Hospital data merged");
    Ok(documents.len())
}

/// Merges the sources and annotates `criteria` in one pass.
///
/// Both files are staged before either is committed, so a failure while
/// serializing or creating either one leaves both targets untouched. The
/// hospital data is committed first, then the criteria.
#[tracing::instrument(skip_all, fields(data = %data_out.display(), criteria = %criteria_out.display()))]
pub fn analyze_sources(
    paths: &SourcePaths,
    mut criteria: CriteriaTree,
    data_out: &Path,
    criteria_out: &Path,
) -> Result<AnnotateSummary> {
    let (documents, stats) = merge_sources(paths)?;
    stats.iter().for_each(print_pretty);

    let population = population_of(&documents)?;
    let summary = annotate(&mut criteria, &population)?;

    let staged_data = stage_json(data_out, &documents)?;
    let staged_criteria = stage_json(criteria_out, &criteria)?;
    staged_data.commit()?;
    staged_criteria.commit()?;

    info!(
        hospitals = documents.len(),
        leaves = summary.leaves,
        "Hospital data merged and criteria annotated"
    );
    Ok(summary)
}
