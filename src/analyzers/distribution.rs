use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::analyzers::resolve::{Lookup, lookup};
use crate::analyzers::types::{CriteriaNode, CriteriaTree, Distribution, Leaf};
use crate::analyzers::utility::{mean, sample_stddev};
use crate::error::{RaterError, Result};

/// How many documents fed each outcome, summed over all leaves.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AnnotateSummary {
    pub leaves: usize,
    pub present: usize,
    pub missing: usize,
    pub malformed: usize,
}

/// Attaches a [`Distribution`] to every leaf of `tree`.
///
/// # Errors
///
/// [`RaterError::InsufficientData`] naming the first leaf whose metric path
/// resolves to a number in fewer than two documents.
#[tracing::instrument(skip_all, fields(population = population.len()))]
pub fn annotate(tree: &mut CriteriaTree, population: &[Value]) -> Result<AnnotateSummary> {
    let mut summary = AnnotateSummary::default();
    annotate_nodes(&mut tree.roots, population, &mut summary)?;
    Ok(summary)
}

fn annotate_nodes(
    nodes: &mut [CriteriaNode],
    population: &[Value],
    summary: &mut AnnotateSummary,
) -> Result<()> {
    for node in nodes {
        match node {
            CriteriaNode::Composite(composite) => {
                annotate_nodes(&mut composite.components, population, summary)?
            }
            CriteriaNode::Leaf(leaf) => annotate_leaf(leaf, population, summary)?,
        }
    }
    Ok(())
}

fn annotate_leaf(leaf: &mut Leaf, population: &[Value], summary: &mut AnnotateSummary) -> Result<()> {
    let mut series = Vec::with_capacity(population.len());
    let (mut missing, mut malformed) = (0, 0);

    for document in population {
        match lookup(document, &leaf.metric) {
            Lookup::Present(v) => series.push(v),
            Lookup::Missing => missing += 1,
            Lookup::Malformed => malformed += 1,
        }
    }

    let distribution = distribution_of(&leaf.metric, &series)?;
    debug!(
        leaf = %leaf.name,
        metric = ?leaf.metric,
        present = series.len(),
        missing,
        malformed,
        mean = distribution.mean,
        std_dev = distribution.std_dev,
        "Leaf annotated"
    );

    leaf.distribution = Some(distribution);
    summary.leaves += 1;
    summary.present += series.len();
    summary.missing += missing;
    summary.malformed += malformed;
    Ok(())
}

/// Mean and sample standard deviation of the present values for `metric`.
///
/// Values near `f64::MAX` can overflow the sums; such a distribution is an
/// error rather than a `null` in the persisted criteria.
pub fn distribution_of(metric: &[String], values: &[f64]) -> Result<Distribution> {
    let avg = mean(values);
    let std_dev =
        sample_stddev(values, avg).ok_or_else(|| RaterError::insufficient_data(metric, values.len()))?;

    if !(avg.is_finite() && std_dev.is_finite()) {
        return Err(RaterError::non_finite_distribution(metric, avg, std_dev));
    }
    Ok(Distribution { mean: avg, std_dev })
}
