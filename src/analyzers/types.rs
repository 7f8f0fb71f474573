//! The weighted criteria tree and its normalization parameters.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RaterError, Result};

static DEFAULT_CRITERIA: &str = include_str!("../../criteria/default_criteria.json");

/// Population mean and sample standard deviation of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub mean: f64,
    pub std_dev: f64,
}

/// A named group of sub-criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composite {
    pub name: String,
    pub weight: f64,
    pub components: Vec<CriteriaNode>,
}

/// A metric read from each hospital document.
///
/// `invert` is true when lower raw values are better (mortality, cost).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaf {
    pub name: String,
    pub weight: f64,
    pub metric: Vec<String>,
    pub invert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CriteriaNode {
    Composite(Composite),
    Leaf(Leaf),
}

impl CriteriaNode {
    pub fn composite(
        name: impl Into<String>,
        weight: f64,
        components: Vec<CriteriaNode>,
    ) -> Result<Self> {
        let name = name.into();
        check_weight(&name, weight)?;
        if components.is_empty() {
            return Err(invalid(&name, "composite has no components"));
        }
        Ok(CriteriaNode::Composite(Composite {
            name,
            weight,
            components,
        }))
    }

    pub fn leaf(
        name: impl Into<String>,
        weight: f64,
        metric: Vec<String>,
        invert: bool,
    ) -> Result<Self> {
        let name = name.into();
        check_weight(&name, weight)?;
        if metric.is_empty() {
            return Err(invalid(&name, "metric path is empty"));
        }
        Ok(CriteriaNode::Leaf(Leaf {
            name,
            weight,
            metric,
            invert,
            distribution: None,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            CriteriaNode::Composite(c) => &c.name,
            CriteriaNode::Leaf(l) => &l.name,
        }
    }
}

fn check_weight(name: &str, weight: f64) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, &format!("weight {weight} is not a non-negative number")))
    }
}

fn invalid(name: &str, reason: &str) -> RaterError {
    RaterError::InvalidCriteria {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// On-disk shape of a criterion before the composite/leaf split.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCriterion {
    name: String,
    weight: f64,
    components: Option<Vec<CriteriaNode>>,
    metric: Option<Vec<String>>,
    invert: Option<bool>,
    distribution: Option<Distribution>,
}

impl TryFrom<RawCriterion> for CriteriaNode {
    type Error = RaterError;

    fn try_from(raw: RawCriterion) -> Result<Self> {
        match (raw.components, raw.metric) {
            (Some(components), None) => {
                if raw.invert.is_some() || raw.distribution.is_some() {
                    return Err(invalid(&raw.name, "composite carries leaf fields"));
                }
                CriteriaNode::composite(raw.name, raw.weight, components)
            }
            (None, Some(metric)) => {
                let invert = raw
                    .invert
                    .ok_or_else(|| invalid(&raw.name, "leaf has no 'invert' flag"))?;
                let mut node = CriteriaNode::leaf(raw.name, raw.weight, metric, invert)?;
                if let CriteriaNode::Leaf(leaf) = &mut node {
                    leaf.distribution = raw.distribution;
                }
                Ok(node)
            }
            (Some(_), Some(_)) => Err(invalid(&raw.name, "has both 'components' and 'metric'")),
            (None, None) => Err(invalid(&raw.name, "has neither 'components' nor 'metric'")),
        }
    }
}

impl<'de> Deserialize<'de> for CriteriaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawCriterion::deserialize(deserializer)?;
        CriteriaNode::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// The full criteria hierarchy: a sequence of top-level composites.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CriteriaTree {
    pub roots: Vec<CriteriaNode>,
}

impl CriteriaTree {
    pub fn new(roots: Vec<CriteriaNode>) -> Result<Self> {
        if let Some(leaf) = roots
            .iter()
            .find(|n| matches!(n, CriteriaNode::Leaf(_)))
        {
            return Err(invalid(leaf.name(), "top-level criteria must be composites"));
        }
        Ok(Self { roots })
    }

    /// The hierarchy shipped with the crate.
    pub fn builtin() -> Result<Self> {
        serde_json::from_str(DEFAULT_CRITERIA).map_err(|e| RaterError::json("<builtin criteria>", e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RaterError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| RaterError::json(path, e))
    }

    /// Every leaf, depth-first.
    pub fn leaves(&self) -> Vec<&Leaf> {
        fn walk<'a>(nodes: &'a [CriteriaNode], out: &mut Vec<&'a Leaf>) {
            for node in nodes {
                match node {
                    CriteriaNode::Composite(c) => walk(&c.components, out),
                    CriteriaNode::Leaf(l) => out.push(l),
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }
}

impl<'de> Deserialize<'de> for CriteriaTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let roots = Vec::<CriteriaNode>::deserialize(deserializer)?;
        CriteriaTree::new(roots).map_err(serde::de::Error::custom)
    }
}
