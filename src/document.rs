//! The merged per-hospital record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Postal address taken from the general-information source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "StreetAddress", skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(rename = "City", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "State", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "ZIP", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// Nested measure mappings a secondary source can contribute to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    StarRatings,
    ReadmissionsAndDeaths,
    Payment,
}

impl Category {
    /// Key under which the mapping is serialized and addressed by metric paths.
    pub fn key(&self) -> &'static str {
        match self {
            Category::StarRatings => "StarRatings",
            Category::ReadmissionsAndDeaths => "ReadmissionsAndDeaths",
            Category::Payment => "Payment",
        }
    }
}

/// One hospital, joined across every source that mentions its name.
///
/// `address` and `coordinates` are only ever set by the general-information
/// source; hospitals seen only in measure sources leave both `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    #[serde(rename = "Hospital")]
    pub identity: String,

    #[serde(rename = "Address", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    #[serde(flatten)]
    pub coordinates: Option<Coordinates>,

    #[serde(rename = "StarRatings", default)]
    pub star_ratings: BTreeMap<String, String>,

    #[serde(rename = "ReadmissionsAndDeaths", default)]
    pub readmissions_and_deaths: BTreeMap<String, String>,

    #[serde(rename = "Payment", default)]
    pub payment: BTreeMap<String, String>,
}

impl EntityDocument {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            ..Default::default()
        }
    }

    pub fn measures(&self, category: Category) -> &BTreeMap<String, String> {
        match category {
            Category::StarRatings => &self.star_ratings,
            Category::ReadmissionsAndDeaths => &self.readmissions_and_deaths,
            Category::Payment => &self.payment,
        }
    }

    pub fn measures_mut(&mut self, category: Category) -> &mut BTreeMap<String, String> {
        match category {
            Category::StarRatings => &mut self.star_ratings,
            Category::ReadmissionsAndDeaths => &mut self.readmissions_and_deaths,
            Category::Payment => &mut self.payment,
        }
    }
}
