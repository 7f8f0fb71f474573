//! Latitude/longitude extraction from free-form location text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::coerce::coerce;

static LAT_LON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\d+(?:\.\d+)?,\s*-?\d+\.\d+").expect("coordinate pattern is valid")
});

/// A latitude/longitude pair. Both halves always come from the same parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "Lat")]
    pub lat: f64,
    #[serde(rename = "Long")]
    pub lon: f64,
}

/// Finds the first `lat, lon` pair embedded in `text`.
///
/// Returns `None` when no pair matches or either half fails to coerce; a
/// lone latitude is never returned.
pub fn extract_coordinates(text: &str) -> Option<Coordinates> {
    let found = LAT_LON.find(text)?;
    let (lat, lon) = found.as_str().split_once(',')?;

    Some(Coordinates {
        lat: coerce(lat)?,
        lon: coerce(lon)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_pair() {
        let text = "1 Main St\nSpringfield, IL 62704\n(39.78, -89.65)";
        assert_eq!(
            extract_coordinates(text),
            Some(Coordinates {
                lat: 39.78,
                lon: -89.65
            })
        );
    }

    #[test]
    fn test_pair_without_space() {
        let c = extract_coordinates("POINT (-33.5,151.25)").unwrap();
        assert_eq!(c.lat, -33.5);
        assert_eq!(c.lon, 151.25);
    }

    #[test]
    fn test_first_pair_wins() {
        let c = extract_coordinates("(1.5, 2.5) then (3.5, 4.5)").unwrap();
        assert_eq!(c.lat, 1.5);
        assert_eq!(c.lon, 2.5);
    }

    #[test]
    fn test_no_pair() {
        assert_eq!(extract_coordinates("Springfield, IL"), None);
        assert_eq!(extract_coordinates(""), None);
    }

    #[test]
    fn test_longitude_needs_decimals() {
        assert_eq!(extract_coordinates("Suite 12, 40 Main"), None);
    }

    #[test]
    fn test_never_partial() {
        for text in ["(39.78, -89.65)", "39, -89.5", "nothing here", "12, 34"] {
            if let Some(c) = extract_coordinates(text) {
                assert!(c.lat.is_finite() && c.lon.is_finite());
            }
        }
    }
}
