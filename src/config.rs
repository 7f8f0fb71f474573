//! File locations for a run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RaterError, Result};
use crate::sources::SourceKind;

pub const DEFAULT_HOSPITAL_DATA: &str = "hospitalData.json";
pub const DEFAULT_RATING_CRITERIA: &str = "ratingCriteria.json";
pub const DEFAULT_LOG_FILE: &str = "logs/hospital_rater.log";

/// Where each source lives on disk.
///
/// Can be stored as a JSON manifest:
/// ```json
/// {
///   "general_information": "csv_data/Hospital General Information.csv",
///   "patient_survey": "csv_data/HCAHPS - Hospital.csv",
///   "readmissions_and_deaths": "csv_data/Readmissions and Deaths - Hospital.csv",
///   "payment": "csv_data/Payment and Value of Care - Hospital.csv"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePaths {
    pub general_information: PathBuf,
    pub patient_survey: PathBuf,
    pub readmissions_and_deaths: PathBuf,
    #[serde(default)]
    pub payment: Option<PathBuf>,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            general_information: PathBuf::from("csv_data/Hospital General Information.csv"),
            patient_survey: PathBuf::from("csv_data/HCAHPS - Hospital.csv"),
            readmissions_and_deaths: PathBuf::from(
                "csv_data/Readmissions and Deaths - Hospital.csv",
            ),
            payment: None,
        }
    }
}

impl SourcePaths {
    /// Loads a manifest from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RaterError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| RaterError::json(path, e))
    }

    /// Sources in merge order, primary first.
    pub fn entries(&self) -> Vec<(SourceKind, &Path)> {
        let mut entries = vec![
            (SourceKind::GeneralInformation, self.general_information.as_path()),
            (SourceKind::PatientSurvey, self.patient_survey.as_path()),
            (
                SourceKind::ReadmissionsAndDeaths,
                self.readmissions_and_deaths.as_path(),
            ),
        ];
        if let Some(payment) = &self.payment {
            entries.push((SourceKind::Payment, payment.as_path()));
        }
        entries
    }
}

/// Log file location, from `LOG_FILE_PATH` or [`DEFAULT_LOG_FILE`].
pub fn log_file_path() -> PathBuf {
    std::env::var("LOG_FILE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE))
}
