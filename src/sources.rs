//! Source kinds, their required columns, and per-source row filters.

use serde::Serialize;

use crate::document::Category;

pub const HOSPITAL_NAME: &str = "Hospital Name";

pub const ADDRESS: &str = "Address";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const ZIP_CODE: &str = "ZIP Code";
pub const LOCATION: &str = "Location";

pub const HCAHPS_MEASURE_ID: &str = "HCAHPS Measure ID";
pub const STAR_RATING: &str = "Patient Survey Star Rating";

pub const MEASURE_ID: &str = "Measure ID";
pub const SCORE: &str = "Score";

pub const PAYMENT_MEASURE_ID: &str = "Payment Measure ID";
pub const PAYMENT: &str = "Payment";

/// Survey measures kept from the patient-survey source.
pub static STAR_RATING_MEASURES: &[&str] = &[
    "H_STAR_RATING",
    "H_HSP_RATING_STAR_RATING",
    "H_CLEAN_STAR_RATING",
    "H_COMP_1_STAR_RATING",
    "H_COMP_2_STAR_RATING",
    "H_COMP_3_STAR_RATING",
    "H_COMP_4_STAR_RATING",
    "H_COMP_5_STAR_RATING",
    "H_COMP_6_STAR_RATING",
    "H_COMP_7_STAR_RATING",
    "H_QUIET_STAR_RATING",
    "H_RECMND_STAR_RATING",
];

/// Payment measures kept from the payment source.
pub static PAYMENT_MEASURES: &[&str] = &["PAYM_30_AMI", "PAYM_30_HF", "PAYM_30_PN"];

/// The kind of dataset a source file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Identity, address and location. The only source that sets those fields.
    GeneralInformation,
    PatientSurvey,
    ReadmissionsAndDeaths,
    Payment,
}

/// How a measure source maps a row onto a nested category.
#[derive(Debug, Clone, Copy)]
pub struct MeasureLayout {
    pub category: Category,
    pub key_column: &'static str,
    pub value_column: &'static str,
    /// Measure identifiers to keep; `None` keeps every row.
    pub allow: Option<&'static [&'static str]>,
}

impl MeasureLayout {
    pub fn accepts(&self, measure_id: &str) -> bool {
        self.allow.is_none_or(|ids| ids.contains(&measure_id))
    }
}

impl SourceKind {
    pub fn name(&self) -> &str {
        match self {
            SourceKind::GeneralInformation => "general information",
            SourceKind::PatientSurvey => "patient survey",
            SourceKind::ReadmissionsAndDeaths => "readmissions and deaths",
            SourceKind::Payment => "payment",
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SourceKind::GeneralInformation => {
                &[HOSPITAL_NAME, ADDRESS, CITY, STATE, ZIP_CODE, LOCATION]
            }
            SourceKind::PatientSurvey => &[HCAHPS_MEASURE_ID, HOSPITAL_NAME, STAR_RATING],
            SourceKind::ReadmissionsAndDeaths => &[MEASURE_ID, HOSPITAL_NAME, SCORE],
            SourceKind::Payment => &[PAYMENT_MEASURE_ID, HOSPITAL_NAME, PAYMENT],
        }
    }

    /// `None` for the primary source, which is not a measure source.
    pub fn measure_layout(&self) -> Option<MeasureLayout> {
        match self {
            SourceKind::GeneralInformation => None,
            SourceKind::PatientSurvey => Some(MeasureLayout {
                category: Category::StarRatings,
                key_column: HCAHPS_MEASURE_ID,
                value_column: STAR_RATING,
                allow: Some(STAR_RATING_MEASURES),
            }),
            SourceKind::ReadmissionsAndDeaths => Some(MeasureLayout {
                category: Category::ReadmissionsAndDeaths,
                key_column: MEASURE_ID,
                value_column: SCORE,
                allow: None,
            }),
            SourceKind::Payment => Some(MeasureLayout {
                category: Category::Payment,
                key_column: PAYMENT_MEASURE_ID,
                value_column: PAYMENT,
                allow: Some(PAYMENT_MEASURES),
            }),
        }
    }
}
