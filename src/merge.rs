//! Outer join of hospital sources into one document per hospital name.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::SourcePaths;
use crate::document::{Address, EntityDocument};
use crate::error::Result;
use crate::geo::extract_coordinates;
use crate::parser::{TabularSource, read_source};
use crate::sources::{self, MeasureLayout, SourceKind};
use crate::stats::IngestStats;

/// Accumulates documents across sources, keyed by exact hospital name.
#[derive(Debug, Default)]
pub struct MergeEngine {
    documents: BTreeMap<String, EntityDocument>,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, identity: &str) -> Option<&EntityDocument> {
        self.documents.get(identity)
    }

    /// Merges every data row of `source` into the collection.
    ///
    /// All required columns are checked before any row is touched, so a
    /// source with a bad header leaves the collection unchanged.
    #[tracing::instrument(skip_all, fields(kind = kind.name(), path = %source.path.display()))]
    pub fn ingest(&mut self, kind: SourceKind, source: &TabularSource) -> Result<IngestStats> {
        for column in kind.required_columns() {
            source.column(column)?;
        }

        let mut stats = IngestStats::new(kind, source.path.display().to_string());
        match kind.measure_layout() {
            None => self.ingest_general(source, &mut stats)?,
            Some(layout) => self.ingest_measures(source, layout, &mut stats)?,
        }

        info!(
            rows = stats.rows,
            merged = stats.merged,
            filtered = stats.filtered,
            skipped = stats.skipped,
            created = stats.documents_created,
            total = self.documents.len(),
            "Source merged"
        );
        Ok(stats)
    }

    /// Hands off the collection, ordered by hospital name.
    pub fn finalize(self) -> Vec<EntityDocument> {
        self.documents.into_values().collect()
    }

    fn ingest_general(&mut self, source: &TabularSource, stats: &mut IngestStats) -> Result<()> {
        let name = source.column(sources::HOSPITAL_NAME)?;
        let address = source.column(sources::ADDRESS)?;
        let city = source.column(sources::CITY)?;
        let state = source.column(sources::STATE)?;
        let zip = source.column(sources::ZIP_CODE)?;
        let location = source.column(sources::LOCATION)?;

        for row in source.records() {
            stats.rows += 1;
            let Some(doc) = self.document_for(&row[name], stats) else {
                continue;
            };

            doc.address = Some(Address {
                street_address: non_empty(&row[address]),
                city: non_empty(&row[city]),
                state: non_empty(&row[state]),
                zip: non_empty(&row[zip]),
            });
            doc.coordinates = extract_coordinates(&row[location]);
            if doc.coordinates.is_some() {
                stats.with_coordinates += 1;
            } else {
                debug!(hospital = %row[name], "No coordinates in location");
            }
            stats.merged += 1;
        }

        Ok(())
    }

    fn ingest_measures(
        &mut self,
        source: &TabularSource,
        layout: MeasureLayout,
        stats: &mut IngestStats,
    ) -> Result<()> {
        let name = source.column(sources::HOSPITAL_NAME)?;
        let key = source.column(layout.key_column)?;
        let value = source.column(layout.value_column)?;

        for row in source.records() {
            stats.rows += 1;
            if !layout.accepts(&row[key]) {
                stats.filtered += 1;
                continue;
            }
            let Some(doc) = self.document_for(&row[name], stats) else {
                continue;
            };

            doc.measures_mut(layout.category)
                .insert(row[key].clone(), row[value].clone());
            stats.merged += 1;
        }

        Ok(())
    }

    fn document_for(
        &mut self,
        identity: &str,
        stats: &mut IngestStats,
    ) -> Option<&mut EntityDocument> {
        if identity.trim().is_empty() {
            stats.skipped += 1;
            return None;
        }

        if !self.documents.contains_key(identity) {
            stats.documents_created += 1;
        }
        Some(
            self.documents
                .entry(identity.to_string())
                .or_insert_with(|| EntityDocument::new(identity)),
        )
    }
}

fn non_empty(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty()).then(|| cell.to_string())
}

/// Reads every configured source, then merges them in order.
///
/// All files are loaded before the first merge, so a missing or malformed
/// source aborts the run without producing a partial collection.
pub fn merge_sources(paths: &SourcePaths) -> Result<(Vec<EntityDocument>, Vec<IngestStats>)> {
    let loaded = paths
        .entries()
        .into_iter()
        .map(|(kind, path)| Ok((kind, read_source(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut engine = MergeEngine::new();
    let mut all_stats = Vec::with_capacity(loaded.len());
    for (kind, source) in &loaded {
        let stats = engine.ingest(*kind, source)?;
        if stats.rows > 0 && stats.merged == 0 {
            warn!(kind = kind.name(), "Source contributed no rows");
        }
        all_stats.push(stats);
    }

    Ok((engine.finalize(), all_stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Category;
    use crate::error::RaterError;
    use crate::geo::Coordinates;
    use crate::parser::parse_source;
    use std::path::Path;

    const GENERAL_HEADER: &str = "Hospital Name,Address,City,State,ZIP Code,Location";
    const SURVEY_HEADER: &str = "HCAHPS Measure ID,Hospital Name,HCAHPS Question,Patient Survey Star Rating";
    const READMISSIONS_HEADER: &str = "Measure ID,Hospital Name,Score";

    fn source(header: &str, rows: &[&str]) -> TabularSource {
        let text = std::iter::once(header)
            .chain(rows.iter().copied())
            .collect::<Vec<_>>()
            .join("\n");
        parse_source(Path::new("mem.csv"), text.as_bytes()).unwrap()
    }

    fn general(rows: &[&str]) -> TabularSource {
        source(GENERAL_HEADER, rows)
    }

    fn survey(rows: &[&str]) -> TabularSource {
        source(SURVEY_HEADER, rows)
    }

    #[test]
    fn test_general_and_survey_join() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::GeneralInformation,
                &general(&[
                    r#"General Hospital,1 Main St,Springfield,IL,62704,"1 Main St Springfield, IL (39.78, -89.65)""#,
                ]),
            )
            .unwrap();
        engine
            .ingest(
                SourceKind::PatientSurvey,
                &survey(&["H_STAR_RATING,General Hospital,Summary star rating,4"]),
            )
            .unwrap();

        let docs = engine.finalize();
        assert_eq!(docs.len(), 1);

        let doc = &docs[0];
        assert_eq!(doc.identity, "General Hospital");
        assert_eq!(
            doc.address,
            Some(Address {
                street_address: Some("1 Main St".into()),
                city: Some("Springfield".into()),
                state: Some("IL".into()),
                zip: Some("62704".into()),
            })
        );
        assert_eq!(
            doc.coordinates,
            Some(Coordinates {
                lat: 39.78,
                lon: -89.65
            })
        );
        assert_eq!(doc.star_ratings.len(), 1);
        assert_eq!(doc.star_ratings["H_STAR_RATING"], "4");
    }

    #[test]
    fn test_location_without_pair() {
        let mut engine = MergeEngine::new();
        let stats = engine
            .ingest(
                SourceKind::GeneralInformation,
                &general(&[r#"General Hospital,1 Main St,Springfield,IL,62704,"Springfield, IL""#]),
            )
            .unwrap();

        let doc = engine.get("General Hospital").unwrap();
        assert!(doc.address.is_some());
        assert_eq!(doc.coordinates, None);
        assert_eq!(stats.with_coordinates, 0);
    }

    #[test]
    fn test_measure_only_hospital_is_kept() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::GeneralInformation,
                &general(&[r#"A,1 Main St,X,IL,1,"(1.0, 2.0)""#]),
            )
            .unwrap();
        let stats = engine
            .ingest(
                SourceKind::PatientSurvey,
                &survey(&["H_CLEAN_STAR_RATING,B,Clean,3"]),
            )
            .unwrap();

        assert_eq!(stats.documents_created, 1);
        let doc = engine.get("B").unwrap();
        assert!(doc.address.is_none());
        assert!(doc.coordinates.is_none());
        assert_eq!(doc.star_ratings["H_CLEAN_STAR_RATING"], "3");
    }

    #[test]
    fn test_measures_accumulate_and_last_write_wins() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::ReadmissionsAndDeaths,
                &source(
                    READMISSIONS_HEADER,
                    &["MORT_30_AMI,A,13.1", "READM_30_AMI,A,16.0", "MORT_30_AMI,A,12.9"],
                ),
            )
            .unwrap();

        let doc = engine.get("A").unwrap();
        assert_eq!(doc.readmissions_and_deaths.len(), 2);
        assert_eq!(doc.readmissions_and_deaths["MORT_30_AMI"], "12.9");
        assert_eq!(doc.readmissions_and_deaths["READM_30_AMI"], "16.0");
    }

    #[test]
    fn test_sources_do_not_clobber_each_other() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::PatientSurvey,
                &survey(&["H_STAR_RATING,A,Summary,5"]),
            )
            .unwrap();
        engine
            .ingest(
                SourceKind::GeneralInformation,
                &general(&[r#"A,1 Main St,X,IL,1,"(1.0, 2.0)""#]),
            )
            .unwrap();
        engine
            .ingest(
                SourceKind::ReadmissionsAndDeaths,
                &source(READMISSIONS_HEADER, &["MORT_30_HF,A,11.0"]),
            )
            .unwrap();

        let doc = engine.get("A").unwrap();
        assert_eq!(doc.star_ratings["H_STAR_RATING"], "5");
        assert_eq!(doc.readmissions_and_deaths["MORT_30_HF"], "11.0");
        assert!(doc.address.is_some());
        assert!(doc.measures(Category::Payment).is_empty());
    }

    #[test]
    fn test_survey_rows_outside_allow_list_are_filtered() {
        let mut engine = MergeEngine::new();
        let stats = engine
            .ingest(
                SourceKind::PatientSurvey,
                &survey(&[
                    "H_COMP_1_A_P,A,Nurses always communicated well,Not Applicable",
                    "H_COMP_1_STAR_RATING,A,Nurse communication,4",
                ]),
            )
            .unwrap();

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.merged, 1);
        let doc = engine.get("A").unwrap();
        assert_eq!(doc.star_ratings.len(), 1);
    }

    #[test]
    fn test_filtered_rows_do_not_create_documents() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::PatientSurvey,
                &survey(&["H_COMP_1_A_P,A,Nurses,Not Applicable"]),
            )
            .unwrap();

        assert!(engine.is_empty());
    }

    #[test]
    fn test_general_row_overwrites_address() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::GeneralInformation,
                &general(&[r#"A,1 Old Rd,X,IL,1,"(1.0, 2.0)""#, "A,2 New Rd,X,IL,1,nowhere"]),
            )
            .unwrap();

        let doc = engine.get("A").unwrap();
        let address = doc.address.as_ref().unwrap();
        assert_eq!(address.street_address.as_deref(), Some("2 New Rd"));
        assert_eq!(doc.coordinates, None);
    }

    #[test]
    fn test_header_row_is_not_an_entity() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(SourceKind::GeneralInformation, &general(&[]))
            .unwrap();

        assert!(engine.get("Hospital Name").is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_empty_identity_is_skipped() {
        let mut engine = MergeEngine::new();
        let stats = engine
            .ingest(
                SourceKind::ReadmissionsAndDeaths,
                &source(READMISSIONS_HEADER, &["MORT_30_AMI,,13.1"]),
            )
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_blank_identity_is_skipped() {
        let mut engine = MergeEngine::new();
        let stats = engine
            .ingest(
                SourceKind::ReadmissionsAndDeaths,
                &source(READMISSIONS_HEADER, &["MORT_30_AMI, ,13.1", "MORT_30_HF,\t,9.0"]),
            )
            .unwrap();

        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.documents_created, 0);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_missing_column_leaves_collection_unchanged() {
        let mut engine = MergeEngine::new();
        let err = engine
            .ingest(
                SourceKind::ReadmissionsAndDeaths,
                &source("Measure ID,Hospital Name", &["MORT_30_AMI,A"]),
            )
            .unwrap_err();

        assert!(matches!(err, RaterError::MissingColumn { ref column, .. } if column == "Score"));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_identity_match_is_exact() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::PatientSurvey,
                &survey(&["H_STAR_RATING,General Hospital,S,4", "H_STAR_RATING,GENERAL HOSPITAL,S,2"]),
            )
            .unwrap();

        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_finalize_sorted_by_identity() {
        let mut engine = MergeEngine::new();
        engine
            .ingest(
                SourceKind::ReadmissionsAndDeaths,
                &source(READMISSIONS_HEADER, &["M,Zeta,1", "M,Alpha,2", "M,Mid,3"]),
            )
            .unwrap();

        let names: Vec<_> = engine
            .finalize()
            .into_iter()
            .map(|d| d.identity)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }
}
