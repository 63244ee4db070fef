use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::DatasetError;
use crate::models::{EntityMetrics, ResearchPoint, SegmentProfile, SubjectMap};

const EMBEDDED_DATASET: &str = include_str!("../data/institutions.json");

/// Cross-institution metrics, stored once and keyed by institution name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedMetrics {
    pub placement_percent: SubjectMap<f64>,
    pub avg_salary: SubjectMap<f64>,
    pub highest_salary: SubjectMap<f64>,
    pub roi: SubjectMap<f64>,
    pub research: Vec<ResearchPoint>,
    pub alumni_size: SubjectMap<u64>,
    #[serde(default)]
    pub niche_areas: SubjectMap<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    home: String,
    institutions: Vec<String>,
    metrics: SharedMetrics,
    segments: BTreeMap<String, SegmentProfile>,
}

/// Read-only institution table, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Dataset {
    home: String,
    institutions: Vec<String>,
    metrics: SharedMetrics,
    segments: BTreeMap<String, SegmentProfile>,
}

impl Dataset {
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::from_json(EMBEDDED_DATASET)
    }

    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Loads the table at `path`, or the embedded one when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, DatasetError> {
        let dataset = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::embedded()?,
        };
        tracing::info!(
            home = %dataset.home,
            institutions = dataset.institutions.len(),
            source = %path.map_or_else(|| "embedded".to_string(), |p| p.display().to_string()),
            "institution dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_json(text: &str) -> Result<Self, DatasetError> {
        let file: DatasetFile = serde_json::from_str(text)?;
        validate(&file)?;
        Ok(Self {
            home: file.home,
            institutions: file.institutions,
            metrics: file.metrics,
            segments: file.segments,
        })
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn institutions(&self) -> &[String] {
        &self.institutions
    }

    pub fn competitors(&self) -> impl Iterator<Item = &str> {
        self.institutions
            .iter()
            .map(String::as_str)
            .filter(|name| *name != self.home)
    }

    /// Resolves a user-supplied name to its canonical spelling, ignoring ASCII case.
    pub fn resolve(&self, query: &str) -> Result<&str, DatasetError> {
        let query = query.trim();
        self.institutions
            .iter()
            .find(|name| name.eq_ignore_ascii_case(query))
            .map(String::as_str)
            .ok_or_else(|| DatasetError::UnknownInstitution(query.to_string()))
    }

    pub fn entity(&self, name: &str) -> Result<EntityMetrics, DatasetError> {
        let segments = self
            .segments
            .get(name)
            .ok_or_else(|| DatasetError::UnknownInstitution(name.to_string()))?;
        let shared = &self.metrics;

        Ok(EntityMetrics {
            placement_percent: shared.placement_percent.clone(),
            avg_salary: shared.avg_salary.clone(),
            highest_salary: shared.highest_salary.clone(),
            roi: shared.roi.clone(),
            research: shared.research.clone(),
            alumni_size: shared.alumni_size.clone(),
            niche_areas: shared.niche_areas.clone(),
            segments: segments.clone(),
        })
    }
}

fn validate(file: &DatasetFile) -> Result<(), DatasetError> {
    if !file.institutions.contains(&file.home) {
        return Err(DatasetError::UnknownHome(file.home.clone()));
    }

    let metrics = &file.metrics;
    for institution in &file.institutions {
        require(&metrics.placement_percent, "placementPercent", institution)?;
        require(&metrics.avg_salary, "avgSalary", institution)?;
        require(&metrics.highest_salary, "highestSalary", institution)?;
        require(&metrics.roi, "roi", institution)?;
        require(&metrics.alumni_size, "alumniSize", institution)?;

        for point in &metrics.research {
            if !point.values.contains_key(institution) {
                return Err(DatasetError::MissingResearch {
                    year: point.year.clone(),
                    institution: institution.clone(),
                });
            }
        }

        if !file.segments.contains_key(institution) {
            return Err(DatasetError::MissingSegments(institution.clone()));
        }
    }

    Ok(())
}

fn require<T>(
    map: &SubjectMap<T>,
    metric: &'static str,
    institution: &str,
) -> Result<(), DatasetError> {
    if map.contains_key(institution) {
        Ok(())
    } else {
        Err(DatasetError::MissingEntry {
            metric,
            institution: institution.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "Bannari Amman Institute of Technology";

    fn minimal_json(roi: &str) -> String {
        format!(
            r#"{{
                "home": "A",
                "institutions": ["A", "B"],
                "metrics": {{
                    "placementPercent": {{"A": 90, "B": 80}},
                    "avgSalary": {{"A": 6, "B": 5}},
                    "highestSalary": {{"A": 20, "B": 30}},
                    "roi": {roi},
                    "research": [{{"year": "2022", "A": 1, "B": 2}}],
                    "alumniSize": {{"A": 100, "B": 200}}
                }},
                "segments": {{"A": {{}}, "B": {{}}}}
            }}"#
        )
    }

    #[test]
    fn embedded_dataset_loads() {
        let dataset = Dataset::embedded().unwrap();
        assert_eq!(dataset.home(), HOME);
        assert_eq!(dataset.institutions().len(), 7);
        let competitors: Vec<&str> = dataset.competitors().collect();
        assert_eq!(competitors.len(), 6);
        assert!(!competitors.contains(&HOME));
        assert_eq!(competitors[0], "PSG College of Technology");
    }

    #[test]
    fn entity_lookups_cover_every_institution() {
        let dataset = Dataset::embedded().unwrap();
        let home = dataset.entity(HOME).unwrap();
        for name in dataset.institutions() {
            assert!(home.roi.contains_key(name));
            assert!(home.alumni_size.contains_key(name));
            assert!(home.research.iter().all(|p| p.values.contains_key(name)));
        }
        assert_eq!(home.roi[HOME], 72.0);
        assert_eq!(home.alumni_size["PSG College of Technology"], 25000);
        assert_eq!(
            home.segments["Industry & Global Exposure"]["MoUs"].as_number(),
            Some(45.0)
        );
    }

    #[test]
    fn entity_carries_its_own_segments() {
        let dataset = Dataset::embedded().unwrap();
        let psg = dataset.entity("PSG College of Technology").unwrap();
        assert_eq!(
            psg.segments["Innovation & Entrepreneurship"]["Startups"].as_number(),
            Some(30.0)
        );
    }

    #[test]
    fn unknown_institution_is_rejected() {
        let dataset = Dataset::embedded().unwrap();
        assert!(matches!(
            dataset.entity("Nowhere College"),
            Err(DatasetError::UnknownInstitution(_))
        ));
        assert!(dataset.resolve("nowhere").is_err());
    }

    #[test]
    fn resolve_ignores_case() {
        let dataset = Dataset::embedded().unwrap();
        assert_eq!(
            dataset.resolve("  kongu engineering college ").unwrap(),
            "Kongu Engineering College"
        );
    }

    #[test]
    fn minimal_table_validates() {
        let dataset = Dataset::from_json(&minimal_json(r#"{"A": 72, "B": 65}"#)).unwrap();
        assert_eq!(dataset.home(), "A");
        assert_eq!(dataset.competitors().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn missing_metric_entry_fails_validation() {
        let err = Dataset::from_json(&minimal_json(r#"{"A": 72}"#)).unwrap_err();
        match err {
            DatasetError::MissingEntry {
                metric,
                institution,
            } => {
                assert_eq!(metric, "roi");
                assert_eq!(institution, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    const VALID_ROI: &str = r#"{"A": 72, "B": 65}"#;

    #[test]
    fn research_year_missing_an_institution_fails_validation() {
        let json = minimal_json(VALID_ROI).replace(r#", "B": 2}]"#, "}]");
        match Dataset::from_json(&json).unwrap_err() {
            DatasetError::MissingResearch { year, institution } => {
                assert_eq!(year, "2022");
                assert_eq!(institution, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn institution_without_segments_fails_validation() {
        let json = minimal_json(VALID_ROI).replace(r#", "B": {}"#, "");
        assert!(matches!(
            Dataset::from_json(&json),
            Err(DatasetError::MissingSegments(name)) if name == "B"
        ));
    }

    #[test]
    fn home_must_be_listed() {
        let json = minimal_json(VALID_ROI).replace(r#""home": "A""#, r#""home": "C""#);
        assert!(matches!(
            Dataset::from_json(&json),
            Err(DatasetError::UnknownHome(name)) if name == "C"
        ));
    }

    #[test]
    fn loads_table_from_file() {
        let path =
            std::env::temp_dir().join(format!("campus-dataset-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, minimal_json(VALID_ROI)).unwrap();

        let from_file = Dataset::from_path(&path).unwrap();
        assert_eq!(from_file.home(), "A");
        let loaded = Dataset::load(Some(&path)).unwrap();
        assert_eq!(loaded.institutions(), &["A".to_string(), "B".to_string()]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_without_path_uses_embedded_table() {
        let dataset = Dataset::load(None).unwrap();
        assert_eq!(dataset.home(), HOME);
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let path =
            std::env::temp_dir().join(format!("campus-missing-{}.json", uuid::Uuid::new_v4()));
        match Dataset::load(Some(&path)) {
            Err(DatasetError::Io { path: reported, .. }) => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_typed_error() {
        assert!(matches!(
            Dataset::from_json("{\"home\": 3}"),
            Err(DatasetError::Json(_))
        ));
    }
}
