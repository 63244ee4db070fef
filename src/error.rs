use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("home institution {0} is not listed in institutions")]
    UnknownHome(String),

    #[error("{metric} has no entry for {institution}")]
    MissingEntry {
        metric: &'static str,
        institution: String,
    },

    #[error("research year {year} has no entry for {institution}")]
    MissingResearch { year: String, institution: String },

    #[error("no segment profile for {0}")]
    MissingSegments(String),

    #[error("unknown institution: {0}")]
    UnknownInstitution(String),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("CSV missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("invalid analysis payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("bucket {name} in {category} has percentage {percentage} outside 0..=100")]
    PercentageOutOfRange {
        category: &'static str,
        name: String,
        percentage: f64,
    },
}
