use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject (institution display name) keyed lookup.
pub type SubjectMap<T> = BTreeMap<String, T>;

/// Segment category name -> attribute name -> value; attributes keep file order.
pub type SegmentProfile = BTreeMap<String, IndexMap<String, SegmentValue>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl SegmentValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SegmentValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentValue::Number(value) => write!(f, "{value}"),
            SegmentValue::Text(text) => f.write_str(text),
            SegmentValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchPoint {
    pub year: String,
    #[serde(flatten)]
    pub values: SubjectMap<f64>,
}

/// Metrics for one compared institution, as seen from that institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetrics {
    pub placement_percent: SubjectMap<f64>,
    pub avg_salary: SubjectMap<f64>,
    pub highest_salary: SubjectMap<f64>,
    pub roi: SubjectMap<f64>,
    pub research: Vec<ResearchPoint>,
    pub alumni_size: SubjectMap<u64>,
    #[serde(default)]
    pub niche_areas: SubjectMap<Vec<String>>,
    #[serde(default)]
    pub segments: SegmentProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
    Info,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Info => "info",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBucket {
    pub name: String,
    pub count: u64,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentCategory {
    Geographic,
    Academic,
    Socioeconomic,
    MarketingChannel,
    Accommodation,
    ParentSentiment,
}

impl SegmentCategory {
    pub const ALL: [SegmentCategory; 6] = [
        SegmentCategory::Geographic,
        SegmentCategory::Academic,
        SegmentCategory::Socioeconomic,
        SegmentCategory::MarketingChannel,
        SegmentCategory::Accommodation,
        SegmentCategory::ParentSentiment,
    ];

    /// Column holding this category in a segmented student CSV.
    pub fn column(self) -> &'static str {
        match self {
            SegmentCategory::Geographic => "geographic_segment",
            SegmentCategory::Academic => "academic_segment",
            SegmentCategory::Socioeconomic => "socioeconomic_segment",
            SegmentCategory::MarketingChannel => "marketing_channel_type",
            SegmentCategory::Accommodation => "accommodation",
            SegmentCategory::ParentSentiment => "parents_sentiment",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SegmentCategory::Geographic => "geographic",
            SegmentCategory::Academic => "academic",
            SegmentCategory::Socioeconomic => "socioeconomic",
            SegmentCategory::MarketingChannel => "marketing_channel",
            SegmentCategory::Accommodation => "accommodation",
            SegmentCategory::ParentSentiment => "parent_sentiment",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            SegmentCategory::Geographic => "Geographic Distribution",
            SegmentCategory::Academic => "Academic Performance",
            SegmentCategory::Socioeconomic => "Socio-Economic Status",
            SegmentCategory::MarketingChannel => "Marketing Channels",
            SegmentCategory::Accommodation => "Accommodation Preference",
            SegmentCategory::ParentSentiment => "Parent Sentiment",
        }
    }
}

/// Segmentation analysis payload, in the shape the analysis endpoint returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_students: u64,
    pub segments_created: u32,
    pub geographic_segments: Vec<SegmentBucket>,
    pub academic_segments: Vec<SegmentBucket>,
    pub socioeconomic_segments: Vec<SegmentBucket>,
    pub marketing_channels: Vec<SegmentBucket>,
    pub accommodation_segments: Vec<SegmentBucket>,
    pub parent_sentiments: Vec<SegmentBucket>,
    #[serde(default)]
    pub insights: Vec<Insight>,
}

impl AnalysisReport {
    pub fn empty() -> Self {
        Self {
            total_students: 0,
            segments_created: 0,
            geographic_segments: Vec::new(),
            academic_segments: Vec::new(),
            socioeconomic_segments: Vec::new(),
            marketing_channels: Vec::new(),
            accommodation_segments: Vec::new(),
            parent_sentiments: Vec::new(),
            insights: Vec::new(),
        }
    }

    pub fn buckets(&self, category: SegmentCategory) -> &[SegmentBucket] {
        match category {
            SegmentCategory::Geographic => &self.geographic_segments,
            SegmentCategory::Academic => &self.academic_segments,
            SegmentCategory::Socioeconomic => &self.socioeconomic_segments,
            SegmentCategory::MarketingChannel => &self.marketing_channels,
            SegmentCategory::Accommodation => &self.accommodation_segments,
            SegmentCategory::ParentSentiment => &self.parent_sentiments,
        }
    }

    pub fn buckets_mut(&mut self, category: SegmentCategory) -> &mut Vec<SegmentBucket> {
        match category {
            SegmentCategory::Geographic => &mut self.geographic_segments,
            SegmentCategory::Academic => &mut self.academic_segments,
            SegmentCategory::Socioeconomic => &mut self.socioeconomic_segments,
            SegmentCategory::MarketingChannel => &mut self.marketing_channels,
            SegmentCategory::Accommodation => &mut self.accommodation_segments,
            SegmentCategory::ParentSentiment => &mut self.parent_sentiments,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub report: AnalysisReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_values_parse_untagged() {
        let profile: SegmentProfile = serde_json::from_str(
            r#"{"Career Opportunities": {"Top Recruiters": ["TCS", "Infosys"], "Avg Placement": "6.2 LPA"},
                "Industry & Global Exposure": {"MoUs": 45}}"#,
        )
        .unwrap();

        let career = &profile["Career Opportunities"];
        assert_eq!(career["Top Recruiters"].to_string(), "TCS, Infosys");
        assert_eq!(career["Avg Placement"].as_number(), None);
        assert_eq!(profile["Industry & Global Exposure"]["MoUs"].as_number(), Some(45.0));
        assert_eq!(profile["Industry & Global Exposure"]["MoUs"].to_string(), "45");
    }

    #[test]
    fn research_point_keeps_year_out_of_values() {
        let point: ResearchPoint =
            serde_json::from_str(r#"{"year": "2021", "A": 12, "B": 9.5}"#).unwrap();
        assert_eq!(point.year, "2021");
        assert_eq!(point.values.len(), 2);
        assert_eq!(point.values["B"], 9.5);
    }

    #[test]
    fn category_keys_round_trip() {
        for category in SegmentCategory::ALL {
            assert_eq!(SegmentCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(SegmentCategory::from_key("unknown"), None);
    }

    #[test]
    fn bucket_color_is_optional() {
        let bucket: SegmentBucket =
            serde_json::from_str(r#"{"name": "Local", "count": 40, "percentage": 40.0}"#).unwrap();
        assert_eq!(bucket.color, None);
        let json = serde_json::to_string(&bucket).unwrap();
        assert!(!json.contains("color"));
    }
}
