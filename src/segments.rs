use serde::Serialize;

use crate::models::{SegmentBucket, SegmentCategory, SegmentProfile};

pub const PALETTE: [&str; 5] = ["#00D4FF", "#1E2A78", "#7C88CC", "#00BDEB", "#3A4A9A"];

pub const TOP_SEGMENT_COUNT: usize = 3;

/// Display order of the institution profile cards.
pub const SEGMENT_ORDER: [&str; 8] = [
    "Institutional Profile",
    "Academic Excellence",
    "Career Opportunities",
    "Industry & Global Exposure",
    "Student Experience & Campus Life",
    "Financial Factors",
    "Innovation & Entrepreneurship",
    "Alumni Network & Legacy",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTuple {
    pub name: String,
    pub value: u64,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarTuple {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: &'static str,
    pub chart: Vec<ChartTuple>,
    pub bars: Vec<BarTuple>,
    pub top: Vec<SegmentBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentCard {
    pub title: String,
    pub details: Vec<(String, String)>,
}

/// Fills in a palette color by position wherever a bucket has none.
pub fn assign_colors(buckets: &[SegmentBucket]) -> Vec<SegmentBucket> {
    buckets
        .iter()
        .enumerate()
        .map(|(idx, bucket)| {
            let color = match &bucket.color {
                Some(color) if !color.is_empty() => color.clone(),
                _ => PALETTE[idx % PALETTE.len()].to_string(),
            };
            SegmentBucket {
                color: Some(color),
                ..bucket.clone()
            }
        })
        .collect()
}

pub fn chart_tuples(buckets: &[SegmentBucket]) -> Vec<ChartTuple> {
    buckets
        .iter()
        .map(|bucket| ChartTuple {
            name: bucket.name.clone(),
            value: bucket.count,
            percentage: bucket.percentage,
            color: bucket.color.clone(),
        })
        .collect()
}

pub fn bar_tuples(buckets: &[SegmentBucket]) -> Vec<BarTuple> {
    buckets
        .iter()
        .map(|bucket| BarTuple {
            name: bucket.name.clone(),
            value: bucket.count,
        })
        .collect()
}

/// Largest `n` buckets by count; equal counts keep their input order.
pub fn top_segments(buckets: &[SegmentBucket], n: usize) -> Vec<SegmentBucket> {
    let mut sorted = buckets.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted.truncate(n);
    sorted
}

pub fn summarize(category: SegmentCategory, buckets: &[SegmentBucket], n: usize) -> CategorySummary {
    let colored = assign_colors(buckets);
    CategorySummary {
        category: category.label(),
        chart: chart_tuples(&colored),
        bars: bar_tuples(&colored),
        top: top_segments(&colored, n),
    }
}

/// Profile cards in display order; categories the profile lacks are skipped.
pub fn segment_cards(profile: &SegmentProfile) -> Vec<SegmentCard> {
    SEGMENT_ORDER
        .iter()
        .filter_map(|title| {
            profile.get(*title).map(|attributes| SegmentCard {
                title: (*title).to_string(),
                details: attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect(),
            })
        })
        .collect()
}
