use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::AnalysisError;
use crate::models::{AnalysisReport, Insight, SegmentBucket, SegmentCategory};

/// Reported segmentation dimensions, kept at the value the dashboard expects.
pub const SEGMENTS_CREATED: u32 = 7;

const MAX_INSIGHTS: usize = 4;
const METRO_EXPANSION_THRESHOLD: f64 = 35.0;

/// Cell values read as missing, the same set pandas' `read_csv` treats as NaN.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn analyze_csv(path: &Path) -> Result<AnalysisReport, AnalysisError> {
    let reader = reader_builder().from_path(path)?;
    let report = analyze(reader)?;
    tracing::info!(
        path = %path.display(),
        students = report.total_students,
        insights = report.insights.len(),
        "segmentation analysis complete"
    );
    Ok(report)
}

pub fn analyze_reader<R: Read>(input: R) -> Result<AnalysisReport, AnalysisError> {
    analyze(reader_builder().from_reader(input))
}

/// Short rows are accepted; their missing cells count as blank.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.flexible(true);
    builder
}

fn analyze<R: Read>(mut reader: csv::Reader<R>) -> Result<AnalysisReport, AnalysisError> {
    let headers = reader.headers()?.clone();

    let mut missing = Vec::new();
    let mut columns = Vec::with_capacity(SegmentCategory::ALL.len());
    for category in SegmentCategory::ALL {
        match headers.iter().position(|h| h.trim() == category.column()) {
            Some(idx) => columns.push((category, idx)),
            None => missing.push(category.column().to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(AnalysisError::MissingColumns(missing));
    }

    let mut counters: Vec<ValueCounter> = columns.iter().map(|_| ValueCounter::default()).collect();
    let mut total_students = 0u64;

    for result in reader.records() {
        let record = result?;
        total_students += 1;
        for ((_, idx), counter) in columns.iter().zip(counters.iter_mut()) {
            if let Some(value) = record.get(*idx) {
                counter.observe(value);
            }
        }
    }

    let mut report = AnalysisReport::empty();
    report.total_students = total_students;
    report.segments_created = SEGMENTS_CREATED;
    for ((category, _), counter) in columns.into_iter().zip(counters) {
        *report.buckets_mut(category) = counter.into_buckets(total_students);
    }
    report.insights = generate_insights(&report);

    Ok(report)
}

/// Counts values in first-seen order; missing cells are not counted.
#[derive(Default)]
struct ValueCounter {
    order: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl ValueCounter {
    fn observe(&mut self, value: &str) {
        if NA_TOKENS.contains(&value) {
            return;
        }
        match self.index.get(value) {
            Some(&pos) => self.order[pos].1 += 1,
            None => {
                self.index.insert(value.to_string(), self.order.len());
                self.order.push((value.to_string(), 1));
            }
        }
    }

    fn into_buckets(self, total: u64) -> Vec<SegmentBucket> {
        let mut counts = self.order;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .map(|(name, count)| SegmentBucket {
                name,
                count,
                percentage: percentage(count, total),
                color: None,
            })
            .collect()
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// First bucket holding the maximum count.
fn leading(buckets: &[SegmentBucket]) -> Option<&SegmentBucket> {
    buckets
        .iter()
        .fold(None, |best: Option<&SegmentBucket>, bucket| match best {
            Some(current) if current.count >= bucket.count => Some(current),
            _ => Some(bucket),
        })
}

pub fn generate_insights(report: &AnalysisReport) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(top_geo) = leading(&report.geographic_segments) {
        match top_geo.name.as_str() {
            "Local" => insights.push(Insight {
                icon: "📍".to_string(),
                title: "Local Market Dominance".to_string(),
                description: format!(
                    "{:.1}% of students are from local areas. Focus on strengthening day-scholar facilities and local outreach programs.",
                    top_geo.percentage
                ),
            }),
            "Metro" => insights.push(Insight {
                icon: "🏙️".to_string(),
                title: "Metro Market Strength".to_string(),
                description: format!(
                    "{:.1}% from metro cities. Invest in hostel facilities and metro-specific digital campaigns.",
                    top_geo.percentage
                ),
            }),
            _ => {}
        }
    }

    if let Some(channel) = leading(&report.marketing_channels) {
        let (icon, advice) = match channel.name.as_str() {
            "Digital" => ("💻", "Increase investment in social media and Google ads."),
            "Referral" => ("🤝", "Strengthen referral programs with incentives."),
            _ => ("📺", "Optimize traditional marketing ROI."),
        };
        insights.push(Insight {
            icon: icon.to_string(),
            title: format!("{} Channel Success", channel.name),
            description: format!(
                "{:.1}% of admissions come from {} channels. {advice}",
                channel.percentage,
                channel.name.to_lowercase()
            ),
        });
    }

    if let Some(high) = report
        .academic_segments
        .iter()
        .find(|bucket| bucket.name == "High Performer")
    {
        insights.push(Insight {
            icon: "🎓".to_string(),
            title: "High Performer Attraction".to_string(),
            description: format!(
                "{:.1}% are high performers. Showcase advanced learning opportunities and research facilities to attract top talent.",
                high.percentage
            ),
        });
    }

    if let Some(metro) = report
        .geographic_segments
        .iter()
        .find(|bucket| bucket.name == "Metro")
    {
        if metro.percentage < METRO_EXPANSION_THRESHOLD {
            insights.push(Insight {
                icon: "🎯".to_string(),
                title: "Metro Expansion Opportunity".to_string(),
                description: format!(
                    "Only {:.1}% metro students - significant growth potential. Target Chennai, Bangalore, and Hyderabad with specialized campaigns.",
                    metro.percentage
                ),
            });
        }
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

/// Parses an analysis payload produced by the segmentation service.
pub fn parse_analysis_json(text: &str) -> Result<AnalysisReport, AnalysisError> {
    let report: AnalysisReport = serde_json::from_str(text)?;
    for category in SegmentCategory::ALL {
        for bucket in report.buckets(category) {
            if !(0.0..=100.0).contains(&bucket.percentage) {
                return Err(AnalysisError::PercentageOutOfRange {
                    category: category.key(),
                    name: bucket.name.clone(),
                    percentage: bucket.percentage,
                });
            }
        }
    }
    tracing::debug!(students = report.total_students, "analysis payload parsed");
    Ok(report)
}
