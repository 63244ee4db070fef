use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{EntityMetrics, SubjectMap};

pub const GROWTH_LEFT_SCALE: f64 = 1.2;
pub const GROWTH_LEFT_STEP: f64 = 2.0;
pub const GROWTH_RIGHT_SCALE: f64 = 1.15;
pub const GROWTH_RIGHT_STEP: f64 = 1.5;

/// (label, segment category, attribute, full mark)
const INFRASTRUCTURE_DIMENSIONS: [(&str, &str, &str, f64); 4] = [
    ("MoUs", "Industry & Global Exposure", "MoUs", 80.0),
    (
        "International Partners",
        "Industry & Global Exposure",
        "International Partners",
        15.0,
    ),
    ("Startups", "Innovation & Entrepreneurship", "Startups", 40.0),
    ("Alumni Chapters", "Alumni Network & Legacy", "Chapters", 30.0),
];

/// Placeholder student-experience figures; not derived from either institution.
const STUDENT_EXPERIENCE: [(&str, f64, f64); 3] = [
    ("Clubs & Activities", 8.0, 12.0),
    ("Campus Facilities", 85.0, 90.0),
    ("Industry Exposure", 88.0, 85.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRow {
    pub label: String,
    pub left: f64,
    pub right: f64,
}

/// One year of a time series; `None` renders as a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: String,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarRow {
    pub subject: String,
    pub left: f64,
    pub right: f64,
    pub full_mark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCharts {
    pub left_name: String,
    pub right_name: String,
    pub placement_salary: Vec<PairRow>,
    pub roi_pie: Vec<PieSlice>,
    pub research: Vec<SeriesPoint>,
    pub alumni: Vec<PairRow>,
    pub infrastructure: Vec<RadarRow>,
    pub growth: Vec<SeriesPoint>,
    pub student_experience: Vec<PairRow>,
}

pub fn shape_comparison(
    left_name: &str,
    right_name: &str,
    left: &EntityMetrics,
    right: &EntityMetrics,
) -> ComparisonCharts {
    tracing::debug!(left = left_name, right = right_name, "shaping comparison charts");

    let placement_salary = [
        ("Placement %", &left.placement_percent, &right.placement_percent),
        ("Avg Salary", &left.avg_salary, &right.avg_salary),
        ("Highest Salary", &left.highest_salary, &right.highest_salary),
    ]
    .into_iter()
    .map(|(label, left_map, right_map)| PairRow {
        label: label.to_string(),
        left: metric_value(left_map, left_name, label),
        right: metric_value(right_map, right_name, label),
    })
    .collect();

    let roi_pie = vec![
        PieSlice {
            name: left_name.to_string(),
            value: metric_value(&left.roi, left_name, "ROI"),
        },
        PieSlice {
            name: right_name.to_string(),
            value: metric_value(&right.roi, right_name, "ROI"),
        },
    ];

    let research = left
        .research
        .iter()
        .map(|point| SeriesPoint {
            year: point.year.clone(),
            left: point.values.get(left_name).copied(),
            right: point.values.get(right_name).copied(),
        })
        .collect();

    let alumni = vec![PairRow {
        label: "Alumni Network".to_string(),
        left: alumni_thousands(&left.alumni_size, left_name),
        right: alumni_thousands(&right.alumni_size, right_name),
    }];

    let infrastructure = INFRASTRUCTURE_DIMENSIONS
        .iter()
        .map(|(label, category, attribute, full_mark)| RadarRow {
            subject: (*label).to_string(),
            left: segment_number(left, category, attribute),
            right: segment_number(right, category, attribute),
            full_mark: *full_mark,
        })
        .collect();

    let growth = left
        .research
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let step = idx as f64;
            SeriesPoint {
                year: point.year.clone(),
                left: point
                    .values
                    .get(left_name)
                    .map(|value| value * GROWTH_LEFT_SCALE + step * GROWTH_LEFT_STEP),
                right: point
                    .values
                    .get(right_name)
                    .map(|value| value * GROWTH_RIGHT_SCALE + step * GROWTH_RIGHT_STEP),
            }
        })
        .collect();

    let student_experience = STUDENT_EXPERIENCE
        .iter()
        .map(|(label, home_value, rival_value)| PairRow {
            label: (*label).to_string(),
            left: *home_value,
            right: *rival_value,
        })
        .collect();

    ComparisonCharts {
        left_name: left_name.to_string(),
        right_name: right_name.to_string(),
        placement_salary,
        roi_pie,
        research,
        alumni,
        infrastructure,
        growth,
        student_experience,
    }
}

fn metric_value(map: &SubjectMap<f64>, subject: &str, metric: &str) -> f64 {
    match map.get(subject) {
        Some(value) => *value,
        None => {
            tracing::warn!(subject, metric, "metric missing, defaulting to zero");
            0.0
        }
    }
}

fn alumni_thousands(map: &SubjectMap<u64>, subject: &str) -> f64 {
    match map.get(subject) {
        Some(size) => *size as f64 / 1000.0,
        None => {
            tracing::warn!(subject, "alumni size missing, defaulting to zero");
            0.0
        }
    }
}

fn segment_number(metrics: &EntityMetrics, category: &str, attribute: &str) -> f64 {
    metrics
        .segments
        .get(category)
        .and_then(|attributes| attributes.get(attribute))
        .and_then(|value| value.as_number())
        .unwrap_or(0.0)
}

impl ComparisonCharts {
    /// Renders every series as chart-library rows keyed by institution name.
    pub fn to_chart_json(&self) -> Value {
        let pair_rows = |key: &str, rows: &[PairRow]| -> Value {
            rows.iter()
                .map(|row| {
                    self.keyed_row(key, &row.label, Some(row.left), Some(row.right))
                })
                .collect()
        };
        let series = |points: &[SeriesPoint]| -> Value {
            points
                .iter()
                .map(|point| self.keyed_row("year", &point.year, point.left, point.right))
                .collect()
        };

        let roi: Value = self
            .roi_pie
            .iter()
            .map(|slice| serde_json::json!({ "name": slice.name, "value": slice.value }))
            .collect();

        let infrastructure: Value = self
            .infrastructure
            .iter()
            .map(|row| {
                let mut value =
                    self.keyed_row("subject", &row.subject, Some(row.left), Some(row.right));
                if let Value::Object(object) = &mut value {
                    object.insert("fullMark".to_string(), Value::from(row.full_mark));
                }
                value
            })
            .collect();

        serde_json::json!({
            "leftName": self.left_name,
            "rightName": self.right_name,
            "placementSalary": pair_rows("name", &self.placement_salary),
            "roiPie": roi,
            "research": series(&self.research),
            "alumni": pair_rows("category", &self.alumni),
            "infrastructure": infrastructure,
            "growth": series(&self.growth),
            "studentExperience": pair_rows("name", &self.student_experience),
        })
    }

    fn keyed_row(&self, key: &str, label: &str, left: Option<f64>, right: Option<f64>) -> Value {
        let mut object = Map::new();
        object.insert(key.to_string(), Value::from(label));
        if let Some(value) = left {
            object.insert(self.left_name.clone(), Value::from(value));
        }
        if let Some(value) = right {
            object.insert(self.right_name.clone(), Value::from(value));
        }
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indexmap::IndexMap;

    use super::*;
    use crate::dataset::Dataset;
    use crate::models::{ResearchPoint, SegmentValue};

    fn subject_map(entries: &[(&str, f64)]) -> SubjectMap<f64> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn research_point(year: &str, entries: &[(&str, f64)]) -> ResearchPoint {
        ResearchPoint {
            year: year.to_string(),
            values: subject_map(entries),
        }
    }

    fn metrics(roi_a: f64, roi_b: f64) -> EntityMetrics {
        EntityMetrics {
            placement_percent: subject_map(&[("A", 92.0), ("B", 88.0)]),
            avg_salary: subject_map(&[("A", 6.2), ("B", 6.0)]),
            highest_salary: subject_map(&[("A", 28.0), ("B", 25.0)]),
            roi: subject_map(&[("A", roi_a), ("B", roi_b)]),
            research: vec![
                research_point("2021", &[("A", 12.0), ("B", 15.0)]),
                research_point("2019", &[("A", 8.0), ("B", 10.0)]),
                research_point("2020", &[("A", 10.0)]),
            ],
            alumni_size: [("A".to_string(), 18000), ("B".to_string(), 25000)]
                .into_iter()
                .collect(),
            niche_areas: BTreeMap::new(),
            segments: BTreeMap::new(),
        }
    }

    #[test]
    fn placement_rows_read_each_side_from_its_own_record() {
        let left = metrics(72.0, 65.0);
        let mut right = metrics(72.0, 65.0);
        right.placement_percent.insert("B".to_string(), 50.0);
        right.avg_salary.insert("B".to_string(), 3.3);

        let charts = shape_comparison("A", "B", &left, &right);
        let labels: Vec<&str> = charts
            .placement_salary
            .iter()
            .map(|row| row.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Placement %", "Avg Salary", "Highest Salary"]);
        assert_eq!(charts.placement_salary[0].left, 92.0);
        assert_eq!(charts.placement_salary[0].right, 50.0);
        assert_eq!(charts.placement_salary[1].left, 6.2);
        assert_eq!(charts.placement_salary[1].right, 3.3);
        assert_eq!(charts.placement_salary[2].left, 28.0);
        assert_eq!(charts.placement_salary[2].right, 25.0);
    }

    #[test]
    fn roi_pie_has_one_slice_per_side() {
        let left = metrics(72.0, 65.0);
        let right = metrics(70.0, 61.0);
        let charts = shape_comparison("A", "B", &left, &right);
        assert_eq!(
            charts.roi_pie,
            vec![
                PieSlice { name: "A".to_string(), value: 72.0 },
                PieSlice { name: "B".to_string(), value: 61.0 },
            ]
        );
    }

    #[test]
    fn research_series_keeps_input_order_and_gaps() {
        let data = metrics(72.0, 65.0);
        let charts = shape_comparison("A", "B", &data, &data);
        let years: Vec<&str> = charts.research.iter().map(|p| p.year.as_str()).collect();
        assert_eq!(years, vec!["2021", "2019", "2020"]);
        assert_eq!(charts.research.len(), data.research.len());
        assert_eq!(charts.research[2].left, Some(10.0));
        assert_eq!(charts.research[2].right, None);
    }

    #[test]
    fn growth_applies_fixed_scale_and_offset() {
        let data = metrics(72.0, 65.0);
        let charts = shape_comparison("A", "B", &data, &data);
        let first = &charts.growth[0];
        assert!((first.left.unwrap() - 12.0 * 1.2).abs() < 1e-9);
        assert!((first.right.unwrap() - 15.0 * 1.15).abs() < 1e-9);
        let second = &charts.growth[1];
        assert!((second.left.unwrap() - (8.0 * 1.2 + 2.0)).abs() < 1e-9);
        assert!((second.right.unwrap() - (10.0 * 1.15 + 1.5)).abs() < 1e-9);
        assert_eq!(charts.growth[2].right, None);
    }

    #[test]
    fn alumni_is_reported_in_thousands() {
        let data = metrics(72.0, 65.0);
        let charts = shape_comparison("A", "B", &data, &data);
        assert_eq!(charts.alumni.len(), 1);
        assert_eq!(charts.alumni[0].left, 18.0);
        assert_eq!(charts.alumni[0].right, 25.0);
    }

    #[test]
    fn infrastructure_defaults_missing_and_text_values_to_zero() {
        let mut left = metrics(72.0, 65.0);
        let mut exposure = IndexMap::new();
        exposure.insert("MoUs".to_string(), SegmentValue::Number(45.0));
        exposure.insert(
            "International Partners".to_string(),
            SegmentValue::Text("several".to_string()),
        );
        left.segments
            .insert("Industry & Global Exposure".to_string(), exposure);
        let right = metrics(72.0, 65.0);

        let charts = shape_comparison("A", "B", &left, &right);
        let marks: Vec<f64> = charts.infrastructure.iter().map(|r| r.full_mark).collect();
        assert_eq!(marks, vec![80.0, 15.0, 40.0, 30.0]);
        assert_eq!(charts.infrastructure[0].left, 45.0);
        assert_eq!(charts.infrastructure[1].left, 0.0);
        assert!(charts.infrastructure.iter().all(|row| row.right == 0.0));
    }

    #[test]
    fn student_experience_is_constant() {
        let a = shape_comparison("A", "B", &metrics(1.0, 2.0), &metrics(3.0, 4.0));
        let b = shape_comparison("A", "B", &metrics(9.0, 8.0), &metrics(7.0, 6.0));
        assert_eq!(a.student_experience, b.student_experience);
        assert_eq!(a.student_experience[0].label, "Clubs & Activities");
        assert_eq!(a.student_experience[1].right, 90.0);
    }

    #[test]
    fn missing_metric_defaults_to_zero() {
        let left = metrics(72.0, 65.0);
        let charts = shape_comparison("A", "Unknown", &left, &left);
        assert_eq!(charts.placement_salary[0].right, 0.0);
        assert_eq!(charts.roi_pie[1].value, 0.0);
        assert_eq!(charts.alumni[0].right, 0.0);
    }

    #[test]
    fn chart_json_leaves_out_gap_keys() {
        let data = metrics(72.0, 65.0);
        let json = shape_comparison("A", "B", &data, &data).to_chart_json();

        let research_gap = json["research"][2].as_object().unwrap();
        assert_eq!(research_gap["year"], "2020");
        assert_eq!(research_gap["A"], 10.0);
        assert!(!research_gap.contains_key("B"));

        let growth_gap = json["growth"][2].as_object().unwrap();
        assert!(growth_gap.contains_key("A"));
        assert!(!growth_gap.contains_key("B"));

        assert!(json["research"][0].as_object().unwrap().contains_key("B"));
    }

    #[test]
    fn chart_json_is_keyed_by_display_name() {
        let dataset = Dataset::embedded().unwrap();
        let home = dataset.home().to_string();
        let rival = "PSG College of Technology";
        let left = dataset.entity(&home).unwrap();
        let right = dataset.entity(rival).unwrap();

        let json = shape_comparison(&home, rival, &left, &right).to_chart_json();
        let placement = &json["placementSalary"][0];
        assert_eq!(placement["name"], "Placement %");
        assert_eq!(placement[home.as_str()], 92.0);
        assert_eq!(placement[rival], 88.0);
        assert_eq!(json["alumni"][0]["category"], "Alumni Network");
        assert_eq!(json["infrastructure"][0]["fullMark"], 80.0);
        assert_eq!(json["infrastructure"][2][rival], 30.0);
        assert_eq!(json["research"].as_array().unwrap().len(), 5);
        assert_eq!(json["research"][0]["year"], "2019");
    }
}
