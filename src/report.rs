use std::fmt::Write;

use chrono::NaiveDate;

use crate::compare::{ComparisonCharts, PairRow, SeriesPoint};
use crate::models::{AnalysisReport, Recommendation, SegmentCategory};
use crate::segments::{self, SegmentCard};

pub struct ReportInput<'a> {
    pub charts: &'a ComparisonCharts,
    pub recommendations: &'a [Recommendation],
    pub home_cards: &'a [SegmentCard],
    pub analysis: Option<&'a AnalysisReport>,
    pub top_n: usize,
    pub generated_on: NaiveDate,
}

pub fn build_report(input: &ReportInput<'_>) -> String {
    let mut output = String::new();
    let charts = input.charts;

    let _ = writeln!(output, "# Competitive Insights Report");
    let _ = writeln!(
        output,
        "{} compared with {} (generated {})",
        charts.left_name, charts.right_name, input.generated_on
    );
    let _ = writeln!(output);

    output.push_str(&comparison_markdown(charts));

    let _ = writeln!(output);
    output.push_str(&recommendations_markdown(input.recommendations));

    let _ = writeln!(output);
    let _ = writeln!(output, "## {} Profile", charts.left_name);
    if input.home_cards.is_empty() {
        let _ = writeln!(output, "No profile segments recorded.");
    }
    for card in input.home_cards {
        let _ = writeln!(output);
        let _ = writeln!(output, "### {}", card.title);
        for (name, value) in &card.details {
            let _ = writeln!(output, "- {name}: {value}");
        }
    }

    if let Some(analysis) = input.analysis {
        let _ = writeln!(output);
        output.push_str(&segmentation_markdown(analysis, input.top_n));
    }

    output
}

pub fn comparison_markdown(charts: &ComparisonCharts) -> String {
    let mut output = String::new();
    let left = &charts.left_name;
    let right = &charts.right_name;

    let _ = writeln!(output, "## Career & Placement");
    write_pair_table(&mut output, "Metric", left, right, &charts.placement_salary);

    let _ = writeln!(output);
    let _ = writeln!(output, "ROI share:");
    for slice in &charts.roi_pie {
        let _ = writeln!(output, "- {}: {:.1}", slice.name, slice.value);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Research Output");
    write_series_table(&mut output, left, right, &charts.research);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Growth Trajectory");
    write_series_table(&mut output, left, right, &charts.growth);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Infrastructure & Partnerships");
    let _ = writeln!(output, "| Dimension | {left} | {right} | Full mark |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    for row in &charts.infrastructure {
        let _ = writeln!(
            output,
            "| {} | {:.0} | {:.0} | {:.0} |",
            row.subject, row.left, row.right, row.full_mark
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Student Experience & Network");
    write_pair_table(&mut output, "Metric", left, right, &charts.student_experience);
    let _ = writeln!(output);
    let _ = writeln!(output, "Alumni network (thousands):");
    write_pair_table(&mut output, "Network", left, right, &charts.alumni);

    output
}

pub fn recommendations_markdown(recommendations: &[Recommendation]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Recommendations");
    if recommendations.is_empty() {
        let _ = writeln!(output, "No recommendations for this pairing.");
    }
    for rec in recommendations {
        let _ = writeln!(output, "- **{}** ({}): {}", rec.title, rec.tone, rec.text);
    }
    output
}

pub fn segmentation_markdown(analysis: &AnalysisReport, top_n: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Student Segmentation");
    let _ = writeln!(
        output,
        "{} students across {} segments",
        analysis.total_students, analysis.segments_created
    );

    for category in SegmentCategory::ALL {
        let summary = segments::summarize(category, analysis.buckets(category), top_n);
        let _ = writeln!(output);
        let _ = writeln!(output, "### {}", summary.category);

        if summary.chart.is_empty() {
            let _ = writeln!(output, "No students in this category.");
            continue;
        }

        for tuple in &summary.chart {
            let _ = writeln!(
                output,
                "- {}: {} students ({:.1}%) {}",
                tuple.name,
                tuple.value,
                tuple.percentage,
                tuple.color.as_deref().unwrap_or_default()
            );
        }
        let top: Vec<&str> = summary.top.iter().map(|b| b.name.as_str()).collect();
        let _ = writeln!(output, "Top {}: {}", top.len(), top.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Insights");
    if analysis.insights.is_empty() {
        let _ = writeln!(output, "No insights for this data set.");
    }
    for insight in &analysis.insights {
        let _ = writeln!(
            output,
            "- {} **{}**: {}",
            insight.icon, insight.title, insight.description
        );
    }

    output
}

fn write_pair_table(output: &mut String, heading: &str, left: &str, right: &str, rows: &[PairRow]) {
    let _ = writeln!(output, "| {heading} | {left} | {right} |");
    let _ = writeln!(output, "| --- | --- | --- |");
    for row in rows {
        let _ = writeln!(output, "| {} | {:.1} | {:.1} |", row.label, row.left, row.right);
    }
}

fn write_series_table(output: &mut String, left: &str, right: &str, points: &[SeriesPoint]) {
    let _ = writeln!(output, "| Year | {left} | {right} |");
    let _ = writeln!(output, "| --- | --- | --- |");
    for point in points {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            point.year,
            format_gap(point.left),
            format_gap(point.right)
        );
    }
}

fn format_gap(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"))
}
