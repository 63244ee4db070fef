use crate::models::{EntityMetrics, Recommendation, Tone};

/// Niche areas quoted in a marketing recommendation.
const NICHE_AREAS_SHOWN: usize = 2;

/// Builds the ROI, alumni and niche recommendations, in that order, for
/// `left_name` against `right_name` using `data` as seen from the left side.
pub fn recommend(left_name: &str, right_name: &str, data: &EntityMetrics) -> Vec<Recommendation> {
    let mut recs = Vec::with_capacity(3);

    let roi_left = data.roi.get(left_name);
    let roi_right = data.roi.get(right_name);
    if matches!((roi_left, roi_right), (Some(l), Some(r)) if l > r) {
        recs.push(Recommendation {
            title: "ROI Advantage".to_string(),
            text: format!(
                "{left_name} shows a stronger ROI vs {right_name}. Highlight value-for-money in campaigns."
            ),
            tone: Tone::Success,
        });
    } else {
        recs.push(Recommendation {
            title: "ROI Warning".to_string(),
            text: format!(
                "{right_name} has higher ROI. Consider fine-tuning programs or scholarships to improve ROI perception."
            ),
            tone: Tone::Warning,
        });
    }

    let alumni_left = data.alumni_size.get(left_name);
    let alumni_right = data.alumni_size.get(right_name);
    if matches!((alumni_left, alumni_right), (Some(l), Some(r)) if l < r) {
        recs.push(Recommendation {
            title: "Alumni Gap".to_string(),
            text: format!(
                "Alumni base of {left_name} is smaller than {right_name}. Activate alumni storytelling & referral programs."
            ),
            tone: Tone::Info,
        });
    } else {
        recs.push(Recommendation {
            title: "Alumni Strength".to_string(),
            text: "Leverage alumni successes as case studies and for mentorship programs.".to_string(),
            tone: Tone::Success,
        });
    }

    if let Some(areas) = data.niche_areas.get(left_name).filter(|areas| !areas.is_empty()) {
        let shown = areas
            .iter()
            .take(NICHE_AREAS_SHOWN)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        recs.push(Recommendation {
            title: "Niche Marketing".to_string(),
            text: format!(
                "Promote {shown} as signature offerings to differentiate from {right_name}."
            ),
            tone: Tone::Info,
        });
    }

    tracing::debug!(
        left = left_name,
        right = right_name,
        count = recs.len(),
        "recommendations built"
    );
    recs
}
