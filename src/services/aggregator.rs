/// Rep Aggregation
///
/// Folds per-rep metric scores into one overall score per metric: rounded
/// mean score, summary taken from the median rep, issue frames concatenated
/// in rep order.

use std::collections::BTreeMap;

use crate::models::{MetricKind, MetricScore, Rating, RepData};

/// Overall score for every metric present in the reps
pub fn aggregate(reps: &[RepData]) -> BTreeMap<MetricKind, MetricScore> {
    MetricKind::ALL
        .iter()
        .filter_map(|&kind| aggregate_metric(kind, reps).map(|score| (kind, score)))
        .collect()
}

/// Overall score for one metric, `None` if no rep carries it
pub fn aggregate_metric(kind: MetricKind, reps: &[RepData]) -> Option<MetricScore> {
    let scores: Vec<&MetricScore> = reps.iter().filter_map(|r| r.metric(kind)).collect();
    if scores.is_empty() {
        return None;
    }

    let total: u32 = scores.iter().map(|s| u32::from(s.score)).sum();
    let mean = f64::from(total) / scores.len() as f64;
    let score = crate::services::geometry::clamp_score(mean);

    let mut ranked = scores.clone();
    ranked.sort_by_key(|s| s.score);
    let median = ranked[(ranked.len() - 1) / 2];

    let mut summary = median.summary.clone();
    if scores.len() > 1 {
        let good = scores.iter().filter(|s| s.is_good()).count();
        summary.push_str(&format!(" ({good}/{} reps scored good)", scores.len()));
    }

    // Not deduplicated: shared boundary frames may appear twice
    let issue_frames = scores.iter().flat_map(|s| s.issue_frames.iter().copied()).collect();

    Some(MetricScore {
        score,
        rating: Rating::from_score(score),
        summary,
        issue_frames,
        confidence: median.confidence,
    })
}
