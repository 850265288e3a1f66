/// Metric Confidence by Camera Angle
///
/// Sagittal-plane quantities (depth, trunk lean, bar path) need a side view;
/// frontal-plane quantities (knee cave, lateral shift, stance) need a front or
/// rear view. Timing-based metrics read well from anywhere.

use std::collections::BTreeMap;

use crate::models::{CameraAngle, Confidence, MetricKind, MetricScore, RepData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plane {
    Sagittal,
    Frontal,
    Timing,
    Vertical,
}

fn plane(kind: MetricKind) -> Plane {
    match kind {
        MetricKind::Depth
        | MetricKind::BackAngle
        | MetricKind::BarPath
        | MetricKind::ButtWink
        | MetricKind::KneeTravel
        | MetricKind::ThoracicRounding
        | MetricKind::HipRiseRate
        | MetricKind::HeadPosition
        | MetricKind::ReversalControl => Plane::Sagittal,
        MetricKind::KneeTracking
        | MetricKind::KneeValgus
        | MetricKind::Symmetry
        | MetricKind::StanceWidth
        | MetricKind::HipShift
        | MetricKind::StanceWidthShift => Plane::Frontal,
        MetricKind::Tempo => Plane::Timing,
        MetricKind::HeelRise | MetricKind::DepthConsistency => Plane::Vertical,
    }
}

/// How reliably `angle` shows the quantity behind `kind`
pub fn confidence_for(kind: MetricKind, angle: CameraAngle) -> Confidence {
    use CameraAngle::*;

    match (plane(kind), angle) {
        (_, Uncertain) => Confidence::Medium,
        (_, Diagonal) => Confidence::Medium,
        (Plane::Sagittal, LeftSide | RightSide) => Confidence::High,
        (Plane::Sagittal, Frontal | Rear) => Confidence::Low,
        (Plane::Frontal, Frontal | Rear) => Confidence::High,
        (Plane::Frontal, LeftSide | RightSide) => Confidence::Low,
        (Plane::Timing, _) => Confidence::High,
        (Plane::Vertical, LeftSide | RightSide) => Confidence::High,
        (Plane::Vertical, Frontal | Rear) => Confidence::Medium,
    }
}

/// Overwrite the confidence of every metric score with the table value
pub fn stamp_metrics(metrics: &mut BTreeMap<MetricKind, MetricScore>, angle: CameraAngle) {
    for (kind, score) in metrics.iter_mut() {
        score.confidence = confidence_for(*kind, angle);
    }
}

pub fn stamp_reps(reps: &mut [RepData], angle: CameraAngle) {
    for rep in reps {
        stamp_metrics(&mut rep.metrics, angle);
    }
}
