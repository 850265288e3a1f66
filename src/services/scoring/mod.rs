/// Metric Scoring Engine
///
/// Eighteen scorers, one per [`MetricKind`], each measuring a single physical
/// quantity inside one rep's frame window and mapping it onto a 0-100 score.
/// Scorers never fail: a quantity that cannot be measured yields a neutral
/// score with an explanatory summary.

pub mod bands;
mod lower_body;
mod movement;
mod upper_body;

use std::collections::BTreeMap;

use statrs::statistics::Statistics;

use crate::models::{DetectedRep, LandmarkIndex, MetricKind, MetricScore, PoseFrame};

/// Normalized image height assumed to span a 72-inch subject
pub const INCHES_PER_UNIT: f64 = 72.0;

/// Fraction of the standing-to-bottom descent a frame needs to be active
const ACTIVE_DESCENT_FRACTION: f64 = 0.25;

/// Body heights below this are treated as unmeasurable
const MIN_BODY_HEIGHT: f64 = 0.05;

/// Hip or stance widths below this cannot normalize a ratio
pub(crate) const MIN_WIDTH: f64 = 0.01;

/// Neutral score when a normalizing quantity vanishes
pub(crate) const NEUTRAL_MISSING: u8 = 50;

/// Neutral score when the rep or the view cannot show the quantity
pub(crate) const NEUTRAL_UNOBSERVABLE: u8 = 75;

/// One rep's window into the conditioned frame stream
#[derive(Debug, Clone)]
pub struct RepContext<'a> {
    frames: &'a [PoseFrame],
    rep: DetectedRep,
    body_height: Option<f64>,
    active: Vec<usize>,
}

impl<'a> RepContext<'a> {
    /// `rep` must lie inside `frames`; out-of-range bounds are clamped
    pub fn new(frames: &'a [PoseFrame], rep: DetectedRep) -> Self {
        let last = frames.len().saturating_sub(1);
        let end = rep.end_frame.min(last);
        let bottom = rep.bottom_frame.min(end);
        let start = rep.start_frame.min(bottom);
        let rep = DetectedRep::new(start, bottom, end);

        let body_height = frames
            .get(start)
            .map(PoseFrame::body_height)
            .filter(|h| *h >= MIN_BODY_HEIGHT);

        let active = active_frames(frames, rep);

        Self {
            frames,
            rep,
            body_height,
            active,
        }
    }

    pub fn rep(&self) -> DetectedRep {
        self.rep
    }

    pub fn frames(&self) -> &'a [PoseFrame] {
        self.frames
    }

    pub fn frame(&self, index: usize) -> &'a PoseFrame {
        &self.frames[index]
    }

    pub fn start(&self) -> &'a PoseFrame {
        self.frame(self.rep.start_frame)
    }

    pub fn bottom(&self) -> &'a PoseFrame {
        self.frame(self.rep.bottom_frame)
    }

    /// Body height at rep start, `None` if too small to normalize by
    pub fn body_height(&self) -> Option<f64> {
        self.body_height
    }

    /// Every frame of the rep with its absolute index
    pub fn rep_frames(&self) -> impl Iterator<Item = (usize, &'a PoseFrame)> + '_ {
        (self.rep.start_frame..=self.rep.end_frame).map(move |i| (i, self.frame(i)))
    }

    /// Frames from the bottom to the end of the rep
    pub fn ascent_frames(&self) -> impl Iterator<Item = (usize, &'a PoseFrame)> + '_ {
        (self.rep.bottom_frame..=self.rep.end_frame).map(move |i| (i, self.frame(i)))
    }

    /// Mid-movement frames, excluding setup and lockout
    pub fn active_frames(&self) -> impl Iterator<Item = (usize, &'a PoseFrame)> + '_ {
        self.active.iter().map(move |&i| (i, self.frame(i)))
    }

    pub fn duration(&self, from: usize, to: usize) -> f64 {
        self.frame(to).timestamp - self.frame(from).timestamp
    }
}

/// Frames whose hip has descended at least a quarter of the way to the bottom
fn active_frames(frames: &[PoseFrame], rep: DetectedRep) -> Vec<usize> {
    if frames.is_empty() {
        return Vec::new();
    }

    let standing = frames[rep.start_frame].hip_height();
    let depth = frames[rep.bottom_frame].hip_height() - standing;
    let all = rep.start_frame..=rep.end_frame;

    if depth <= f64::EPSILON {
        return all.collect();
    }

    let threshold = standing + ACTIVE_DESCENT_FRACTION * depth;
    all.filter(|&i| frames[i].hip_height() >= threshold).collect()
}

/// Score a single metric for one rep.
///
/// `all_reps` is only read by cross-rep metrics.
pub fn score_metric(kind: MetricKind, ctx: &RepContext<'_>, all_reps: &[DetectedRep]) -> MetricScore {
    match kind {
        MetricKind::Depth => lower_body::depth(ctx),
        MetricKind::KneeTracking => lower_body::knee_tracking(ctx),
        MetricKind::BackAngle => upper_body::back_angle(ctx),
        MetricKind::BarPath => upper_body::bar_path(ctx),
        MetricKind::Symmetry => movement::symmetry(ctx),
        MetricKind::ButtWink => upper_body::butt_wink(ctx),
        MetricKind::Tempo => movement::tempo(ctx),
        MetricKind::HeelRise => lower_body::heel_rise(ctx),
        MetricKind::StanceWidth => lower_body::stance_width(ctx),
        MetricKind::HipShift => movement::hip_shift(ctx),
        MetricKind::KneeValgus => lower_body::knee_valgus(ctx),
        MetricKind::KneeTravel => lower_body::knee_travel(ctx),
        MetricKind::DepthConsistency => depth_consistency(ctx.frames(), all_reps),
        MetricKind::ThoracicRounding => upper_body::thoracic_rounding(ctx),
        MetricKind::HipRiseRate => movement::hip_rise_rate(ctx),
        MetricKind::ReversalControl => movement::reversal_control(ctx),
        MetricKind::StanceWidthShift => lower_body::stance_width_shift(ctx),
        MetricKind::HeadPosition => upper_body::head_position(ctx),
    }
}

/// Score every per-rep metric. Cross-rep metrics are left to the caller.
pub fn score_rep(ctx: &RepContext<'_>) -> BTreeMap<MetricKind, MetricScore> {
    MetricKind::ALL
        .iter()
        .filter(|kind| !kind.is_cross_rep())
        .map(|&kind| (kind, score_metric(kind, ctx, &[])))
        .collect()
}

/// Coefficient of variation of bottom hip heights across all reps
pub fn depth_consistency(frames: &[PoseFrame], reps: &[DetectedRep]) -> MetricScore {
    movement::depth_consistency(frames, reps)
}

/// Trunk lean: mid-hip to mid-shoulder, degrees from vertical
pub(crate) fn trunk_angle(frame: &PoseFrame) -> f64 {
    crate::services::geometry::angle_from_vertical(
        frame.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
        frame.midpoint(LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
    )
}

/// Head lean: mid-shoulder to nose, degrees from vertical
pub(crate) fn head_angle(frame: &PoseFrame) -> f64 {
    crate::services::geometry::angle_from_vertical(
        frame.midpoint(LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
        frame.landmark(LandmarkIndex::Nose).point(),
    )
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.mean())
    }
}

pub(crate) fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.population_std_dev())
    }
}

/// Largest value and the index it came from
pub(crate) fn peak<I>(values: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    values
        .into_iter()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{Landmark, LandmarkIndex, PoseFrame, NUM_LANDMARKS};

    /// Frontal standing pose: 0.2 stance, 0.12 hip width, body height 0.6
    pub fn standing(timestamp: f64) -> PoseFrame {
        let mut landmarks = [Landmark::new(0.5, 0.5, 0.0, 0.9); NUM_LANDMARKS];
        let mut set = |idx: LandmarkIndex, x: f64, y: f64| {
            landmarks[idx as usize] = Landmark::new(x, y, 0.0, 0.9);
        };
        set(LandmarkIndex::Nose, 0.5, 0.18);
        set(LandmarkIndex::LeftShoulder, 0.375, 0.3);
        set(LandmarkIndex::RightShoulder, 0.625, 0.3);
        set(LandmarkIndex::LeftHip, 0.44, 0.5);
        set(LandmarkIndex::RightHip, 0.56, 0.5);
        set(LandmarkIndex::LeftKnee, 0.42, 0.7);
        set(LandmarkIndex::RightKnee, 0.58, 0.7);
        set(LandmarkIndex::LeftAnkle, 0.4, 0.9);
        set(LandmarkIndex::RightAnkle, 0.6, 0.9);
        set(LandmarkIndex::LeftHeel, 0.4, 0.91);
        set(LandmarkIndex::RightHeel, 0.6, 0.91);
        set(LandmarkIndex::LeftFootIndex, 0.4, 0.93);
        set(LandmarkIndex::RightFootIndex, 0.6, 0.93);
        PoseFrame::new(timestamp, landmarks)
    }

    /// Move hips and everything above them down by `drop`
    pub fn lowered(frame: &PoseFrame, drop: f64) -> PoseFrame {
        let mut frame = frame.clone();
        for idx in [
            LandmarkIndex::Nose,
            LandmarkIndex::LeftShoulder,
            LandmarkIndex::RightShoulder,
            LandmarkIndex::LeftHip,
            LandmarkIndex::RightHip,
        ] {
            frame.landmarks[idx as usize].y += drop;
        }
        frame
    }

    /// 31 frames at 30 fps: standing, sinusoidal descent to `depth`, standing
    pub fn squat_rep(depth: f64) -> Vec<PoseFrame> {
        (0..=30)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * i as f64 / 30.0;
                let drop = depth * (1.0 - phase.cos()) / 2.0;
                lowered(&standing(i as f64 / 30.0), drop)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::Rating;

    #[test]
    fn test_active_frames_exclude_standing() {
        let frames = squat_rep(0.25);
        let ctx = RepContext::new(&frames, DetectedRep::new(0, 15, 30));
        let active: Vec<usize> = ctx.active_frames().map(|(i, _)| i).collect();

        // 25% of the descent is reached at frames 5 and 25
        assert!((6..=24).all(|i| active.contains(&i)));
        assert!(!active.iter().any(|&i| i < 5 || i > 25));
    }

    #[test]
    fn test_flat_rep_is_fully_active() {
        let frames: Vec<PoseFrame> = (0..10).map(|i| standing(i as f64 / 30.0)).collect();
        let ctx = RepContext::new(&frames, DetectedRep::new(0, 0, 9));
        assert_eq!(ctx.active_frames().count(), 10);
    }

    #[test]
    fn test_context_clamps_bounds() {
        let frames = squat_rep(0.25);
        let ctx = RepContext::new(&frames, DetectedRep::new(0, 15, 99));
        assert_eq!(ctx.rep(), DetectedRep::new(0, 15, 30));
        assert!((ctx.body_height().unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_score_rep_covers_per_rep_metrics() {
        let frames = squat_rep(0.25);
        let ctx = RepContext::new(&frames, DetectedRep::new(0, 15, 30));
        let scores = score_rep(&ctx);

        assert_eq!(scores.len(), MetricKind::ALL.len() - 1);
        assert!(!scores.contains_key(&MetricKind::DepthConsistency));
        for (kind, score) in &scores {
            assert!(score.score <= 100, "{kind} out of range");
            assert_eq!(score.rating, Rating::from_score(score.score));
        }
    }

    #[test]
    fn test_clean_frontal_rep_scores_well() {
        let frames = squat_rep(0.25);
        let ctx = RepContext::new(&frames, DetectedRep::new(0, 15, 30));

        for kind in [
            MetricKind::Depth,
            MetricKind::KneeTracking,
            MetricKind::Symmetry,
            MetricKind::HeelRise,
            MetricKind::StanceWidthShift,
            MetricKind::HipShift,
        ] {
            let score = score_metric(kind, &ctx, &[]);
            assert_eq!(score.rating, Rating::Green, "{kind}: {}", score.summary);
        }
    }

    #[test]
    fn test_peak_picks_first_maximum() {
        assert_eq!(peak(vec![(3, 1.0), (4, 2.0), (5, 2.0)]), Some((4, 2.0)));
        assert_eq!(peak(Vec::<(usize, f64)>::new()), None);
    }
}
