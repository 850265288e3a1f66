//! Trunk, head and bar metrics. Mostly sagittal-plane quantities, best seen
//! from the side.

use super::bands::LowerIsBetter;
use super::{head_angle, mean, peak, population_std_dev, trunk_angle, RepContext, INCHES_PER_UNIT, NEUTRAL_UNOBSERVABLE};
use crate::models::{LandmarkIndex, MetricScore};

const BACK_ANGLE: LowerIsBetter = LowerIsBetter::new(0.0, 45.0, 60.0, 80.0);
const BACK_ANGLE_ISSUE: f64 = 55.0;
/// Trunk angle spread tolerated before the score is docked
const BACK_ANGLE_STD_ALLOWANCE: f64 = 8.0;
const BACK_ANGLE_STD_PENALTY: f64 = 1.5;

const BAR_PATH: LowerIsBetter = LowerIsBetter::new(0.0, 2.0, 4.0, 8.0);
const BAR_PATH_ISSUE: f64 = 3.0;

const BUTT_WINK: LowerIsBetter = LowerIsBetter::new(0.0, 5.0, 10.0, 20.0);
const BUTT_WINK_ISSUE_MARGIN: f64 = 8.0;

const THORACIC: LowerIsBetter = LowerIsBetter::new(0.0, 10.0, 20.0, 35.0);
const THORACIC_ISSUE: f64 = 15.0;

const HEAD_POSITION: LowerIsBetter = LowerIsBetter::new(0.0, 20.0, 35.0, 60.0);
const HEAD_POSITION_ISSUE: f64 = 35.0;

pub fn back_angle(ctx: &RepContext<'_>) -> MetricScore {
    let angles: Vec<(usize, f64)> = ctx.active_frames().map(|(i, f)| (i, trunk_angle(f))).collect();
    let values: Vec<f64> = angles.iter().map(|(_, a)| *a).collect();

    let (Some((_, max_angle)), Some(spread)) = (peak(angles.iter().copied()), population_std_dev(&values)) else {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "No active frames to measure torso angle");
    };

    let penalty = (spread - BACK_ANGLE_STD_ALLOWANCE).max(0.0) * BACK_ANGLE_STD_PENALTY;
    let issues = angles
        .iter()
        .filter(|(_, a)| *a > BACK_ANGLE_ISSUE)
        .map(|(i, _)| *i)
        .collect();

    let summary = if penalty > 0.0 {
        format!("Torso lean peaked at {max_angle:.0}° and varied by {spread:.0}° through the rep")
    } else if BACK_ANGLE.is_good(max_angle) {
        format!("Torso stayed upright (max {max_angle:.0}° from vertical)")
    } else {
        format!("Excessive forward lean, {max_angle:.0}° from vertical")
    };

    MetricScore::new(BACK_ANGLE.score(max_angle) - penalty, summary, issues)
}

pub fn bar_path(ctx: &RepContext<'_>) -> MetricScore {
    let shoulders = |i: usize| {
        ctx.frame(i)
            .midpoint(LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder)
            .x
    };
    let origin = shoulders(ctx.rep().start_frame);

    let drift: Vec<(usize, f64)> = ctx
        .rep_frames()
        .map(|(i, _)| (i, (shoulders(i) - origin).abs() * INCHES_PER_UNIT))
        .collect();

    let issues = drift
        .iter()
        .filter(|(_, d)| *d > BAR_PATH_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_drift = peak(drift).map_or(0.0, |(_, d)| d);

    let summary = if BAR_PATH.is_good(max_drift) {
        format!("Bar path stayed vertical (max drift {max_drift:.1} in)")
    } else {
        format!("Bar drifted {max_drift:.1} in horizontally")
    };

    MetricScore::new(BAR_PATH.score(max_drift), summary, issues)
}

pub fn butt_wink(ctx: &RepContext<'_>) -> MetricScore {
    let rep = ctx.rep();
    if rep.bottom_frame < rep.start_frame + 6 {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "Descent too short to assess pelvic tuck");
    }

    let approach_start = rep.bottom_frame.saturating_sub(10).max(rep.start_frame);
    let approach: Vec<f64> = (approach_start..rep.bottom_frame - 5)
        .map(|i| trunk_angle(ctx.frame(i)))
        .collect();
    let Some(approach_angle) = mean(&approach) else {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "Descent too short to assess pelvic tuck");
    };

    let window_start = rep.bottom_frame.saturating_sub(2).max(rep.start_frame);
    let window_end = (rep.bottom_frame + 2).min(rep.end_frame);
    let bottom: Vec<(usize, f64)> = (window_start..=window_end)
        .map(|i| (i, trunk_angle(ctx.frame(i))))
        .collect();

    let issues = bottom
        .iter()
        .filter(|(_, a)| *a > approach_angle + BUTT_WINK_ISSUE_MARGIN)
        .map(|(i, _)| *i)
        .collect();
    let increase = peak(bottom).map_or(0.0, |(_, a)| (a - approach_angle).max(0.0));

    let summary = if BUTT_WINK.is_good(increase) {
        "Pelvis stayed neutral at the bottom".to_string()
    } else {
        format!("Lower back rounded {increase:.0}° at the bottom")
    };

    MetricScore::new(BUTT_WINK.score(increase), summary, issues)
}

pub fn thoracic_rounding(ctx: &RepContext<'_>) -> MetricScore {
    let excess: Vec<(usize, f64)> = ctx
        .active_frames()
        .map(|(i, f)| (i, (head_angle(f) - trunk_angle(f)).max(0.0)))
        .collect();

    let issues = excess
        .iter()
        .filter(|(_, e)| *e > THORACIC_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_excess = peak(excess).map_or(0.0, |(_, e)| e);

    let summary = if THORACIC.is_good(max_excess) {
        "Upper back stayed extended".to_string()
    } else {
        format!("Upper back rounded {max_excess:.0}° beyond the torso line")
    };

    MetricScore::new(THORACIC.score(max_excess), summary, issues)
}

pub fn head_position(ctx: &RepContext<'_>) -> MetricScore {
    let angles: Vec<(usize, f64)> = ctx.active_frames().map(|(i, f)| (i, head_angle(f))).collect();
    let values: Vec<f64> = angles.iter().map(|(_, a)| *a).collect();

    let Some(average) = mean(&values) else {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "No active frames to measure head position");
    };

    let issues = angles
        .iter()
        .filter(|(_, a)| *a > HEAD_POSITION_ISSUE)
        .map(|(i, _)| *i)
        .collect();

    let summary = if HEAD_POSITION.is_good(average) {
        "Neutral head position".to_string()
    } else {
        format!("Head tilted {average:.0}° off the torso on average")
    };

    MetricScore::new(HEAD_POSITION.score(average), summary, issues)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::{DetectedRep, PoseFrame, Rating};

    fn ctx(frames: &[PoseFrame]) -> RepContext<'_> {
        RepContext::new(frames, DetectedRep::new(0, 15, 30))
    }

    /// Shift shoulders and nose sideways by `dx`, tilting the trunk
    fn lean(frame: &mut PoseFrame, dx: f64) {
        for idx in [LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder, LandmarkIndex::Nose] {
            frame.landmarks[idx as usize].x += dx;
        }
    }

    #[test]
    fn test_upright_rep() {
        let frames = squat_rep(0.25);
        let ctx = ctx(&frames);
        assert_eq!(back_angle(&ctx).score, 100);
        assert_eq!(bar_path(&ctx).score, 100);
        assert_eq!(butt_wink(&ctx).score, 100);
        assert_eq!(thoracic_rounding(&ctx).score, 100);
        assert_eq!(head_position(&ctx).score, 100);
    }

    #[test]
    fn test_forward_lean_at_bottom() {
        let mut frames = squat_rep(0.25);
        // Trunk height is 0.2, so 0.2 sideways is 45°, 0.35 is ~60°
        for (i, frame) in frames.iter_mut().enumerate() {
            let t = 1.0 - ((i as f64 - 15.0).abs() / 15.0);
            lean(frame, 0.35 * t);
        }
        let score = back_angle(&ctx(&frames));
        assert_eq!(score.rating, Rating::Red);
        assert!(score.issue_frames.contains(&15));
    }

    #[test]
    fn test_bar_drift_in_inches() {
        let mut frames = squat_rep(0.25);
        // 0.05 * 72 = 3.6 in
        for frame in &mut frames[14..=16] {
            lean(frame, 0.05);
        }
        let score = bar_path(&ctx(&frames));
        assert_eq!(score.rating, Rating::Yellow);
        assert_eq!(score.issue_frames, vec![14, 15, 16]);
    }

    #[test]
    fn test_butt_wink_measures_bottom_increase() {
        let mut frames = squat_rep(0.25);
        for frame in &mut frames[13..=17] {
            lean(frame, 0.1);
        }
        let score = butt_wink(&ctx(&frames));
        // atan(0.1 / 0.2) ≈ 26.6°
        assert_eq!(score.rating, Rating::Red);
        assert_eq!(score.issue_frames, vec![13, 14, 15, 16, 17]);
    }

    #[test]
    fn test_butt_wink_short_descent_is_neutral() {
        let frames = squat_rep(0.25);
        let ctx = RepContext::new(&frames, DetectedRep::new(12, 15, 30));
        assert_eq!(butt_wink(&ctx).score, NEUTRAL_UNOBSERVABLE);
    }

    #[test]
    fn test_head_dropped_forward() {
        let mut frames = squat_rep(0.25);
        for frame in &mut frames {
            // Nose level with the shoulders
            frame.landmarks[LandmarkIndex::Nose as usize].x += 0.12;
            frame.landmarks[LandmarkIndex::Nose as usize].y += 0.12;
        }
        let ctx = ctx(&frames);
        let head = head_position(&ctx);
        assert_eq!(head.rating, Rating::Red);
        assert!(!head.issue_frames.is_empty());
        assert_eq!(thoracic_rounding(&ctx).rating, Rating::Red);
    }
}
