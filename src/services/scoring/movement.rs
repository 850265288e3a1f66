//! Whole-body movement metrics: symmetry, tempo, hip shift, hip rise rate,
//! reversal control and cross-rep depth consistency.

use super::bands::{InRange, LowerIsBetter};
use super::{mean, peak, population_std_dev, RepContext, MIN_WIDTH, NEUTRAL_MISSING, NEUTRAL_UNOBSERVABLE};
use crate::models::{DetectedRep, LandmarkIndex, MetricScore, PoseFrame};
use crate::services::geometry::angle_between;

const SYMMETRY: LowerIsBetter = LowerIsBetter::new(0.0, 1.0, 2.0, 4.0);
const SYMMETRY_ISSUE: f64 = 1.5;
/// Height differences are measured in units of 5% body height
const SYMMETRY_HEIGHT_UNIT: f64 = 0.05;
const SYMMETRY_ANGLE_UNIT: f64 = 15.0;

const TEMPO: InRange = InRange::new(0.8, 2.5, 0.5, 1.0);
const MIN_ECCENTRIC_SECONDS: f64 = 0.4;
const RUSHED_DESCENT_PENALTY: f64 = 15.0;

const HIP_SHIFT: LowerIsBetter = LowerIsBetter::new(0.0, 0.05, 0.10, 0.25);
const HIP_SHIFT_ISSUE: f64 = 0.08;

const HIP_RISE: LowerIsBetter = LowerIsBetter::new(1.0, 1.2, 1.6, 2.5);
const HIP_RISE_ISSUE: f64 = 1.4;
const HIP_RISE_CHUNK: usize = 3;
const MIN_SHOULDER_RISE: f64 = 0.002;

const REVERSAL: LowerIsBetter = LowerIsBetter::new(0.0, 1.0, 2.0, 4.0);
const REVERSAL_ISSUE: f64 = 1.5;
const REVERSAL_SPAN: usize = 3;

const DEPTH_CONSISTENCY: LowerIsBetter = LowerIsBetter::new(0.0, 0.02, 0.05, 0.15);
const DEPTH_DEVIATION_ISSUE: f64 = 0.03;

fn knee_angle(frame: &PoseFrame, hip: LandmarkIndex, knee: LandmarkIndex, ankle: LandmarkIndex) -> Option<f64> {
    angle_between(
        frame.landmark(hip).point(),
        frame.landmark(knee).point(),
        frame.landmark(ankle).point(),
    )
}

pub fn symmetry(ctx: &RepContext<'_>) -> MetricScore {
    let Some(body_height) = ctx.body_height() else {
        return MetricScore::neutral(NEUTRAL_MISSING, "Body height not measurable; symmetry skipped");
    };

    let bottom = ctx.bottom();
    let unit = SYMMETRY_HEIGHT_UNIT * body_height;
    let height_gap = |a: LandmarkIndex, b: LandmarkIndex| (bottom.landmark(a).y - bottom.landmark(b).y).abs() / unit;

    let hips = height_gap(LandmarkIndex::LeftHip, LandmarkIndex::RightHip);
    let shoulders = height_gap(LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder);
    let knees = match (
        knee_angle(bottom, LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
        knee_angle(bottom, LandmarkIndex::RightHip, LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    ) {
        (Some(left), Some(right)) => (left - right).abs() / SYMMETRY_ANGLE_UNIT,
        _ => 0.0,
    };

    let index = hips.max(shoulders).max(knees);
    let issues = if index > SYMMETRY_ISSUE {
        vec![ctx.rep().bottom_frame]
    } else {
        Vec::new()
    };

    let summary = if SYMMETRY.is_good(index) {
        "Left and right sides moved evenly".to_string()
    } else if hips >= shoulders && hips >= knees {
        "Hips uneven at the bottom".to_string()
    } else if shoulders >= knees {
        "Shoulders uneven at the bottom".to_string()
    } else {
        "Knees bent unevenly at the bottom".to_string()
    };

    MetricScore::new(SYMMETRY.score(index), summary, issues)
}

pub fn tempo(ctx: &RepContext<'_>) -> MetricScore {
    let rep = ctx.rep();
    let eccentric = ctx.duration(rep.start_frame, rep.bottom_frame);
    let concentric = ctx.duration(rep.bottom_frame, rep.end_frame);
    if eccentric <= 0.0 || concentric <= 0.0 {
        return MetricScore::neutral(NEUTRAL_MISSING, "Could not split the rep into descent and ascent");
    }

    let ratio = eccentric / concentric;
    let rushed = eccentric < MIN_ECCENTRIC_SECONDS;
    let penalty = if rushed { RUSHED_DESCENT_PENALTY } else { 0.0 };

    let issues = if TEMPO.contains(ratio) {
        Vec::new()
    } else {
        vec![rep.bottom_frame]
    };

    let mut summary = format!("Descent {eccentric:.2}s, ascent {concentric:.2}s (ratio {ratio:.2})");
    if rushed {
        summary.push_str(", descent rushed");
    }

    MetricScore::new(TEMPO.score(ratio) - penalty, summary, issues)
}

pub fn hip_shift(ctx: &RepContext<'_>) -> MetricScore {
    let start = ctx.start();
    let stance = (start.landmark(LandmarkIndex::LeftAnkle).x - start.landmark(LandmarkIndex::RightAnkle).x).abs();
    if stance < MIN_WIDTH {
        return MetricScore::neutral(NEUTRAL_MISSING, "Feet overlap in this view; hip shift not measurable");
    }

    let hip_x = |frame: &PoseFrame| frame.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip).x;
    let at_bottom = hip_x(ctx.bottom());

    let shift: Vec<(usize, f64)> = ctx
        .ascent_frames()
        .map(|(i, frame)| (i, (hip_x(frame) - at_bottom).abs() / stance))
        .collect();

    let issues = shift
        .iter()
        .filter(|(_, s)| *s > HIP_SHIFT_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_shift = peak(shift).map_or(0.0, |(_, s)| s);

    let summary = if HIP_SHIFT.is_good(max_shift) {
        "Hips stayed centred on the way up".to_string()
    } else {
        format!("Hips shifted {:.0}% of stance width on the way up", max_shift * 100.0)
    };

    MetricScore::new(HIP_SHIFT.score(max_shift), summary, issues)
}

pub fn hip_rise_rate(ctx: &RepContext<'_>) -> MetricScore {
    let rep = ctx.rep();
    let shoulder_y = |i: usize| {
        ctx.frame(i)
            .midpoint(LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder)
            .y
    };
    let hip_y = |i: usize| ctx.frame(i).hip_height();

    let ratios: Vec<(usize, f64)> = (rep.bottom_frame..rep.end_frame)
        .step_by(HIP_RISE_CHUNK)
        .filter_map(|i| {
            let j = (i + HIP_RISE_CHUNK).min(rep.end_frame);
            let shoulder_rise = shoulder_y(i) - shoulder_y(j);
            if shoulder_rise <= MIN_SHOULDER_RISE {
                return None;
            }
            Some((i, (hip_y(i) - hip_y(j)) / shoulder_rise))
        })
        .collect();

    if ratios.is_empty() {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "Ascent too short to compare hip and shoulder rise");
    }

    let issues = ratios
        .iter()
        .filter(|(_, r)| *r > HIP_RISE_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_ratio = peak(ratios).map_or(0.0, |(_, r)| r);

    let summary = if HIP_RISE.is_good(max_ratio) {
        "Hips and shoulders rose together".to_string()
    } else {
        format!("Hips rose {max_ratio:.1}x faster than the shoulders")
    };

    MetricScore::new(HIP_RISE.score(max_ratio), summary, issues)
}

/// Mean vertical hip velocity over consecutive frame pairs in `range`
fn mean_hip_velocity(ctx: &RepContext<'_>, range: std::ops::Range<usize>) -> Option<f64> {
    let velocities: Vec<f64> = range
        .filter_map(|k| {
            let dt = ctx.duration(k, k + 1);
            (dt > 0.0).then(|| (ctx.frame(k + 1).hip_height() - ctx.frame(k).hip_height()) / dt)
        })
        .collect();
    mean(&velocities)
}

pub fn reversal_control(ctx: &RepContext<'_>) -> MetricScore {
    let rep = ctx.rep();
    if rep.bottom_frame < rep.start_frame + REVERSAL_SPAN || rep.end_frame < rep.bottom_frame + REVERSAL_SPAN {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "Too few frames around the bottom to assess the reversal");
    }
    let Some(body_height) = ctx.body_height() else {
        return MetricScore::neutral(NEUTRAL_MISSING, "Body height not measurable; reversal skipped");
    };

    let before = mean_hip_velocity(ctx, rep.bottom_frame - REVERSAL_SPAN..rep.bottom_frame);
    let after = mean_hip_velocity(ctx, rep.bottom_frame..rep.bottom_frame + REVERSAL_SPAN);
    let (Some(before), Some(after)) = (before, after) else {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "Frame timing too irregular to assess the reversal");
    };

    let change = (after - before).abs() / body_height;
    let issues = if change > REVERSAL_ISSUE {
        vec![rep.bottom_frame]
    } else {
        Vec::new()
    };

    let summary = if REVERSAL.is_good(change) {
        "Controlled turnaround at the bottom".to_string()
    } else {
        format!("Abrupt bounce out of the bottom ({change:.1} body heights/s)")
    };

    MetricScore::new(REVERSAL.score(change), summary, issues)
}

/// Cross-rep: coefficient of variation of bottom hip heights
pub fn depth_consistency(frames: &[PoseFrame], reps: &[DetectedRep]) -> MetricScore {
    if reps.len() < 2 {
        return MetricScore::new(100.0, "Single rep, depth consistency not applicable", Vec::new());
    }

    let bottoms: Vec<(usize, f64)> = reps
        .iter()
        .filter_map(|r| frames.get(r.bottom_frame).map(|f| (r.bottom_frame, f.hip_height())))
        .collect();
    let depths: Vec<f64> = bottoms.iter().map(|(_, d)| *d).collect();

    let (Some(average), Some(spread)) = (mean(&depths), population_std_dev(&depths)) else {
        return MetricScore::neutral(NEUTRAL_MISSING, "Rep bottoms not available");
    };
    if average.abs() < f64::EPSILON {
        return MetricScore::neutral(NEUTRAL_MISSING, "Rep bottoms not measurable");
    }

    let cv = spread / average;
    let issues = bottoms
        .iter()
        .filter(|(_, d)| (d - average).abs() > DEPTH_DEVIATION_ISSUE)
        .map(|(i, _)| *i)
        .collect();

    let summary = if DEPTH_CONSISTENCY.is_good(cv) {
        format!("Consistent depth across {} reps", reps.len())
    } else {
        format!("Depth varied across reps (CV {:.1}%)", cv * 100.0)
    };

    MetricScore::new(DEPTH_CONSISTENCY.score(cv), summary, issues)
}
