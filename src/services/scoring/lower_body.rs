//! Hip, knee and foot metrics: depth, knee tracking, knee valgus, knee
//! travel, heel rise and stance.

use super::bands::{InRange, LowerIsBetter};
use super::{peak, RepContext, INCHES_PER_UNIT, MIN_WIDTH, NEUTRAL_MISSING, NEUTRAL_UNOBSERVABLE};
use crate::models::{LandmarkIndex, MetricScore, PoseFrame};
use crate::services::geometry::angle_between;

/// Scored on `knee.y - hip.y`, so lower means deeper
const DEPTH: LowerIsBetter = LowerIsBetter::new(-0.05, 0.0, 0.05, 0.15);
const KNEE_TRACKING: LowerIsBetter = LowerIsBetter::new(0.0, 0.08, 0.12, 0.30);
const KNEE_TRACKING_ISSUE: f64 = 0.10;
const HEEL_RISE: LowerIsBetter = LowerIsBetter::new(0.0, 0.01, 0.025, 0.06);
const HEEL_RISE_ISSUE: f64 = 0.02;
const STANCE_WIDTH: InRange = InRange::new(1.2, 2.2, 0.3, 0.6);
const KNEE_VALGUS: LowerIsBetter = LowerIsBetter::new(0.0, 5.0, 10.0, 20.0);
const KNEE_VALGUS_ISSUE: f64 = 8.0;
const KNEE_TRAVEL: LowerIsBetter = LowerIsBetter::new(0.0, 2.0, 4.0, 8.0);
const KNEE_TRAVEL_ISSUE: f64 = 3.0;
const STANCE_SHIFT: LowerIsBetter = LowerIsBetter::new(0.0, 0.05, 0.10, 0.25);
const STANCE_SHIFT_ISSUE: f64 = 0.08;

const MIN_FOOT_LENGTH: f64 = 0.005;
const MIN_LEG_SPAN: f64 = 0.02;

/// (hip, knee, ankle, heel, foot index) per side
const LEGS: [[LandmarkIndex; 5]; 2] = [
    [
        LandmarkIndex::LeftHip,
        LandmarkIndex::LeftKnee,
        LandmarkIndex::LeftAnkle,
        LandmarkIndex::LeftHeel,
        LandmarkIndex::LeftFootIndex,
    ],
    [
        LandmarkIndex::RightHip,
        LandmarkIndex::RightKnee,
        LandmarkIndex::RightAnkle,
        LandmarkIndex::RightHeel,
        LandmarkIndex::RightFootIndex,
    ],
];

fn ankle_width(frame: &PoseFrame) -> f64 {
    (frame.landmark(LandmarkIndex::LeftAnkle).x - frame.landmark(LandmarkIndex::RightAnkle).x).abs()
}

fn hip_width(frame: &PoseFrame) -> f64 {
    (frame.landmark(LandmarkIndex::LeftHip).x - frame.landmark(LandmarkIndex::RightHip).x).abs()
}

pub fn depth(ctx: &RepContext<'_>) -> MetricScore {
    let bottom = ctx.bottom();
    let knee_y = (bottom.landmark(LandmarkIndex::LeftKnee).y + bottom.landmark(LandmarkIndex::RightKnee).y) / 2.0;
    let below_knee = bottom.hip_height() - knee_y;

    let summary = if below_knee >= 0.0 {
        format!("Hip crease reached {below_knee:.3} below the knee")
    } else if below_knee >= -0.05 {
        format!("Just above parallel, hip {:.3} above the knee", -below_knee)
    } else {
        format!("Squat stopped well above parallel, hip {:.3} above the knee", -below_knee)
    };

    let issues = if below_knee < 0.0 {
        vec![ctx.rep().bottom_frame]
    } else {
        Vec::new()
    };

    MetricScore::new(DEPTH.score(-below_knee), summary, issues)
}

pub fn knee_tracking(ctx: &RepContext<'_>) -> MetricScore {
    let start = ctx.start();
    let stance = ankle_width(start);
    if stance < MIN_WIDTH {
        return MetricScore::neutral(NEUTRAL_MISSING, "Feet overlap in this view; knee tracking not measurable");
    }

    let offset = |frame: &PoseFrame, leg: &[LandmarkIndex; 5]| frame.landmark(leg[1]).x - frame.landmark(leg[2]).x;
    let baseline = [offset(start, &LEGS[0]), offset(start, &LEGS[1])];

    let drift: Vec<(usize, f64)> = ctx
        .active_frames()
        .map(|(i, frame)| {
            let worst = LEGS
                .iter()
                .zip(baseline)
                .map(|(leg, base)| (offset(frame, leg) - base).abs() / stance)
                .fold(0.0, f64::max);
            (i, worst)
        })
        .collect();

    let issues = drift
        .iter()
        .filter(|(_, d)| *d > KNEE_TRACKING_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_drift = peak(drift).map_or(0.0, |(_, d)| d);

    let summary = if KNEE_TRACKING.is_good(max_drift) {
        format!("Knees stayed over the feet (max drift {:.0}% of stance)", max_drift * 100.0)
    } else {
        format!("Knees drifted {:.0}% of stance width off the feet", max_drift * 100.0)
    };

    MetricScore::new(KNEE_TRACKING.score(max_drift), summary, issues)
}

pub fn heel_rise(ctx: &RepContext<'_>) -> MetricScore {
    let Some(body_height) = ctx.body_height() else {
        return MetricScore::neutral(NEUTRAL_MISSING, "Body height not measurable; heel rise skipped");
    };

    let start = ctx.start();
    let heels = [LandmarkIndex::LeftHeel, LandmarkIndex::RightHeel];
    let rise: Vec<(usize, f64)> = ctx
        .rep_frames()
        .map(|(i, frame)| {
            let worst = heels
                .iter()
                .map(|&h| (start.landmark(h).y - frame.landmark(h).y) / body_height)
                .fold(0.0, f64::max);
            (i, worst)
        })
        .collect();

    let issues = rise
        .iter()
        .filter(|(_, r)| *r > HEEL_RISE_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_rise = peak(rise).map_or(0.0, |(_, r)| r);

    let summary = if HEEL_RISE.is_good(max_rise) {
        "Heels stayed planted".to_string()
    } else {
        format!("Heels lifted {:.1}% of body height", max_rise * 100.0)
    };

    MetricScore::new(HEEL_RISE.score(max_rise), summary, issues)
}

pub fn stance_width(ctx: &RepContext<'_>) -> MetricScore {
    let start = ctx.start();
    let hips = hip_width(start);
    if hips < MIN_WIDTH {
        return MetricScore::neutral(NEUTRAL_MISSING, "Hips overlap in this view; stance width not measurable");
    }

    let ratio = ankle_width(start) / hips;
    let (summary, issues) = if STANCE_WIDTH.contains(ratio) {
        (format!("Stance width {ratio:.2}x hip width"), Vec::new())
    } else if ratio < STANCE_WIDTH.low {
        (format!("Narrow stance, {ratio:.2}x hip width"), vec![ctx.rep().start_frame])
    } else {
        (format!("Wide stance, {ratio:.2}x hip width"), vec![ctx.rep().start_frame])
    };

    MetricScore::new(STANCE_WIDTH.score(ratio), summary, issues)
}

pub fn stance_width_shift(ctx: &RepContext<'_>) -> MetricScore {
    let initial = ankle_width(ctx.start());
    if initial < MIN_WIDTH {
        return MetricScore::neutral(NEUTRAL_MISSING, "Feet overlap in this view; stance shift not measurable");
    }

    let shift: Vec<(usize, f64)> = ctx
        .rep_frames()
        .map(|(i, frame)| (i, (ankle_width(frame) - initial).abs() / initial))
        .collect();

    let issues = shift
        .iter()
        .filter(|(_, s)| *s > STANCE_SHIFT_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_shift = peak(shift).map_or(0.0, |(_, s)| s);

    let summary = if STANCE_SHIFT.is_good(max_shift) {
        "Feet stayed put".to_string()
    } else {
        format!("Stance width changed {:.0}% during the rep", max_shift * 100.0)
    };

    MetricScore::new(STANCE_SHIFT.score(max_shift), summary, issues)
}

/// Inward knee angle at the ankle, 0 when the knee sits on or outside the hip-ankle line
fn valgus_angle(frame: &PoseFrame, leg: &[LandmarkIndex; 5]) -> Option<f64> {
    let hip = frame.landmark(leg[0]).point();
    let knee = frame.landmark(leg[1]).point();
    let ankle = frame.landmark(leg[2]).point();

    let span = ankle.y - hip.y;
    if span.abs() < MIN_LEG_SPAN {
        return None;
    }

    let midline = frame.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip).x;
    let t = (knee.y - hip.y) / span;
    let line_x = hip.x + (ankle.x - hip.x) * t;

    if (line_x - midline).abs() - (knee.x - midline).abs() <= 0.0 {
        return Some(0.0);
    }
    angle_between(knee, ankle, hip)
}

pub fn knee_valgus(ctx: &RepContext<'_>) -> MetricScore {
    let angles: Vec<(usize, f64)> = ctx
        .active_frames()
        .filter_map(|(i, frame)| {
            LEGS.iter()
                .filter_map(|leg| valgus_angle(frame, leg))
                .reduce(f64::max)
                .map(|a| (i, a))
        })
        .collect();

    if angles.is_empty() {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "Leg alignment not measurable in this rep");
    }

    let issues = angles
        .iter()
        .filter(|(_, a)| *a > KNEE_VALGUS_ISSUE)
        .map(|(i, _)| *i)
        .collect();
    let max_angle = peak(angles).map_or(0.0, |(_, a)| a);

    let summary = if KNEE_VALGUS.is_good(max_angle) {
        "No significant knee cave".to_string()
    } else {
        format!("Knees caved inward up to {max_angle:.0}°")
    };

    MetricScore::new(KNEE_VALGUS.score(max_angle), summary, issues)
}

pub fn knee_travel(ctx: &RepContext<'_>) -> MetricScore {
    let bottom = ctx.bottom();
    let travel = LEGS
        .iter()
        .filter_map(|leg| {
            let heel = bottom.landmark(leg[3]).x;
            let toe = bottom.landmark(leg[4]).x;
            let direction = toe - heel;
            if direction.abs() < MIN_FOOT_LENGTH {
                return None;
            }
            Some((bottom.landmark(leg[1]).x - toe) * direction.signum())
        })
        .reduce(f64::max);

    let Some(travel) = travel else {
        return MetricScore::neutral(NEUTRAL_UNOBSERVABLE, "Foot direction not visible from this angle");
    };

    let inches = travel.max(0.0) * INCHES_PER_UNIT;
    let (summary, issues) = if inches <= 0.0 {
        ("Knees stayed behind the toes".to_string(), Vec::new())
    } else if inches > KNEE_TRAVEL_ISSUE {
        (format!("Knees traveled {inches:.1} in past the toes"), vec![ctx.rep().bottom_frame])
    } else {
        (format!("Knees traveled {inches:.1} in past the toes"), Vec::new())
    };

    MetricScore::new(KNEE_TRAVEL.score(inches), summary, issues)
}
