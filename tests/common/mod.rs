// Synthetic landmark streams shared by the integration tests
#![allow(dead_code)]

use std::f64::consts::PI;

use squat_coach::models::{Landmark, LandmarkIndex, PoseFrame, NUM_LANDMARKS};

pub const FPS: f64 = 30.0;
pub const FRAMES_PER_REP: usize = 30;
pub const STANCE_WIDTH: f64 = 0.2;
const VISIBILITY: f64 = 0.9;

/// Horizontal knee offsets toward the midline, per leg
#[derive(Debug, Clone, Copy, Default)]
pub struct KneeDrift {
    pub left: f64,
    pub right: f64,
}

/// Frontal-view pose with the hips at `hip_y`
pub fn squat_frame(timestamp: f64, hip_y: f64, drift: KneeDrift) -> PoseFrame {
    let mut landmarks = [Landmark::new(0.5, 0.5, 0.0, VISIBILITY); NUM_LANDMARKS];
    let mut set = |idx: LandmarkIndex, x: f64, y: f64| {
        landmarks[idx as usize] = Landmark::new(x, y, 0.0, VISIBILITY);
    };

    let shoulder_y = hip_y - 0.22;
    let nose_y = shoulder_y - 0.12;
    for idx in LandmarkIndex::FACE {
        set(idx, 0.5, nose_y);
    }

    set(LandmarkIndex::LeftShoulder, 0.375, shoulder_y);
    set(LandmarkIndex::RightShoulder, 0.625, shoulder_y);
    // Hands on the bar beside the shoulders
    set(LandmarkIndex::LeftElbow, 0.34, shoulder_y + 0.06);
    set(LandmarkIndex::RightElbow, 0.66, shoulder_y + 0.06);
    for idx in [
        LandmarkIndex::LeftWrist,
        LandmarkIndex::LeftPinky,
        LandmarkIndex::LeftIndex,
        LandmarkIndex::LeftThumb,
    ] {
        set(idx, 0.33, shoulder_y - 0.01);
    }
    for idx in [
        LandmarkIndex::RightWrist,
        LandmarkIndex::RightPinky,
        LandmarkIndex::RightIndex,
        LandmarkIndex::RightThumb,
    ] {
        set(idx, 0.67, shoulder_y - 0.01);
    }

    set(LandmarkIndex::LeftHip, 0.44, hip_y);
    set(LandmarkIndex::RightHip, 0.56, hip_y);
    set(LandmarkIndex::LeftKnee, 0.42 + drift.left, 0.62);
    set(LandmarkIndex::RightKnee, 0.58 - drift.right, 0.62);
    set(LandmarkIndex::LeftAnkle, 0.4, 0.9);
    set(LandmarkIndex::RightAnkle, 0.6, 0.9);
    set(LandmarkIndex::LeftHeel, 0.4, 0.91);
    set(LandmarkIndex::RightHeel, 0.6, 0.91);
    set(LandmarkIndex::LeftFootIndex, 0.4, 0.93);
    set(LandmarkIndex::RightFootIndex, 0.6, 0.93);

    PoseFrame::new(timestamp, landmarks)
}

/// Hip height oscillating between 0.5 (standing) and 0.75 (bottom)
pub fn hip_height(i: usize) -> f64 {
    0.625 - 0.125 * (2.0 * PI * i as f64 / FRAMES_PER_REP as f64).cos()
}

/// Knee drift of 4% of stance width, peaking at each rep's bottom
fn clean_drift(i: usize) -> KneeDrift {
    let s = (PI * (i % FRAMES_PER_REP) as f64 / FRAMES_PER_REP as f64).sin().powi(2);
    let d = 0.04 * STANCE_WIDTH * s;
    KneeDrift { left: d, right: d }
}

/// Clean 30 fps squats, 30 frames per rep
pub fn squat_clip(reps: usize) -> Vec<PoseFrame> {
    (0..reps * FRAMES_PER_REP)
        .map(|i| squat_frame(i as f64 / FPS, hip_height(i), clean_drift(i)))
        .collect()
}

/// Same as [`squat_clip`] but the left knee caves 15% of stance width
/// through the middle of rep `fault_rep` (0-based)
pub fn squat_clip_with_knee_fault(reps: usize, fault_rep: usize) -> Vec<PoseFrame> {
    let fault_start = fault_rep * FRAMES_PER_REP;
    (0..reps * FRAMES_PER_REP)
        .map(|i| {
            let mut drift = clean_drift(i);
            drift.left += knee_fault(i, fault_start);
            squat_frame(i as f64 / FPS, hip_height(i), drift)
        })
        .collect()
}

/// Held from 3 frames into the rep, released before the next rep begins
fn knee_fault(i: usize, rep_start: usize) -> f64 {
    let amount = 0.15 * STANCE_WIDTH;
    let hold = rep_start + 3..=rep_start + 18;
    let release = rep_start + 18..rep_start + 22;

    if hold.contains(&i) {
        amount
    } else if release.contains(&i) {
        amount * (rep_start + 22 - i) as f64 / 4.0
    } else {
        0.0
    }
}

/// Standing still for `count` frames starting at `start_time`
pub fn standing_frames(count: usize, start_time: f64) -> Vec<PoseFrame> {
    (0..count)
        .map(|i| squat_frame(start_time + i as f64 / FPS, 0.5, KneeDrift::default()))
        .collect()
}

/// Surround a clip with `pad` standing frames on each side, retiming everything
pub fn padded(clip: &[PoseFrame], pad: usize) -> Vec<PoseFrame> {
    let mut frames = standing_frames(pad, 0.0);
    frames.extend(clip.iter().cloned());
    frames.extend(standing_frames(pad, 0.0));
    for (i, frame) in frames.iter_mut().enumerate() {
        frame.timestamp = i as f64 / FPS;
    }
    frames
}

/// Hip height barely moving: 0.001 peak to peak
pub fn motionless_clip(count: usize) -> Vec<PoseFrame> {
    (0..count)
        .map(|i| {
            let hip_y = 0.5 + 0.0005 * (2.0 * PI * i as f64 / FRAMES_PER_REP as f64).sin();
            squat_frame(i as f64 / FPS, hip_y, KneeDrift::default())
        })
        .collect()
}

/// Hip hinge: hips travel back and down while the knees barely bend
pub fn hinge_clip(reps: usize) -> Vec<PoseFrame> {
    let period = 60;
    (0..reps * period)
        .map(|i| {
            let t = (1.0 - (2.0 * PI * i as f64 / period as f64).cos()) / 2.0;
            let mut frame = squat_frame(i as f64 / FPS, 0.5 + 0.095 * t, KneeDrift::default());
            for idx in [LandmarkIndex::LeftHip, LandmarkIndex::RightHip] {
                frame.landmarks[idx as usize].x += 0.07 * t;
            }
            for idx in [LandmarkIndex::LeftKnee, LandmarkIndex::RightKnee] {
                frame.landmarks[idx as usize].x += 0.035 * t;
                frame.landmarks[idx as usize].y = 0.7;
            }
            frame
        })
        .collect()
}

/// Lower visibility of every landmark
pub fn with_visibility(frames: &[PoseFrame], visibility: f64) -> Vec<PoseFrame> {
    frames
        .iter()
        .map(|f| {
            let mut f = f.clone();
            for lm in f.landmarks.iter_mut() {
                lm.visibility = visibility;
            }
            f
        })
        .collect()
}
