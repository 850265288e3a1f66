/// Camera Angle Classification
///
/// Votes on the dominant camera viewpoint from a short window of frames where
/// both shoulders are reliably tracked. Shoulder spread separates side views
/// from front/back views; face visibility separates front from back; arm
/// visibility tells which side faces the camera.

use std::collections::HashMap;

use crate::models::{CameraAngle, LandmarkIndex, PoseFrame};

const SHOULDER_VISIBILITY: f64 = 0.3;
const STABLE_RUN: usize = 5;
const SAMPLE_FRAMES: usize = 15;
const SIDE_MAX_SPREAD: f64 = 0.08;
const FRONTAL_MIN_SPREAD: f64 = 0.20;
const FACE_VISIBLE: f64 = 0.5;
const MAJORITY: f64 = 0.6;

const LEFT_ARM: [LandmarkIndex; 3] = [
    LandmarkIndex::LeftShoulder,
    LandmarkIndex::LeftElbow,
    LandmarkIndex::LeftWrist,
];
const RIGHT_ARM: [LandmarkIndex; 3] = [
    LandmarkIndex::RightShoulder,
    LandmarkIndex::RightElbow,
    LandmarkIndex::RightWrist,
];
const SHOULDERS: [LandmarkIndex; 2] = [LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder];

/// Classify the dominant camera angle of a clip
pub fn classify_camera_angle(frames: &[PoseFrame]) -> CameraAngle {
    let Some(start) = find_stable_window(frames) else {
        tracing::debug!("No stable shoulder window, camera angle uncertain");
        return CameraAngle::Uncertain;
    };

    let votes: Vec<CameraAngle> = frames[start..]
        .iter()
        .take(SAMPLE_FRAMES)
        .filter_map(classify_frame)
        .collect();

    majority_vote(&votes)
}

/// Classify a single frame, or `None` if its shoulders are not visible
pub fn classify_frame(frame: &PoseFrame) -> Option<CameraAngle> {
    if !frame.has_visible_landmarks(&SHOULDERS, SHOULDER_VISIBILITY) {
        return None;
    }

    let spread = (frame.landmark(LandmarkIndex::LeftShoulder).x
        - frame.landmark(LandmarkIndex::RightShoulder).x)
        .abs();

    let angle = if spread < SIDE_MAX_SPREAD {
        if frame.average_visibility(&LEFT_ARM) > frame.average_visibility(&RIGHT_ARM) {
            CameraAngle::LeftSide
        } else {
            CameraAngle::RightSide
        }
    } else if spread > FRONTAL_MIN_SPREAD {
        if frame.average_visibility(&LandmarkIndex::FACE) > FACE_VISIBLE {
            CameraAngle::Frontal
        } else {
            CameraAngle::Rear
        }
    } else {
        CameraAngle::Diagonal
    };

    Some(angle)
}

/// Start of the first run of consecutive frames with both shoulders visible
fn find_stable_window(frames: &[PoseFrame]) -> Option<usize> {
    let mut run = 0;
    for (i, frame) in frames.iter().enumerate() {
        if frame.has_visible_landmarks(&SHOULDERS, SHOULDER_VISIBILITY) {
            run += 1;
            if run >= STABLE_RUN {
                return Some(i + 1 - run);
            }
        } else {
            run = 0;
        }
    }
    None
}

fn majority_vote(votes: &[CameraAngle]) -> CameraAngle {
    if votes.is_empty() {
        return CameraAngle::Uncertain;
    }

    let mut counts: HashMap<CameraAngle, usize> = HashMap::new();
    for vote in votes {
        *counts.entry(*vote).or_insert(0) += 1;
    }

    let (winner, count) = counts
        .into_iter()
        .max_by_key(|(angle, count)| (*count, std::cmp::Reverse(*angle)))
        .unwrap_or((CameraAngle::Uncertain, 0));

    let share = count as f64 / votes.len() as f64;
    tracing::debug!(%winner, share, samples = votes.len(), "Camera angle vote");

    if share >= MAJORITY {
        winner
    } else {
        CameraAngle::Uncertain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Landmark, NUM_LANDMARKS};

    fn frame(spread: f64, face_visibility: f64, left_arm: f64, right_arm: f64) -> PoseFrame {
        let mut landmarks = [Landmark::new(0.5, 0.5, 0.0, 0.9); NUM_LANDMARKS];
        for idx in LandmarkIndex::FACE {
            landmarks[idx as usize].visibility = face_visibility;
        }
        for idx in LEFT_ARM {
            landmarks[idx as usize].visibility = left_arm;
        }
        for idx in RIGHT_ARM {
            landmarks[idx as usize].visibility = right_arm;
        }
        landmarks[LandmarkIndex::LeftShoulder as usize].x = 0.5 + spread / 2.0;
        landmarks[LandmarkIndex::RightShoulder as usize].x = 0.5 - spread / 2.0;
        PoseFrame::new(0.0, landmarks)
    }

    #[test]
    fn test_per_frame_classification() {
        assert_eq!(classify_frame(&frame(0.3, 0.9, 0.9, 0.9)), Some(CameraAngle::Frontal));
        assert_eq!(classify_frame(&frame(0.3, 0.2, 0.9, 0.9)), Some(CameraAngle::Rear));
        assert_eq!(classify_frame(&frame(0.14, 0.9, 0.9, 0.9)), Some(CameraAngle::Diagonal));
        assert_eq!(classify_frame(&frame(0.02, 0.9, 0.9, 0.4)), Some(CameraAngle::LeftSide));
        assert_eq!(classify_frame(&frame(0.02, 0.9, 0.4, 0.9)), Some(CameraAngle::RightSide));
        assert_eq!(classify_frame(&frame(0.3, 0.9, 0.1, 0.1)), None);
    }

    #[test]
    fn test_frontal_majority() {
        // 10 of 15 sampled frames frontal (67%)
        let mut frames: Vec<PoseFrame> = (0..10).map(|_| frame(0.3, 0.9, 0.9, 0.9)).collect();
        frames.extend((0..5).map(|_| frame(0.14, 0.9, 0.9, 0.9)));
        assert_eq!(classify_camera_angle(&frames), CameraAngle::Frontal);
    }

    #[test]
    fn test_scattered_votes_are_uncertain() {
        let mut frames: Vec<PoseFrame> = Vec::new();
        for _ in 0..5 {
            frames.push(frame(0.3, 0.9, 0.9, 0.9));
            frames.push(frame(0.14, 0.9, 0.9, 0.9));
            frames.push(frame(0.02, 0.9, 0.9, 0.4));
        }
        assert_eq!(classify_camera_angle(&frames), CameraAngle::Uncertain);
    }

    #[test]
    fn test_tie_is_uncertain() {
        let mut frames: Vec<PoseFrame> = (0..7).map(|_| frame(0.3, 0.9, 0.9, 0.9)).collect();
        frames.extend((0..7).map(|_| frame(0.3, 0.2, 0.9, 0.9)));
        assert_eq!(classify_camera_angle(&frames), CameraAngle::Uncertain);
    }

    #[test]
    fn test_no_stable_window() {
        let mut frames = Vec::new();
        for i in 0..20 {
            // Shoulders drop out every fourth frame
            let vis = if i % 4 == 3 { 0.1 } else { 0.9 };
            frames.push(frame(0.3, 0.9, vis, vis));
        }
        assert_eq!(classify_camera_angle(&frames), CameraAngle::Uncertain);
    }

    #[test]
    fn test_sampling_starts_at_stable_window() {
        // Early frames lack shoulders; later frames are side-on
        let mut frames: Vec<PoseFrame> = (0..3).map(|_| frame(0.3, 0.9, 0.1, 0.1)).collect();
        frames.extend((0..20).map(|_| frame(0.03, 0.2, 0.3, 0.9)));
        assert_eq!(classify_camera_angle(&frames), CameraAngle::RightSide);
    }
}
