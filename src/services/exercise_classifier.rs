/// Exercise Type Classification
///
/// Heuristic squat / deadlift discriminator from hip travel and knee flexion.
/// Ambiguous clips with some vertical hip travel are accepted as squats.

use crate::models::{ExerciseType, LandmarkIndex, PoseFrame};
use crate::services::geometry::angle_between;

const HIP_VISIBILITY: f64 = 0.3;

/// Ranges of the quantities the classifier looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRanges {
    pub hip_y_range: f64,
    pub hip_x_range: f64,
    pub knee_angle_range: f64,
}

/// Measure hip and knee ranges over frames with visible hips
pub fn measure_motion(frames: &[PoseFrame]) -> Option<MotionRanges> {
    let hips = [LandmarkIndex::LeftHip, LandmarkIndex::RightHip];
    let usable: Vec<&PoseFrame> = frames
        .iter()
        .filter(|f| f.has_visible_landmarks(&hips, HIP_VISIBILITY))
        .collect();

    if usable.len() < 2 {
        return None;
    }

    let hip_y: Vec<f64> = usable.iter().map(|f| f.hip_height()).collect();
    let hip_x: Vec<f64> = usable
        .iter()
        .map(|f| f.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip).x)
        .collect();

    let legs = [
        (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
        (LandmarkIndex::RightHip, LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    ];
    let knee_angles: Vec<f64> = usable
        .iter()
        .flat_map(|f| {
            legs.iter().filter_map(move |&(hip, knee, ankle)| {
                angle_between(
                    f.landmark(hip).point(),
                    f.landmark(knee).point(),
                    f.landmark(ankle).point(),
                )
            })
        })
        .collect();

    Some(MotionRanges {
        hip_y_range: range(&hip_y),
        hip_x_range: range(&hip_x),
        knee_angle_range: range(&knee_angles),
    })
}

/// Classify the exercise performed in a clip
pub fn classify_exercise(frames: &[PoseFrame]) -> ExerciseType {
    let Some(ranges) = measure_motion(frames) else {
        return ExerciseType::Unknown;
    };

    let exercise = classify_ranges(&ranges);
    tracing::debug!(
        %exercise,
        hip_y_range = ranges.hip_y_range,
        hip_x_range = ranges.hip_x_range,
        knee_angle_range = ranges.knee_angle_range,
        "Classified exercise"
    );
    exercise
}

pub fn classify_ranges(ranges: &MotionRanges) -> ExerciseType {
    if ranges.hip_y_range > 0.10 && ranges.knee_angle_range > 30.0 {
        ExerciseType::Squat
    } else if ranges.hip_y_range > 0.08 && ranges.hip_x_range > 0.05 && ranges.knee_angle_range < 30.0 {
        ExerciseType::Deadlift
    } else if ranges.hip_y_range > 0.05 {
        ExerciseType::Squat
    } else {
        ExerciseType::Other
    }
}

fn range(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}
