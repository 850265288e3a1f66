use thiserror::Error;

use crate::models::ExerciseType;

/// Terminal analysis failures. Each one means no result is produced for the clip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No person detected in the video")]
    NoPersonDetected,

    #[error("Landmark visibility too low for reliable analysis (average {average_visibility:.2})")]
    LowVisibility { average_visibility: f64 },

    #[error("No squat repetition detected (hip movement range {hip_range:.4})")]
    NoRepsDetected { hip_range: f64 },

    #[error("Detected exercise is {detected}, not a squat")]
    WrongExercise { detected: ExerciseType },
}

impl AnalysisError {
    /// Advice for the end user on how to record a usable clip
    pub fn user_guidance(&self) -> &'static str {
        match self {
            AnalysisError::NoPersonDetected => {
                "Make sure one person is clearly in frame for the whole set."
            }
            AnalysisError::LowVisibility { .. } => {
                "Ensure your full body, including hips, knees and feet, is visible and well lit. Filming from the side works best."
            }
            AnalysisError::NoRepsDetected { .. } => {
                "Record at least one full squat from standing to the bottom and back up, with the camera held still."
            }
            AnalysisError::WrongExercise { .. } => {
                "Only back squats are supported. Upload a squat video filmed from the side."
            }
        }
    }
}
