use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::models::{
    AnalysisResult, DetectedRep, ExerciseType, LandmarkIndex, MetricKind, PoseFrame, RepData, TrimmedClip,
};
use crate::services::aggregator::aggregate;
use crate::services::camera_angle_classifier::classify_camera_angle;
use crate::services::confidence_matrix::{confidence_for, stamp_reps};
use crate::services::exercise_classifier::classify_exercise;
use crate::services::rep_segmenter::RepSegmenter;
use crate::services::scoring::{self, RepContext};
use crate::services::signal_conditioner::condition_frames;

/// Landmarks whose visibility gates the whole analysis
const GATING_LANDMARKS: [LandmarkIndex; 6] = [
    LandmarkIndex::LeftHip,
    LandmarkIndex::RightHip,
    LandmarkIndex::LeftKnee,
    LandmarkIndex::RightKnee,
    LandmarkIndex::LeftAnkle,
    LandmarkIndex::RightAnkle,
];

/// End-to-end squat analysis over one clip's landmark frames
pub struct SquatAnalysisService {
    config: AnalysisConfig,
    segmenter: RepSegmenter,
}

impl SquatAnalysisService {
    pub fn new(config: AnalysisConfig) -> Self {
        let segmenter = RepSegmenter::new(config.segmentation.clone());
        Self { config, segmenter }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline on raw frames ordered by timestamp
    pub fn analyze(&self, frames: &[PoseFrame]) -> Result<AnalysisResult, AnalysisError> {
        if frames.is_empty() {
            warn!("Analysis requested with no detected frames");
            return Err(AnalysisError::NoPersonDetected);
        }
        info!("Starting squat analysis of {} frames", frames.len());

        let conditioned = self.condition(frames);
        self.check_visibility(&conditioned)?;

        let reps = self.segmenter.segment(&conditioned)?;

        let exercise_type = classify_exercise(&conditioned);
        if self.config.gating.reject_non_squat && matches!(exercise_type, ExerciseType::Deadlift | ExerciseType::Other) {
            warn!("Rejected clip classified as {}", exercise_type);
            return Err(AnalysisError::WrongExercise {
                detected: exercise_type,
            });
        }

        let camera_angle = classify_camera_angle(&conditioned);

        let mut consistency = scoring::depth_consistency(&conditioned, &reps);
        consistency.confidence = confidence_for(MetricKind::DepthConsistency, camera_angle);

        let mut rep_data: Vec<RepData> = reps
            .iter()
            .enumerate()
            .map(|(i, rep)| {
                let mut data = score_rep(&conditioned, *rep, i + 1);
                data.metrics.insert(MetricKind::DepthConsistency, consistency.clone());
                data
            })
            .collect();
        stamp_reps(&mut rep_data, camera_angle);

        let mut overall = aggregate(&rep_data);
        overall.insert(MetricKind::DepthConsistency, consistency);

        let result = AnalysisResult {
            rep_count: rep_data.len(),
            reps: rep_data,
            overall,
            exercise_type,
            camera_angle,
        };

        info!(
            "Completed squat analysis: {} reps, camera {}, exercise {}",
            result.rep_count, result.camera_angle, result.exercise_type
        );
        Ok(result)
    }

    /// Outlier rejection and adaptive filtering with this service's settings
    pub fn condition(&self, frames: &[PoseFrame]) -> Vec<PoseFrame> {
        condition_frames(frames, &self.config.conditioning)
    }

    /// Crop conditioned frames to the detected reps plus a time buffer on each side
    pub fn trim(&self, conditioned: &[PoseFrame]) -> Result<TrimmedClip, AnalysisError> {
        let (Some(first_frame), Some(last_frame)) = (conditioned.first(), conditioned.last()) else {
            return Err(AnalysisError::NoPersonDetected);
        };

        let reps = self.segmenter.segment(conditioned)?;
        let (Some(first), Some(last)) = (reps.first(), reps.last()) else {
            return Err(AnalysisError::NoRepsDetected { hip_range: 0.0 });
        };

        let buffer = if conditioned.len() > 1 {
            let average_dt = (last_frame.timestamp - first_frame.timestamp) / (conditioned.len() - 1) as f64;
            if average_dt > 0.0 {
                (self.config.trim_buffer_seconds / average_dt).round() as usize
            } else {
                0
            }
        } else {
            0
        };

        let start_frame = first.start_frame.saturating_sub(buffer);
        let end_frame = last.end_frame.saturating_add(buffer).min(conditioned.len() - 1);
        debug!(start_frame, end_frame, buffer, "Trimmed clip to rep range");

        Ok(TrimmedClip {
            frames: conditioned[start_frame..=end_frame].to_vec(),
            start_frame,
            end_frame,
            start_time: conditioned[start_frame].timestamp,
            end_time: conditioned[end_frame].timestamp,
        })
    }

    fn check_visibility(&self, frames: &[PoseFrame]) -> Result<(), AnalysisError> {
        let average_visibility = frames
            .iter()
            .map(|f| f.average_visibility(&GATING_LANDMARKS))
            .sum::<f64>()
            / frames.len() as f64;

        if average_visibility < self.config.gating.min_visibility {
            warn!("Lower-body visibility too low: {:.2}", average_visibility);
            return Err(AnalysisError::LowVisibility { average_visibility });
        }
        Ok(())
    }
}

impl Default for SquatAnalysisService {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Per-rep metrics for one detected rep; cross-rep metrics are added by the caller
fn score_rep(frames: &[PoseFrame], rep: DetectedRep, rep_number: usize) -> RepData {
    let ctx = RepContext::new(frames, rep);
    let bounds = ctx.rep();

    RepData {
        rep_number,
        start_frame: bounds.start_frame,
        bottom_frame: bounds.bottom_frame,
        end_frame: bounds.end_frame,
        start_time: frames[bounds.start_frame].timestamp,
        bottom_time: frames[bounds.bottom_frame].timestamp,
        end_time: frames[bounds.end_frame].timestamp,
        metrics: scoring::score_rep(&ctx),
    }
}
