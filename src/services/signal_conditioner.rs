/// Signal Conditioning Service
///
/// Cleans a raw landmark stream before any analysis runs:
/// - Outlier rejection: landmarks that jump further than a fraction of the
///   subject's body height in one frame are held at their previous position
/// - Adaptive low-pass filtering: one One-Euro filter per landmark coordinate,
///   tuned per anatomical region
///
/// A conditioner owns its filter state for one video and is consumed by
/// [`SignalConditioner::condition`].

use std::f64::consts::PI;

use crate::config::{ConditioningConfig, FilterPreset};
use crate::models::{Landmark, LandmarkIndex, PoseFrame, NUM_LANDMARKS};

/// Adaptive low-pass filter: smooth at rest, responsive during motion
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    preset: FilterPreset,
    x_prev: f64,
    dx_prev: f64,
    t_prev: f64,
    initialized: bool,
}

/// alpha = r / (r + 1), r = 2*pi*fc*Te
fn smoothing_factor(t_e: f64, cutoff: f64) -> f64 {
    let r = 2.0 * PI * cutoff * t_e;
    r / (r + 1.0)
}

impl OneEuroFilter {
    pub fn new(preset: FilterPreset) -> Self {
        Self {
            preset,
            x_prev: 0.0,
            dx_prev: 0.0,
            t_prev: 0.0,
            initialized: false,
        }
    }

    /// Filter one sample taken at `t` seconds
    pub fn filter(&mut self, t: f64, x: f64) -> f64 {
        if !self.initialized {
            self.x_prev = x;
            self.t_prev = t;
            self.initialized = true;
            return x;
        }

        let t_e = t - self.t_prev;
        if t_e <= 0.0 {
            return self.x_prev;
        }

        let a_d = smoothing_factor(t_e, self.preset.d_cutoff);
        let dx = (x - self.x_prev) / t_e;
        let dx_hat = self.dx_prev + a_d * (dx - self.dx_prev);

        let cutoff = self.preset.min_cutoff + self.preset.beta * dx_hat.abs();
        let a = smoothing_factor(t_e, cutoff);
        let x_hat = self.x_prev + a * (x - self.x_prev);

        self.x_prev = x_hat;
        self.dx_prev = dx_hat;
        self.t_prev = t;

        x_hat
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Frame-to-frame outlier rejection keyed to body height
#[derive(Debug, Clone)]
pub struct OutlierRejector {
    outlier_fraction: f64,
    body_visibility: f64,
    body_height: Option<f64>,
    rejected: usize,
}

impl OutlierRejector {
    pub fn new(outlier_fraction: f64, body_visibility: f64) -> Self {
        Self {
            outlier_fraction,
            body_visibility,
            body_height: None,
            rejected: 0,
        }
    }

    /// Body height estimated from the first frame with visible shoulders and ankles
    pub fn body_height(&self) -> Option<f64> {
        self.body_height
    }

    /// Number of landmarks replaced so far
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    /// Replace landmarks that moved too far since `previous`.
    ///
    /// Replaced landmarks take x, y and z from `previous` but keep their own visibility.
    pub fn reject(&mut self, frame: &PoseFrame, previous: Option<&PoseFrame>) -> PoseFrame {
        if self.body_height.is_none() {
            self.body_height = self.estimate_body_height(frame);
        }

        let (Some(body_height), Some(previous)) = (self.body_height, previous) else {
            return frame.clone();
        };

        let threshold = body_height * self.outlier_fraction;
        let mut output = frame.clone();

        for (current, prev) in output.landmarks.iter_mut().zip(previous.landmarks.iter()) {
            if current.distance_to(prev) > threshold {
                *current = Landmark {
                    x: prev.x,
                    y: prev.y,
                    z: prev.z,
                    visibility: current.visibility,
                };
                self.rejected += 1;
            }
        }

        output
    }

    fn estimate_body_height(&self, frame: &PoseFrame) -> Option<f64> {
        let required = [
            LandmarkIndex::LeftShoulder,
            LandmarkIndex::RightShoulder,
            LandmarkIndex::LeftAnkle,
            LandmarkIndex::RightAnkle,
        ];
        if !frame.has_visible_landmarks(&required, self.body_visibility) {
            return None;
        }

        let height = frame.body_height();
        (height > f64::EPSILON).then_some(height)
    }
}

/// Outlier rejection followed by per-coordinate adaptive filtering
pub struct SignalConditioner {
    /// One filter per landmark and coordinate (x, y, z)
    filters: Vec<[OneEuroFilter; 3]>,
    rejector: OutlierRejector,
}

impl SignalConditioner {
    pub fn new(config: &ConditioningConfig) -> Self {
        let filters = LandmarkIndex::all()
            .iter()
            .map(|idx| {
                let preset = config.preset_for(idx.region());
                std::array::from_fn(|_| OneEuroFilter::new(preset))
            })
            .collect();

        Self {
            filters,
            rejector: OutlierRejector::new(config.outlier_fraction, config.body_visibility),
        }
    }

    /// Condition a full stream; output has the same length and timestamps
    pub fn condition(mut self, frames: &[PoseFrame]) -> Vec<PoseFrame> {
        let mut output: Vec<PoseFrame> = Vec::with_capacity(frames.len());

        for frame in frames {
            let cleaned = self.rejector.reject(frame, output.last());
            let filtered = self.filter_frame(&cleaned);
            output.push(filtered);
        }

        tracing::debug!(
            frames = output.len(),
            rejected = self.rejector.rejected_count(),
            body_height = ?self.rejector.body_height(),
            "Conditioned landmark stream"
        );

        output
    }

    fn filter_frame(&mut self, frame: &PoseFrame) -> PoseFrame {
        let t = frame.timestamp;
        let mut landmarks = [Landmark::default(); NUM_LANDMARKS];

        for (i, (lm, filters)) in frame.landmarks.iter().zip(self.filters.iter_mut()).enumerate() {
            landmarks[i] = Landmark {
                x: filters[0].filter(t, lm.x),
                y: filters[1].filter(t, lm.y),
                z: filters[2].filter(t, lm.z),
                visibility: lm.visibility,
            };
        }

        PoseFrame::new(t, landmarks)
    }
}

/// Condition a frame stream with a fresh conditioner
pub fn condition_frames(frames: &[PoseFrame], config: &ConditioningConfig) -> Vec<PoseFrame> {
    SignalConditioner::new(config).condition(frames)
}
