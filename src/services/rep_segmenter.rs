/// Repetition Segmentation Service
///
/// Splits a conditioned landmark stream into squat repetitions using the
/// average hip height signal. Because image `y` grows downward, the bottom of
/// each squat is a local maximum of that signal.

use crate::config::SegmentationConfig;
use crate::error::AnalysisError;
use crate::models::{DetectedRep, PoseFrame};

pub struct RepSegmenter {
    config: SegmentationConfig,
}

impl RepSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Detect repetitions in a conditioned frame sequence
    pub fn segment(&self, frames: &[PoseFrame]) -> Result<Vec<DetectedRep>, AnalysisError> {
        let hip_heights = hip_height_signal(frames);
        self.segment_signal(&hip_heights)
    }

    /// Detect repetitions in a raw hip height signal
    pub fn segment_signal(&self, hip_heights: &[f64]) -> Result<Vec<DetectedRep>, AnalysisError> {
        if hip_heights.is_empty() {
            return Err(AnalysisError::NoRepsDetected { hip_range: 0.0 });
        }

        let smoothed = moving_average(hip_heights, self.config.smoothing_window);
        let bottoms = self.find_bottoms(&smoothed);

        if bottoms.is_empty() {
            return self.whole_clip_fallback(hip_heights);
        }

        let reps = build_reps(&smoothed, &bottoms);
        tracing::debug!(reps = reps.len(), "Segmented repetitions");
        Ok(reps)
    }

    /// Prominent local maxima of the smoothed signal
    fn find_bottoms(&self, smoothed: &[f64]) -> Vec<usize> {
        let radius = self.config.peak_radius;
        let window = self.config.prominence_window;
        let n = smoothed.len();
        if n < 2 * radius + 1 {
            return Vec::new();
        }

        (radius..n - radius)
            .filter(|&i| {
                let value = smoothed[i];
                (1..=radius).all(|k| value > smoothed[i - k] && value > smoothed[i + k])
            })
            .filter(|&i| {
                let left_min = window_min(&smoothed[i.saturating_sub(window)..i]);
                let right_min = window_min(&smoothed[i + 1..(i + 1 + window).min(n)]);
                let prominence = smoothed[i] - left_min.max(right_min);
                prominence >= self.config.min_prominence
            })
            .collect()
    }

    fn whole_clip_fallback(&self, hip_heights: &[f64]) -> Result<Vec<DetectedRep>, AnalysisError> {
        let range = signal_range(hip_heights);
        if range <= self.config.min_motion_range {
            tracing::info!(hip_range = range, "No hip motion detected");
            return Err(AnalysisError::NoRepsDetected { hip_range: range });
        }

        let bottom = argmax(hip_heights);
        tracing::debug!(bottom, hip_range = range, "No prominent peak, treating clip as one rep");
        Ok(vec![DetectedRep::new(0, bottom, hip_heights.len() - 1)])
    }
}

impl Default for RepSegmenter {
    fn default() -> Self {
        Self::new(SegmentationConfig::default())
    }
}

/// Average of left and right hip `y` per frame
pub fn hip_height_signal(frames: &[PoseFrame]) -> Vec<f64> {
    frames.iter().map(PoseFrame::hip_height).collect()
}

/// Centered moving average, truncated at the edges
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let half = window.max(1) / 2;
    let n = signal.len();

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            let slice = &signal[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Max minus min of a signal
pub fn signal_range(signal: &[f64]) -> f64 {
    let max = signal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = signal.iter().copied().fold(f64::INFINITY, f64::min);
    if max.is_finite() && min.is_finite() {
        max - min
    } else {
        0.0
    }
}

fn window_min(window: &[f64]) -> f64 {
    window.iter().copied().fold(f64::INFINITY, f64::min)
}

fn argmax(signal: &[f64]) -> usize {
    signal
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, &v)| {
            if v > best {
                (i, v)
            } else {
                (best_i, best)
            }
        })
        .0
}

/// Turn bottom indices into rep boundaries
fn build_reps(smoothed: &[f64], bottoms: &[usize]) -> Vec<DetectedRep> {
    let last_index = smoothed.len() - 1;

    bottoms
        .iter()
        .enumerate()
        .map(|(i, &bottom)| {
            let start = match i {
                0 => walk_to_valley(smoothed, bottom, Direction::Backward),
                _ => (bottoms[i - 1] + bottom) / 2,
            };
            let end = match bottoms.get(i + 1) {
                Some(&next) => (bottom + next) / 2,
                None => walk_to_valley(smoothed, bottom, Direction::Forward),
            };
            DetectedRep::new(start.min(bottom), bottom, end.max(bottom).min(last_index))
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Direction {
    Backward,
    Forward,
}

/// Walk away from a bottom while the signal keeps decreasing (rising in the image)
fn walk_to_valley(smoothed: &[f64], bottom: usize, direction: Direction) -> usize {
    let mut idx = bottom;
    match direction {
        Direction::Backward => {
            while idx > 0 && smoothed[idx - 1] < smoothed[idx] {
                idx -= 1;
            }
        }
        Direction::Forward => {
            while idx + 1 < smoothed.len() && smoothed[idx + 1] < smoothed[idx] {
                idx += 1;
            }
        }
    }
    idx
}
