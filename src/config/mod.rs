use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::BodyRegion;

/// Longest trim buffer a config file may ask for
pub const MAX_TRIM_BUFFER_SECONDS: f64 = 60.0;

/// Analysis pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Seconds kept around the reps when trimming a clip
    #[serde(default = "default_trim_buffer_seconds")]
    pub trim_buffer_seconds: f64,

    #[serde(default)]
    pub conditioning: ConditioningConfig,

    #[serde(default)]
    pub segmentation: SegmentationConfig,

    #[serde(default)]
    pub gating: GatingConfig,
}

/// Adaptive low-pass filter tuning for one body region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    /// Cutoff frequency (Hz) when the signal is at rest
    pub min_cutoff: f64,
    /// How fast the cutoff rises with speed
    pub beta: f64,
    /// Cutoff frequency (Hz) for the derivative estimate
    #[serde(default = "default_d_cutoff")]
    pub d_cutoff: f64,
}

/// Signal conditioning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditioningConfig {
    /// Max frame-to-frame displacement as a fraction of body height
    #[serde(default = "default_outlier_fraction")]
    pub outlier_fraction: f64,

    /// Visibility needed on shoulders and ankles to estimate body height
    #[serde(default = "default_visibility_threshold")]
    pub body_visibility: f64,

    #[serde(default = "default_torso_preset")]
    pub torso: FilterPreset,

    #[serde(default = "default_legs_preset")]
    pub legs: FilterPreset,

    #[serde(default = "default_extremities_preset")]
    pub extremities: FilterPreset,
}

/// Repetition segmentation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,

    /// Neighbours on each side a peak must strictly exceed
    #[serde(default = "default_peak_radius")]
    pub peak_radius: usize,

    /// Frames searched on each side of a peak for its prominence base
    #[serde(default = "default_prominence_window")]
    pub prominence_window: usize,

    #[serde(default = "default_min_prominence")]
    pub min_prominence: f64,

    /// Hip range below which the clip is considered motionless
    #[serde(default = "default_min_motion_range")]
    pub min_motion_range: f64,
}

/// Input quality and exercise gating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingConfig {
    /// Minimum average visibility of hips, knees and ankles
    #[serde(default = "default_visibility_threshold")]
    pub min_visibility: f64,

    /// Refuse clips classified as deadlift or other
    #[serde(default = "default_true")]
    pub reject_non_squat: bool,
}

// Default value functions
fn default_trim_buffer_seconds() -> f64 {
    2.5
}

fn default_d_cutoff() -> f64 {
    1.0
}

fn default_torso_preset() -> FilterPreset {
    FilterPreset {
        min_cutoff: 1.0,
        beta: 8.0,
        d_cutoff: default_d_cutoff(),
    }
}

fn default_legs_preset() -> FilterPreset {
    FilterPreset {
        min_cutoff: 1.5,
        beta: 10.0,
        d_cutoff: default_d_cutoff(),
    }
}

fn default_extremities_preset() -> FilterPreset {
    FilterPreset {
        min_cutoff: 2.0,
        beta: 15.0,
        d_cutoff: default_d_cutoff(),
    }
}

fn default_outlier_fraction() -> f64 {
    0.15
}

fn default_visibility_threshold() -> f64 {
    0.3
}

fn default_smoothing_window() -> usize {
    5
}

fn default_peak_radius() -> usize {
    2
}

fn default_prominence_window() -> usize {
    15
}

fn default_min_prominence() -> f64 {
    0.02
}

fn default_min_motion_range() -> f64 {
    0.005
}

fn default_true() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trim_buffer_seconds: default_trim_buffer_seconds(),
            conditioning: ConditioningConfig::default(),
            segmentation: SegmentationConfig::default(),
            gating: GatingConfig::default(),
        }
    }
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            torso: default_torso_preset(),
            legs: default_legs_preset(),
            extremities: default_extremities_preset(),
            outlier_fraction: default_outlier_fraction(),
            body_visibility: default_visibility_threshold(),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            smoothing_window: default_smoothing_window(),
            peak_radius: default_peak_radius(),
            prominence_window: default_prominence_window(),
            min_prominence: default_min_prominence(),
            min_motion_range: default_min_motion_range(),
        }
    }
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            min_visibility: default_visibility_threshold(),
            reject_non_squat: default_true(),
        }
    }
}

impl ConditioningConfig {
    /// Filter preset used for a body region
    pub fn preset_for(&self, region: BodyRegion) -> FilterPreset {
        match region {
            BodyRegion::Torso => self.torso,
            BodyRegion::Legs => self.legs,
            BodyRegion::Extremities => self.extremities,
        }
    }
}

impl AnalysisConfig {
    /// Parse configuration from a TOML document; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(contents).context("Failed to parse analysis config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<()> {
        if self.segmentation.smoothing_window == 0 {
            anyhow::bail!("segmentation.smoothing_window must be at least 1");
        }
        if self.segmentation.peak_radius == 0 {
            anyhow::bail!("segmentation.peak_radius must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.gating.min_visibility) {
            anyhow::bail!("gating.min_visibility must be between 0 and 1");
        }
        if self.conditioning.outlier_fraction <= 0.0 {
            anyhow::bail!("conditioning.outlier_fraction must be positive");
        }
        if !(0.0..=MAX_TRIM_BUFFER_SECONDS).contains(&self.trim_buffer_seconds) {
            anyhow::bail!(
                "trim_buffer_seconds must be between 0 and {}",
                MAX_TRIM_BUFFER_SECONDS
            );
        }
        Ok(())
    }
}
