use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::landmark::PoseFrame;

/// Three-tier traffic-light rating derived from a score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Green,
    Yellow,
    Red,
}

impl Rating {
    /// Map a 0-100 score onto its rating
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Rating::Green,
            50..=79 => Rating::Yellow,
            _ => Rating::Red,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Green => write!(f, "green"),
            Rating::Yellow => write!(f, "yellow"),
            Rating::Red => write!(f, "red"),
        }
    }
}

/// How well the camera angle can observe a metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Weight used when blending metric scores into a single number
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::High => 1.0,
            Confidence::Medium => 0.6,
            Confidence::Low => 0.3,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Dominant camera viewpoint of a clip
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    Frontal,
    Rear,
    LeftSide,
    RightSide,
    Diagonal,
    Uncertain,
}

impl std::fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraAngle::Frontal => write!(f, "frontal"),
            CameraAngle::Rear => write!(f, "rear"),
            CameraAngle::LeftSide => write!(f, "left_side"),
            CameraAngle::RightSide => write!(f, "right_side"),
            CameraAngle::Diagonal => write!(f, "diagonal"),
            CameraAngle::Uncertain => write!(f, "uncertain"),
        }
    }
}

/// Exercise recognised in a clip
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Squat,
    Deadlift,
    Other,
    Unknown,
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExerciseType::Squat => write!(f, "squat"),
            ExerciseType::Deadlift => write!(f, "deadlift"),
            ExerciseType::Other => write!(f, "other"),
            ExerciseType::Unknown => write!(f, "unknown"),
        }
    }
}

/// The eighteen scored squat metrics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Depth,
    KneeTracking,
    BackAngle,
    BarPath,
    Symmetry,
    ButtWink,
    Tempo,
    HeelRise,
    StanceWidth,
    HipShift,
    KneeValgus,
    KneeTravel,
    DepthConsistency,
    ThoracicRounding,
    HipRiseRate,
    ReversalControl,
    StanceWidthShift,
    HeadPosition,
}

impl MetricKind {
    pub const ALL: [MetricKind; 18] = [
        MetricKind::Depth,
        MetricKind::KneeTracking,
        MetricKind::BackAngle,
        MetricKind::BarPath,
        MetricKind::Symmetry,
        MetricKind::ButtWink,
        MetricKind::Tempo,
        MetricKind::HeelRise,
        MetricKind::StanceWidth,
        MetricKind::HipShift,
        MetricKind::KneeValgus,
        MetricKind::KneeTravel,
        MetricKind::DepthConsistency,
        MetricKind::ThoracicRounding,
        MetricKind::HipRiseRate,
        MetricKind::ReversalControl,
        MetricKind::StanceWidthShift,
        MetricKind::HeadPosition,
    ];

    /// Report key for this metric
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Depth => "depth",
            MetricKind::KneeTracking => "kneeTracking",
            MetricKind::BackAngle => "backAngle",
            MetricKind::BarPath => "barPath",
            MetricKind::Symmetry => "symmetry",
            MetricKind::ButtWink => "buttWink",
            MetricKind::Tempo => "tempo",
            MetricKind::HeelRise => "heelRise",
            MetricKind::StanceWidth => "stanceWidth",
            MetricKind::HipShift => "hipShift",
            MetricKind::KneeValgus => "kneeValgus",
            MetricKind::KneeTravel => "kneeTravel",
            MetricKind::DepthConsistency => "depthConsistency",
            MetricKind::ThoracicRounding => "thoracicRounding",
            MetricKind::HipRiseRate => "hipRiseRate",
            MetricKind::ReversalControl => "reversalControl",
            MetricKind::StanceWidthShift => "stanceWidthShift",
            MetricKind::HeadPosition => "headPosition",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Depth => "Depth",
            MetricKind::KneeTracking => "Knee tracking",
            MetricKind::BackAngle => "Back angle",
            MetricKind::BarPath => "Bar path",
            MetricKind::Symmetry => "Symmetry",
            MetricKind::ButtWink => "Butt wink",
            MetricKind::Tempo => "Tempo",
            MetricKind::HeelRise => "Heel rise",
            MetricKind::StanceWidth => "Stance width",
            MetricKind::HipShift => "Hip shift",
            MetricKind::KneeValgus => "Knee valgus",
            MetricKind::KneeTravel => "Knee travel",
            MetricKind::DepthConsistency => "Depth consistency",
            MetricKind::ThoracicRounding => "Thoracic rounding",
            MetricKind::HipRiseRate => "Hip rise rate",
            MetricKind::ReversalControl => "Reversal control",
            MetricKind::StanceWidthShift => "Stance width shift",
            MetricKind::HeadPosition => "Head position",
        }
    }

    /// Whether the metric is computed once across all reps
    pub fn is_cross_rep(&self) -> bool {
        matches!(self, MetricKind::DepthConsistency)
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Score of one metric for one rep (or the whole video)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricScore {
    pub score: u8,
    pub rating: Rating,
    pub summary: String,
    pub issue_frames: Vec<usize>,
    pub confidence: Confidence,
}

impl MetricScore {
    /// Build a score from a raw value; rounds and clamps into 0-100.
    /// Confidence starts at medium and is stamped after scoring.
    pub fn new(raw_score: f64, summary: impl Into<String>, issue_frames: Vec<usize>) -> Self {
        let score = crate::services::geometry::clamp_score(raw_score);
        let mut issue_frames = issue_frames;
        issue_frames.sort_unstable();
        issue_frames.dedup();

        Self {
            score,
            rating: Rating::from_score(score),
            summary: summary.into(),
            issue_frames,
            confidence: Confidence::Medium,
        }
    }

    /// Fixed fallback score for a quantity that could not be measured
    pub fn neutral(score: u8, summary: impl Into<String>) -> Self {
        Self::new(f64::from(score), summary, Vec::new())
    }

    pub fn is_good(&self) -> bool {
        self.rating == Rating::Green
    }
}

/// Repetition boundaries found by the segmenter (frame indices)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedRep {
    pub start_frame: usize,
    pub bottom_frame: usize,
    pub end_frame: usize,
}

impl DetectedRep {
    pub fn new(start_frame: usize, bottom_frame: usize, end_frame: usize) -> Self {
        Self {
            start_frame,
            bottom_frame,
            end_frame,
        }
    }

    pub fn contains(&self, frame: usize) -> bool {
        (self.start_frame..=self.end_frame).contains(&frame)
    }
}

/// All metric scores for one repetition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepData {
    /// 1-based rep number
    pub rep_number: usize,
    pub start_frame: usize,
    pub bottom_frame: usize,
    pub end_frame: usize,
    pub start_time: f64,
    pub bottom_time: f64,
    pub end_time: f64,
    pub metrics: BTreeMap<MetricKind, MetricScore>,
}

impl RepData {
    pub fn metric(&self, kind: MetricKind) -> Option<&MetricScore> {
        self.metrics.get(&kind)
    }

    pub fn bounds(&self) -> DetectedRep {
        DetectedRep::new(self.start_frame, self.bottom_frame, self.end_frame)
    }
}

/// Complete analysis of one video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub reps: Vec<RepData>,
    pub overall: BTreeMap<MetricKind, MetricScore>,
    pub rep_count: usize,
    pub exercise_type: ExerciseType,
    pub camera_angle: CameraAngle,
}

impl AnalysisResult {
    pub fn overall_metric(&self, kind: MetricKind) -> Option<&MetricScore> {
        self.overall.get(&kind)
    }

    /// Confidence-weighted mean of the overall metric scores
    pub fn overall_score(&self) -> f64 {
        let (weighted, weights) = self
            .overall
            .values()
            .fold((0.0, 0.0), |(sum, total), metric| {
                let w = metric.confidence.weight();
                (sum + f64::from(metric.score) * w, total + w)
            });

        if weights > 0.0 {
            weighted / weights
        } else {
            0.0
        }
    }

    /// Overall metrics rated red, worst first
    pub fn flagged_metrics(&self) -> Vec<(MetricKind, &MetricScore)> {
        let mut flagged: Vec<_> = self
            .overall
            .iter()
            .filter(|(_, m)| m.rating == Rating::Red)
            .map(|(k, m)| (*k, m))
            .collect();
        flagged.sort_by_key(|(_, m)| m.score);
        flagged
    }
}

/// Cropped clip around the detected reps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrimmedClip {
    pub frames: Vec<PoseFrame>,
    /// Index of the first kept frame in the original sequence
    pub start_frame: usize,
    /// Index of the last kept frame in the original sequence
    pub end_frame: usize,
    pub start_time: f64,
    pub end_time: f64,
}
