/// Landmark models and data structures
///
/// This module provides the per-frame body-joint representation consumed by the
/// analysis pipeline: a fixed 33-point full-body topology with normalized
/// image coordinates (`y` grows downward) and a per-point visibility score.

use serde::{Deserialize, Serialize};

/// Number of landmarks tracked per frame
pub const NUM_LANDMARKS: usize = 33;

/// Single body-joint estimate for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (normalized, image-relative)
    pub x: f64,
    /// Y coordinate (normalized, image-relative, grows downward)
    pub y: f64,
    /// Relative depth estimate
    #[serde(default)]
    pub z: f64,
    /// Detection visibility (0-1)
    pub visibility: f64,
}

impl Landmark {
    /// Create a new landmark
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Check if the landmark is visible enough to be trusted
    pub fn is_visible(&self, min_visibility: f64) -> bool {
        self.visibility >= min_visibility
    }

    /// 2D position of this landmark
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Euclidean distance to another landmark in the image plane
    pub fn distance_to(&self, other: &Landmark) -> f64 {
        self.point().distance_to(&other.point())
    }
}

/// 2D point in normalized image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Full-body landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

/// Anatomical region, used to pick a smoothing preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRegion {
    Torso,
    Legs,
    Extremities,
}

impl LandmarkIndex {
    /// Face landmarks (nose, eyes, ears, mouth)
    pub const FACE: [LandmarkIndex; 11] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
    ];

    /// Get landmark name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    /// Get all landmark indices in order
    pub fn all() -> [Self; NUM_LANDMARKS] {
        [
            Self::Nose,
            Self::LeftEyeInner,
            Self::LeftEye,
            Self::LeftEyeOuter,
            Self::RightEyeInner,
            Self::RightEye,
            Self::RightEyeOuter,
            Self::LeftEar,
            Self::RightEar,
            Self::MouthLeft,
            Self::MouthRight,
            Self::LeftShoulder,
            Self::RightShoulder,
            Self::LeftElbow,
            Self::RightElbow,
            Self::LeftWrist,
            Self::RightWrist,
            Self::LeftPinky,
            Self::RightPinky,
            Self::LeftIndex,
            Self::RightIndex,
            Self::LeftThumb,
            Self::RightThumb,
            Self::LeftHip,
            Self::RightHip,
            Self::LeftKnee,
            Self::RightKnee,
            Self::LeftAnkle,
            Self::RightAnkle,
            Self::LeftHeel,
            Self::RightHeel,
            Self::LeftFootIndex,
            Self::RightFootIndex,
        ]
    }

    /// Region this landmark belongs to
    pub fn region(&self) -> BodyRegion {
        match self {
            Self::LeftShoulder | Self::RightShoulder | Self::LeftHip | Self::RightHip => {
                BodyRegion::Torso
            }
            Self::LeftKnee
            | Self::RightKnee
            | Self::LeftAnkle
            | Self::RightAnkle
            | Self::LeftHeel
            | Self::RightHeel
            | Self::LeftFootIndex
            | Self::RightFootIndex => BodyRegion::Legs,
            _ => BodyRegion::Extremities,
        }
    }
}

/// One timestamped set of landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Frame timestamp in seconds
    pub timestamp: f64,
    /// All 33 landmarks for this frame
    #[serde(with = "landmark_array")]
    pub landmarks: [Landmark; NUM_LANDMARKS],
}

impl PoseFrame {
    /// Create a new pose frame
    pub fn new(timestamp: f64, landmarks: [Landmark; NUM_LANDMARKS]) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }

    /// Get landmark by index
    pub fn landmark(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    /// Midpoint of two landmarks
    pub fn midpoint(&self, a: LandmarkIndex, b: LandmarkIndex) -> Point {
        crate::services::geometry::midpoint(self.landmark(a).point(), self.landmark(b).point())
    }

    /// Average visibility across a set of landmarks
    pub fn average_visibility(&self, indices: &[LandmarkIndex]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices
            .iter()
            .map(|&idx| self.landmark(idx).visibility)
            .sum::<f64>()
            / indices.len() as f64
    }

    /// Check if all listed landmarks are visible
    pub fn has_visible_landmarks(&self, indices: &[LandmarkIndex], min_visibility: f64) -> bool {
        indices
            .iter()
            .all(|&idx| self.landmark(idx).is_visible(min_visibility))
    }

    /// Average hip height (`y`), larger means lower in the image
    pub fn hip_height(&self) -> f64 {
        (self.landmark(LandmarkIndex::LeftHip).y + self.landmark(LandmarkIndex::RightHip).y) / 2.0
    }

    /// Vertical distance between mid-shoulder and mid-ankle
    pub fn body_height(&self) -> f64 {
        let shoulders = self.midpoint(LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder);
        let ankles = self.midpoint(LandmarkIndex::LeftAnkle, LandmarkIndex::RightAnkle);
        (ankles.y - shoulders.y).abs()
    }
}

/// One sampled timestamp from an upstream landmark provider.
///
/// `landmarks` is `None` (JSON `null`) when no person was detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub timestamp: f64,
    #[serde(default, with = "optional_landmark_array")]
    pub landmarks: Option<[Landmark; NUM_LANDMARKS]>,
}

impl DetectionFrame {
    pub fn into_pose_frame(self) -> Option<PoseFrame> {
        self.landmarks.map(|landmarks| PoseFrame::new(self.timestamp, landmarks))
    }
}

/// Parse a provider's JSON output, dropping timestamps without a detection
pub fn parse_detection_stream(json: &str) -> serde_json::Result<Vec<PoseFrame>> {
    let stream: Vec<DetectionFrame> = serde_json::from_str(json)?;
    Ok(stream.into_iter().filter_map(DetectionFrame::into_pose_frame).collect())
}

/// Serializes the fixed landmark array as a plain sequence and rejects
/// sequences that do not hold exactly [`NUM_LANDMARKS`] entries.
mod landmark_array {
    use super::{Landmark, NUM_LANDMARKS};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(landmarks: &[Landmark; NUM_LANDMARKS], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(landmarks.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[Landmark; NUM_LANDMARKS], D::Error>
    where
        D: Deserializer<'de>,
    {
        let landmarks = Vec::<Landmark>::deserialize(deserializer)?;
        let len = landmarks.len();
        <[Landmark; NUM_LANDMARKS]>::try_from(landmarks).map_err(|_| {
            D::Error::custom(format!(
                "expected {} landmarks per frame, got {}",
                NUM_LANDMARKS, len
            ))
        })
    }
}

mod optional_landmark_array {
    use super::{Landmark, NUM_LANDMARKS};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(landmarks: &Option<[Landmark; NUM_LANDMARKS]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match landmarks {
            Some(landmarks) => super::landmark_array::serialize(landmarks, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<[Landmark; NUM_LANDMARKS]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super::landmark_array")] [Landmark; NUM_LANDMARKS]);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(landmarks)| landmarks))
    }
}
