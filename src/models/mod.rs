// Data models for landmark streams and analysis reports

pub mod analysis;
pub mod landmark;

pub use analysis::*;
pub use landmark::{
    parse_detection_stream, BodyRegion, DetectionFrame, Landmark, LandmarkIndex, Point, PoseFrame, NUM_LANDMARKS,
};
