// Analysis pipeline services

pub mod aggregator;
pub mod camera_angle_classifier;
pub mod confidence_matrix;
pub mod exercise_classifier;
pub mod geometry;
pub mod rep_segmenter;
pub mod scoring;
pub mod signal_conditioner;
pub mod squat_analysis_service;

pub use rep_segmenter::RepSegmenter;
pub use signal_conditioner::SignalConditioner;
pub use squat_analysis_service::SquatAnalysisService;
