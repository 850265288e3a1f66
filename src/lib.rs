//! Squat form analysis from per-frame body landmarks.
//!
//! The pipeline conditions a raw landmark stream, segments it into
//! repetitions, classifies camera angle and exercise type, scores eighteen
//! biomechanical metrics per rep and aggregates them into one report.
//!
//! ```no_run
//! use squat_coach::{AnalysisConfig, SquatAnalysisService};
//!
//! # fn run(frames: Vec<squat_coach::models::PoseFrame>) -> Result<(), squat_coach::AnalysisError> {
//! let service = SquatAnalysisService::new(AnalysisConfig::default());
//! let result = service.analyze(&frames)?;
//! println!("{} reps, depth {:?}", result.rep_count, result.overall_metric(squat_coach::models::MetricKind::Depth));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use services::SquatAnalysisService;
