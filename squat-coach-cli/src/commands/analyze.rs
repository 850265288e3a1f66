use anyhow::Result;
use clap::Args;
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

use squat_coach::models::{AnalysisResult, MetricKind, MetricScore, Rating};
use squat_coach::SquatAnalysisService;

use crate::config::{Config, OutputFormat};

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Landmark JSON file (array of {timestamp, landmarks})
    input: PathBuf,

    /// Output format, overrides the config file
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

impl AnalyzeCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        if !config.output.color {
            colored::control::set_override(false);
        }

        let frames = super::read_frames(&self.input)?;
        let service = SquatAnalysisService::new(config.analysis.clone());

        let result = service
            .analyze(&frames)
            .map_err(|err| super::report_failure("Analysis", &err))?;

        match self.format.unwrap_or(config.output.format) {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Text => print!("{}", render_report(&result)),
        }

        Ok(())
    }
}

fn rating_label(rating: Rating) -> ColoredString {
    let label = rating.to_string();
    match rating {
        Rating::Green => label.green(),
        Rating::Yellow => label.yellow(),
        Rating::Red => label.red().bold(),
    }
}

fn score_cell(score: Option<&MetricScore>) -> ColoredString {
    match score {
        Some(score) => {
            let cell = format!("{:>5}", score.score);
            match score.rating {
                Rating::Green => cell.green(),
                Rating::Yellow => cell.yellow(),
                Rating::Red => cell.red(),
            }
        }
        None => format!("{:>5}", "-").normal(),
    }
}

/// Plain-text report: overview, overall metrics, per-rep scores and flagged issues
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Squat Analysis".bold()));
    out.push_str("────────────────────────────────\n");
    out.push_str(&format!(
        "Reps: {}   Camera: {}   Exercise: {}\n",
        result.rep_count, result.camera_angle, result.exercise_type
    ));
    out.push_str(&format!("Overall score: {:.0}\n\n", result.overall_score()));

    out.push_str(&format!(
        "{:<20} {:>5}  {:<7} {:<10} {}\n",
        "Metric", "Score", "Rating", "Confidence", "Summary"
    ));
    for (kind, score) in &result.overall {
        out.push_str(&format!(
            "{:<20} {}  {:<7} {:<10} {}\n",
            kind.label(),
            score_cell(Some(score)),
            rating_label(score.rating),
            score.confidence.to_string(),
            score.summary
        ));
    }

    out.push('\n');
    out.push_str(&format!("{:<20}", "Per rep"));
    for rep in &result.reps {
        out.push_str(&format!(" {:>5}", format!("#{}", rep.rep_number)));
    }
    out.push('\n');
    for kind in MetricKind::ALL {
        out.push_str(&format!("{:<20}", kind.label()));
        for rep in &result.reps {
            out.push_str(&format!(" {}", score_cell(rep.metric(kind))));
        }
        out.push('\n');
    }

    let flagged = result.flagged_metrics();
    if !flagged.is_empty() {
        out.push('\n');
        out.push_str(&format!("{}\n", "Needs work".red().bold()));
        for (kind, score) in flagged {
            out.push_str(&format!("  • {}: {}\n", kind.label(), score.summary));
            if !score.issue_frames.is_empty() {
                let frames: Vec<String> = score.issue_frames.iter().map(|f| f.to_string()).collect();
                out.push_str(&format!("    frames {}\n", frames.join(", ")));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use squat_coach::models::{CameraAngle, ExerciseType, RepData};
    use std::collections::BTreeMap;

    fn sample_result() -> AnalysisResult {
        let mut metrics = BTreeMap::new();
        metrics.insert(MetricKind::Depth, MetricScore::new(92.0, "Hip crease below the knee", vec![]));
        metrics.insert(MetricKind::KneeTracking, MetricScore::new(30.0, "Knees drifted", vec![40, 41]));

        let rep = RepData {
            rep_number: 1,
            start_frame: 0,
            bottom_frame: 15,
            end_frame: 30,
            start_time: 0.0,
            bottom_time: 0.5,
            end_time: 1.0,
            metrics: metrics.clone(),
        };

        AnalysisResult {
            reps: vec![rep],
            overall: metrics,
            rep_count: 1,
            exercise_type: ExerciseType::Squat,
            camera_angle: CameraAngle::Frontal,
        }
    }

    #[test]
    fn test_report_lists_metrics_and_flags() {
        colored::control::set_override(false);
        let report = render_report(&sample_result());

        assert!(report.contains("Reps: 1   Camera: frontal   Exercise: squat"));
        assert!(report.contains("Depth"));
        assert!(report.contains("Knee tracking"));
        assert!(report.contains("Needs work"));
        assert!(report.contains("frames 40, 41"));
    }
}
