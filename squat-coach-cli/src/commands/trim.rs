use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use squat_coach::SquatAnalysisService;

use crate::config::Config;

#[derive(Args)]
pub struct TrimCommand {
    /// Landmark JSON file (array of {timestamp, landmarks})
    input: PathBuf,

    /// Write the trimmed clip here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl TrimCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        if !config.output.color {
            colored::control::set_override(false);
        }

        let frames = super::read_frames(&self.input)?;
        let service = SquatAnalysisService::new(config.analysis.clone());

        let conditioned = service.condition(&frames);
        let clip = service
            .trim(&conditioned)
            .map_err(|err| super::report_failure("Trim", &err))?;

        let json = serde_json::to_string_pretty(&clip)?;
        match self.output {
            Some(path) => {
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} Trimmed to frames {}-{} ({:.2}s - {:.2}s), written to {}",
                    "✓".green(),
                    clip.start_frame,
                    clip.end_frame,
                    clip.start_time,
                    clip.end_time,
                    path.display()
                );
            }
            None => println!("{}", json),
        }

        Ok(())
    }
}
