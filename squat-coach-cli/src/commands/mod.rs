mod analyze;
mod config_cmd;
mod trim;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use squat_coach::models::{parse_detection_stream, PoseFrame};
use squat_coach::AnalysisError;

use crate::config::Config;

pub use analyze::AnalyzeCommand;
pub use trim::TrimCommand;

#[derive(Parser)]
#[command(name = "squat-coach")]
#[command(about = "Barbell back squat form analysis from pose landmarks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "SQUAT_COACH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a landmark file and print the form report
    Analyze(AnalyzeCommand),

    /// Crop a landmark file to the detected reps
    Trim(TrimCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = self.config.as_deref();

        match self.command {
            Commands::Analyze(cmd) => cmd.execute(&Config::load(config_path)?),
            Commands::Trim(cmd) => cmd.execute(&Config::load(config_path)?),
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path),
                ConfigSubcommands::Path => config_cmd::show_path(config_path),
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Read a landmark provider JSON file, keeping only frames with a detection
pub fn read_frames(path: &Path) -> Result<Vec<PoseFrame>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read landmark file {}", path.display()))?;
    let frames = parse_detection_stream(&contents)
        .with_context(|| format!("Invalid landmark file {}", path.display()))?;

    tracing::info!("Loaded {} frames with a detected person from {}", frames.len(), path.display());
    Ok(frames)
}

/// Print a pipeline error with its guidance; the returned error only names the step
fn report_failure(step: &str, err: &AnalysisError) -> anyhow::Error {
    eprintln!("{} {}", "✗".red(), err);
    eprintln!("  {}", err.user_guidance());
    anyhow::anyhow!("{step} failed")
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
