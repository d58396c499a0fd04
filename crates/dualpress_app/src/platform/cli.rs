use std::path::PathBuf;

use clap::Parser;
use dualpress_core::{JobConfiguration, Preset, SizeUnit, TargetSize};

use super::logging::LogDestination;
use super::settings::AppSettings;

#[derive(Parser, Debug)]
#[command(name = "dualpress", version)]
#[command(about = "Supervise a dual-output image compression run", long_about = None)]
pub struct Cli {
    /// Directory containing the source images
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Directory receiving the compressed variants
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Target size value, e.g. 300
    #[arg(short, long)]
    pub size: Option<u32>,

    /// Target size unit: kilobyte or megabyte
    #[arg(short, long)]
    pub unit: Option<SizeUnit>,

    /// Quick setting for the target size (web, social, standard, quality, print)
    #[arg(short, long, conflicts_with_all = ["size", "unit"])]
    pub preset: Option<Preset>,

    /// Parallel compression jobs passed to the script
    #[arg(short, long)]
    pub jobs: Option<u32>,

    /// Compressor script to run
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Run the script through this interpreter, e.g. bash
    #[arg(long, value_name = "PROGRAM")]
    pub interpreter: Option<PathBuf>,

    /// Simulate a run over this many files instead of starting the script
    #[arg(long, value_name = "FILES")]
    pub simulate: Option<u64>,

    /// Settings file in RON format [default: dualpress.ron]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where diagnostics go
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Debug-level diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the final state as JSON when the run ends
    #[arg(long)]
    pub json: bool,
}

pub const DEFAULT_SETTINGS_FILE: &str = "dualpress.ron";

impl Cli {
    pub fn settings_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Command-line values override the settings file.
    pub fn apply_overrides(&self, settings: &mut AppSettings) {
        if let Some(script) = &self.script {
            settings.script_path = script.clone();
        }
        if let Some(interpreter) = &self.interpreter {
            settings.interpreter = Some(interpreter.clone());
        }
        if let Some(log) = self.log {
            settings.log_destination = log;
        }
    }

    pub fn job_configuration(&self, settings: &AppSettings) -> JobConfiguration {
        let target_size = match self.preset {
            Some(preset) => preset.target_size(),
            None => TargetSize::new(
                self.size.unwrap_or(settings.target_size.value),
                self.unit.unwrap_or(settings.target_size.unit),
            ),
        };
        JobConfiguration::new(
            self.input.clone().unwrap_or_default(),
            self.output
                .clone()
                .unwrap_or_else(|| settings.output_dir.clone()),
            target_size,
            self.jobs.unwrap_or(settings.parallelism),
        )
    }
}
