use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dualpress_core::{ControllerSettings, TargetSize, TrackId};
use dualpress_engine::{ScriptSettings, JOBS_ENV_VAR};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

/// User settings, read from a RON file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub output_dir: PathBuf,
    pub target_size: TargetSize,
    pub parallelism: u32,
    pub script_path: PathBuf,
    pub interpreter: Option<PathBuf>,
    pub jobs_env_var: String,
    pub tracks: (String, String),
    pub report_every: u64,
    pub log_capacity: Option<usize>,
    pub log_destination: LogDestination,
    /// Delay between simulated files.
    pub simulation_step_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./dual_compressed"),
            target_size: TargetSize::default(),
            parallelism: 20,
            script_path: ScriptSettings::default().script_path,
            interpreter: None,
            jobs_env_var: JOBS_ENV_VAR.to_string(),
            tracks: ("jpeg".to_string(), "png".to_string()),
            report_every: 5,
            log_capacity: None,
            log_destination: LogDestination::File,
            simulation_step_ms: 200,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse settings from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

impl AppSettings {
    /// Loads settings from `path`. A missing file yields `Ok(None)` so the
    /// caller can fall back to defaults once logging is up.
    pub fn load(path: &Path) -> Result<Option<Self>, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content)
            .map(Some)
            .map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            tracks: vec![
                TrackId::from(self.tracks.0.as_str()),
                TrackId::from(self.tracks.1.as_str()),
            ],
            report_every: self.report_every,
            log_capacity: self.log_capacity,
        }
    }

    pub fn script_settings(&self) -> ScriptSettings {
        ScriptSettings {
            script_path: self.script_path.clone(),
            interpreter: self.interpreter.clone(),
            jobs_env_var: self.jobs_env_var.clone(),
            tracks: [self.tracks.0.clone(), self.tracks.1.clone()],
        }
    }
}
