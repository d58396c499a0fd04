use std::path::PathBuf;

pub type JobId = u64;

/// Parameters handed to the external compressor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Size flag in the form the script expects, e.g. `-k300`.
    pub size_arg: String,
    pub parallelism: u32,
}

/// Severity the engine assigns to a free-form output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TrackProgress {
        job_id: JobId,
        track: String,
        percent: f64,
    },
    FileCounts {
        job_id: JobId,
        processed: u64,
        total: u64,
    },
    Output {
        job_id: JobId,
        line: String,
        level: OutputLevel,
    },
    Completed {
        job_id: JobId,
    },
    Failed {
        job_id: JobId,
        failure: FailureKind,
    },
    /// Periodic display tick.
    Tick,
}

/// Why a job ended without completing. The display text becomes the
/// job-failed reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind {
    #[error("script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),
    #[error("input directory does not exist: {}", .0.display())]
    InputMissing(PathBuf),
    #[error("failed to start script: {0}")]
    Spawn(String),
    #[error("exit code {0}")]
    ExitCode(i32),
    #[error("terminated by signal")]
    Terminated,
    #[error("io error: {0}")]
    Io(String),
    #[error("cancelled")]
    Cancelled,
}
