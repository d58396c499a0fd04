use crate::{JobConfiguration, JobId, Severity, TrackId};

/// Normalized progress information emitted by the external job.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressSignal {
    TrackProgress { track: TrackId, percent: f64 },
    FileCounts { processed: u64, total: u64 },
    JobCompleted,
    JobFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked to start a job with the given configuration.
    StartClicked(JobConfiguration),
    /// User asked to cancel the running job.
    StopClicked,
    /// User cleared the event log.
    ClearLogClicked,
    /// Progress signal from the external job.
    Signal { job_id: JobId, signal: ProgressSignal },
    /// Free-form output line from the external job, already classified.
    JobOutput {
        job_id: JobId,
        line: String,
        severity: Severity,
    },
    /// Periodic timer tick.
    Tick,
}
