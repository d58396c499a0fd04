use std::time::Duration;

use crate::{JobConfiguration, JobId, LogEntry, Phase, TrackId};

/// Side effects requested by the state machine; executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LaunchJob {
        job_id: JobId,
        config: JobConfiguration,
    },
    /// Best-effort, fire-and-forget.
    CancelJob { job_id: JobId },
    StartTicker { period: Duration },
    StopTicker,
}

/// State-change notifications, in the order they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    PhaseChanged { from: Phase, to: Phase },
    TrackProgress { track: TrackId, percent: f64 },
    CountsChanged { processed: u64, total: u64 },
    LogAppended(LogEntry),
    LogCleared,
    TimerTick {
        elapsed_ms: i64,
        remaining_ms: Option<i64>,
    },
}
