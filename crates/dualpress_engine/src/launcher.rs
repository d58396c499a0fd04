use std::sync::mpsc;

use crate::parse::{parse_line, ParsedLine};
use crate::{EngineEvent, FailureKind, JobId, LaunchRequest};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Runs one compression job to its end.
///
/// `Ok(())` means the job completed. Implementations must return promptly
/// with `FailureKind::Cancelled` once `cancel` fires.
#[async_trait::async_trait]
pub trait JobLauncher: Send + Sync {
    async fn run(
        &self,
        job_id: JobId,
        request: &LaunchRequest,
        sink: &dyn ProgressSink,
        cancel: tokio_util::sync::CancellationToken,
    ) -> Result<(), FailureKind>;
}

/// Turns one raw output line into the matching engine event. Blank lines
/// yield nothing.
pub fn line_event(job_id: JobId, line: &str) -> Option<EngineEvent> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return None;
    }
    let event = match parse_line(line) {
        ParsedLine::TrackProgress { track, percent } => EngineEvent::TrackProgress {
            job_id,
            track,
            percent,
        },
        ParsedLine::FileCounts { processed, total } => EngineEvent::FileCounts {
            job_id,
            processed,
            total,
        },
        ParsedLine::Output(level) => EngineEvent::Output {
            job_id,
            line: line.to_string(),
            level,
        },
    };
    Some(event)
}
