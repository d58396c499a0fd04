use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    EngineEvent, FailureKind, JobId, JobLauncher, LaunchRequest, OutputLevel, ProgressSink,
};

/// Stand-in for the real compressor: walks a fixed number of files, the
/// primary track one file ahead of the secondary one.
#[derive(Debug, Clone)]
pub struct SimulatedLauncher {
    total_files: u64,
    step_delay: Duration,
    primary_track: String,
    secondary_track: String,
}

impl SimulatedLauncher {
    pub fn new(total_files: u64, step_delay: Duration) -> Self {
        Self {
            total_files,
            step_delay,
            primary_track: "jpeg".to_string(),
            secondary_track: "png".to_string(),
        }
    }

    pub fn with_tracks(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary_track = primary.into();
        self.secondary_track = secondary.into();
        self
    }

    fn percent(done: u64, total: u64) -> f64 {
        (done as f64 / total as f64 * 100.0).min(100.0)
    }
}

#[async_trait::async_trait]
impl JobLauncher for SimulatedLauncher {
    async fn run(
        &self,
        job_id: JobId,
        request: &LaunchRequest,
        sink: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Result<(), FailureKind> {
        let total = self.total_files;
        sink.emit(EngineEvent::Output {
            job_id,
            line: format!(
                "Initializing compression of {} ({})",
                request.input_dir.display(),
                request.size_arg
            ),
            level: OutputLevel::Info,
        });
        pause(self.step_delay, &cancel).await?;
        sink.emit(EngineEvent::FileCounts {
            job_id,
            processed: 0,
            total,
        });

        for i in 0..total {
            sink.emit(EngineEvent::TrackProgress {
                job_id,
                track: self.primary_track.clone(),
                percent: Self::percent(i + 1, total),
            });
            sink.emit(EngineEvent::TrackProgress {
                job_id,
                track: self.secondary_track.clone(),
                percent: Self::percent(i, total),
            });
            sink.emit(EngineEvent::FileCounts {
                job_id,
                processed: i + 1,
                total,
            });
            pause(self.step_delay, &cancel).await?;
        }

        sink.emit(EngineEvent::TrackProgress {
            job_id,
            track: self.secondary_track.clone(),
            percent: 100.0,
        });
        Ok(())
    }
}

async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<(), FailureKind> {
    tokio::select! {
        _ = cancel.cancelled() => Err(FailureKind::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
