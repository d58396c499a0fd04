use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dualpress_logging::{dp_debug, dp_error, dp_warn};
use tokio_util::sync::CancellationToken;

use crate::launcher::ChannelProgressSink;
use crate::ticker::run_ticker;
use crate::{EngineEvent, JobId, JobLauncher, LaunchRequest};

enum EngineCommand {
    Launch {
        job_id: JobId,
        request: LaunchRequest,
    },
    Cancel {
        job_id: JobId,
    },
    StartTicker {
        period: Duration,
    },
    StopTicker,
}

/// Command side of the engine thread. Cheap to clone; the thread exits once
/// every handle is dropped, cancelling whatever is still running.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Event side of the engine thread.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(launcher: Arc<dyn JobLauncher>) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    dp_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut jobs: HashMap<JobId, CancellationToken> = HashMap::new();
            let mut ticker: Option<CancellationToken> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Launch { job_id, request } => {
                        // Finished jobs cancel their own token.
                        jobs.retain(|_, token| !token.is_cancelled());
                        let token = CancellationToken::new();
                        jobs.insert(job_id, token.clone());
                        let launcher = launcher.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run_job(launcher.as_ref(), job_id, request, event_tx, token).await;
                        });
                    }
                    EngineCommand::Cancel { job_id } => match jobs.remove(&job_id) {
                        Some(token) => token.cancel(),
                        None => dp_debug!("Cancel for unknown or finished job {}", job_id),
                    },
                    EngineCommand::StartTicker { period } => {
                        let token = CancellationToken::new();
                        if let Some(previous) = ticker.replace(token.clone()) {
                            previous.cancel();
                        }
                        let sink = ChannelProgressSink::new(event_tx.clone());
                        runtime.spawn(async move {
                            run_ticker(period, &sink, token).await;
                        });
                    }
                    EngineCommand::StopTicker => {
                        if let Some(token) = ticker.take() {
                            token.cancel();
                        }
                    }
                }
            }

            for token in jobs.values() {
                token.cancel();
            }
            if let Some(token) = ticker {
                token.cancel();
            }
        });

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn launch(&self, job_id: JobId, request: LaunchRequest) {
        self.send(EngineCommand::Launch { job_id, request });
    }

    /// Fire-and-forget; the job reports `FailureKind::Cancelled` when it
    /// notices.
    pub fn cancel(&self, job_id: JobId) {
        self.send(EngineCommand::Cancel { job_id });
    }

    pub fn start_ticker(&self, period: Duration) {
        self.send(EngineCommand::StartTicker { period });
    }

    pub fn stop_ticker(&self) {
        self.send(EngineCommand::StopTicker);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            dp_warn!("Engine thread is gone; command dropped");
        }
    }
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Blocks until the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn run_job(
    launcher: &dyn JobLauncher,
    job_id: JobId,
    request: LaunchRequest,
    event_tx: mpsc::Sender<EngineEvent>,
    token: CancellationToken,
) {
    let sink = ChannelProgressSink::new(event_tx.clone());
    let event = match launcher.run(job_id, &request, &sink, token.clone()).await {
        Ok(()) => EngineEvent::Completed { job_id },
        Err(failure) => {
            dp_warn!("Job {} failed: {}", job_id, failure);
            EngineEvent::Failed { job_id, failure }
        }
    };
    token.cancel();
    let _ = event_tx.send(event);
}
