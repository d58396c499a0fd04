use std::sync::mpsc;
use std::thread;

use dualpress_core::{Effect, JobConfiguration, Msg, ProgressSignal, Severity, TrackId};
use dualpress_engine::{EngineEvent, EngineEvents, EngineHandle, LaunchRequest, OutputLevel};
use dualpress_logging::{dp_debug, dp_info};

/// Carries out the effects returned by `update` against the engine thread.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    /// Takes ownership of the engine's event side and forwards every event
    /// into the controller's inbox as a `Msg`.
    pub fn new(engine: EngineHandle, events: EngineEvents, msg_tx: mpsc::Sender<Msg>) -> Self {
        spawn_event_loop(events, msg_tx);
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LaunchJob { job_id, config } => {
                    let request = launch_request(&config);
                    dp_info!(
                        "LaunchJob job_id={} size_arg={} parallelism={}",
                        job_id,
                        request.size_arg,
                        request.parallelism
                    );
                    self.engine.launch(job_id, request);
                }
                Effect::CancelJob { job_id } => {
                    dp_info!("CancelJob job_id={}", job_id);
                    self.engine.cancel(job_id);
                }
                Effect::StartTicker { period } => self.engine.start_ticker(period),
                Effect::StopTicker => self.engine.stop_ticker(),
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                dp_debug!("Controller inbox closed; stopping event loop");
                break;
            }
        }
    });
}

pub(crate) fn launch_request(config: &JobConfiguration) -> LaunchRequest {
    LaunchRequest {
        input_dir: config.input_location.clone(),
        output_dir: config.output_location.clone(),
        size_arg: config.target_size.script_arg(),
        parallelism: config.parallelism,
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::TrackProgress {
            job_id,
            track,
            percent,
        } => Msg::Signal {
            job_id,
            signal: ProgressSignal::TrackProgress {
                track: TrackId::from(track.as_str()),
                percent,
            },
        },
        EngineEvent::FileCounts {
            job_id,
            processed,
            total,
        } => Msg::Signal {
            job_id,
            signal: ProgressSignal::FileCounts { processed, total },
        },
        EngineEvent::Output {
            job_id,
            line,
            level,
        } => Msg::JobOutput {
            job_id,
            line,
            severity: map_level(level),
        },
        EngineEvent::Completed { job_id } => Msg::Signal {
            job_id,
            signal: ProgressSignal::JobCompleted,
        },
        EngineEvent::Failed { job_id, failure } => Msg::Signal {
            job_id,
            signal: ProgressSignal::JobFailed {
                reason: failure.to_string(),
            },
        },
        EngineEvent::Tick => Msg::Tick,
    }
}

fn map_level(level: OutputLevel) -> Severity {
    match level {
        OutputLevel::Info => Severity::Info,
        OutputLevel::Success => Severity::Success,
        OutputLevel::Warning => Severity::Warning,
        OutputLevel::Error => Severity::Error,
    }
}
