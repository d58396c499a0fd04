use std::fmt;

use dualpress_logging::{dp_debug, dp_error, dp_info, set_current_job};
use serde::Serialize;

use crate::timer::TICK_PERIOD;
use crate::view_model::{AppViewModel, TrackView};
use crate::{
    format_elapsed, Clock, Command, CommandError, Effect, ElapsedTimer, EventLog,
    JobConfiguration, Notification, ProgressSignal, ProgressTracker, Severity, SignalError,
    TrackId,
};

pub type JobId = u64;

const BANNER: &str = "============================================================";

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::Cancelled)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
            Phase::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// The two output variants, in display order.
    pub tracks: Vec<TrackId>,
    /// Count-based progress is written to the event log every this many files.
    pub report_every: u64,
    /// Maximum number of retained log entries; unbounded when `None`.
    pub log_capacity: Option<usize>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tracks: vec![TrackId::from("jpeg"), TrackId::from("png")],
            report_every: 5,
            log_capacity: None,
        }
    }
}

/// The job controller: sole owner of the job state, the progress tracker,
/// the event log and the timer.
#[derive(Debug, Clone)]
pub struct AppState {
    clock: Clock,
    settings: ControllerSettings,
    phase: Phase,
    next_job_id: JobId,
    active_job: Option<JobId>,
    config: Option<JobConfiguration>,
    tracker: ProgressTracker,
    log: EventLog,
    timer: ElapsedTimer,
    last_reported: u64,
    last_error: Option<String>,
    notifications: Vec<Notification>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_clock(Clock::system(), ControllerSettings::default())
    }

    pub fn with_clock(clock: Clock, settings: ControllerSettings) -> Self {
        let log = match settings.log_capacity {
            Some(capacity) => EventLog::bounded(clock.clone(), capacity),
            None => EventLog::new(clock.clone()),
        };
        Self {
            tracker: ProgressTracker::new(settings.tracks.iter().cloned()),
            timer: ElapsedTimer::new(clock.clone()),
            log,
            clock,
            settings,
            phase: Phase::Idle,
            next_job_id: 1,
            active_job: None,
            config: None,
            last_reported: 0,
            last_error: None,
            notifications: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The job whose signals are currently accepted.
    pub fn active_job(&self) -> Option<JobId> {
        self.active_job
    }

    pub fn config(&self) -> Option<&JobConfiguration> {
        self.config.as_ref()
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn timer(&self) -> &ElapsedTimer {
        &self.timer
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// Returns and clears the notifications queued since the last call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn start(&mut self, config: JobConfiguration) -> Result<Vec<Effect>, CommandError> {
        if self.phase == Phase::Running {
            return Err(CommandError::InvalidStateTransition {
                command: Command::Start,
                phase: self.phase,
            });
        }
        if let Err(err) = config.validate() {
            self.append_log(format!("Cannot start: {err}"), Severity::Error);
            return Err(err.into());
        }

        let job_id = self.next_job_id;
        self.next_job_id += 1;
        self.active_job = Some(job_id);
        set_current_job(Some(job_id));

        self.tracker.reset();
        self.last_reported = 0;
        self.timer.start();
        self.log_run_header(&config);
        self.set_phase(Phase::Running);
        dp_info!(
            "Job started: input={:?} output={:?} size={} parallelism={}",
            config.input_location,
            config.output_location,
            config.target_size,
            config.parallelism
        );
        self.config = Some(config.clone());

        Ok(vec![
            Effect::StartTicker {
                period: TICK_PERIOD,
            },
            Effect::LaunchJob { job_id, config },
        ])
    }

    pub fn stop(&mut self) -> Result<Vec<Effect>, CommandError> {
        let job_id = match (self.phase, self.active_job) {
            (Phase::Running, Some(job_id)) => job_id,
            (phase, _) => {
                return Err(CommandError::InvalidStateTransition {
                    command: Command::Stop,
                    phase,
                })
            }
        };

        self.timer.stop();
        self.append_log("Compression cancelled", Severity::Warning);
        self.finish(Phase::Cancelled);
        Ok(vec![Effect::StopTicker, Effect::CancelJob { job_id }])
    }

    pub fn clear_log(&mut self) {
        let entry = self.log.clear().clone();
        self.notifications.push(Notification::LogCleared);
        self.notifications.push(Notification::LogAppended(entry));
    }

    /// Applies one signal from the external job. Signals for another job, or
    /// arriving while not running, are ignored. A malformed signal is written
    /// to the event log and dropped; the job keeps running.
    pub fn apply_signal(
        &mut self,
        job_id: JobId,
        signal: ProgressSignal,
    ) -> Result<Vec<Effect>, SignalError> {
        if !self.accepts(job_id) {
            dp_debug!(
                "Ignoring signal for job {} in phase {}: {:?}",
                job_id,
                self.phase,
                signal
            );
            return Ok(Vec::new());
        }

        match signal {
            ProgressSignal::TrackProgress { track, percent } => {
                if let Err(err) = self.tracker.set_track_progress(&track, percent) {
                    return Err(self.reject_signal(err.into()));
                }
                self.notifications
                    .push(Notification::TrackProgress { track, percent });
                Ok(Vec::new())
            }
            ProgressSignal::FileCounts { processed, total } => {
                let previous_total = self.tracker.total();
                if let Err(err) = self.tracker.set_counts(processed, total) {
                    return Err(self.reject_signal(err.into()));
                }
                self.notifications
                    .push(Notification::CountsChanged { processed, total });
                self.report_counts(previous_total, processed, total);
                Ok(Vec::new())
            }
            ProgressSignal::JobCompleted => {
                self.timer.stop();
                self.append_log(BANNER, Severity::Success);
                self.append_log("Compression completed successfully", Severity::Success);
                let output_line = self
                    .config
                    .as_ref()
                    .map(|config| format!("Output: {}", config.output_location.display()));
                if let Some(line) = output_line {
                    self.append_log(line, Severity::Success);
                }
                self.append_log(BANNER, Severity::Success);
                self.finish(Phase::Completed);
                Ok(vec![Effect::StopTicker])
            }
            ProgressSignal::JobFailed { reason } => {
                self.timer.stop();
                self.append_log(format!("Compression failed: {reason}"), Severity::Error);
                self.finish(Phase::Failed);
                Ok(vec![Effect::StopTicker])
            }
        }
    }

    /// Appends a classified output line of the running job.
    pub fn apply_output(&mut self, job_id: JobId, line: String, severity: Severity) {
        if self.accepts(job_id) {
            self.append_log(line, severity);
        } else {
            dp_debug!("Ignoring output for job {}: {}", job_id, line);
        }
    }

    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let elapsed = self.timer.tick();
        let remaining = self.tracker.estimated_remaining(elapsed);
        self.notifications.push(Notification::TimerTick {
            elapsed_ms: elapsed.num_milliseconds(),
            remaining_ms: remaining.map(|r| r.num_milliseconds()),
        });
    }

    pub fn view(&self) -> AppViewModel {
        let elapsed = self.timer.elapsed();
        let remaining = self.tracker.estimated_remaining(elapsed);
        AppViewModel {
            phase: self.phase,
            job_id: self.active_job,
            tracks: self
                .tracker
                .tracks()
                .map(|(track, percent)| TrackView {
                    track: track.clone(),
                    percent,
                })
                .collect(),
            processed: self.tracker.processed(),
            total: self.tracker.total(),
            elapsed_ms: elapsed.num_milliseconds(),
            elapsed_text: format_elapsed(elapsed),
            remaining_ms: remaining.map(|r| r.num_milliseconds()),
            remaining_text: remaining.map(format_elapsed),
            log: self.log.entries().cloned().collect(),
            last_error: self.last_error.clone(),
        }
    }

    fn accepts(&self, job_id: JobId) -> bool {
        self.phase == Phase::Running && self.active_job == Some(job_id)
    }

    fn reject_signal(&mut self, err: SignalError) -> SignalError {
        dp_error!("Dropping malformed signal: {}", err);
        self.append_log(format!("Invalid progress signal: {err}"), Severity::Error);
        err
    }

    fn report_counts(&mut self, previous_total: Option<u64>, processed: u64, total: u64) {
        if previous_total.is_none() {
            self.append_log(format!("Found {total} images"), Severity::Info);
        }
        let every = self.settings.report_every.max(1);
        let crossed_boundary = processed / every > self.last_reported / every;
        let reached_total = processed == total && processed > self.last_reported;
        if crossed_boundary || reached_total {
            self.append_log(
                format!("Processed {processed}/{total} files"),
                Severity::Info,
            );
            self.last_reported = processed;
        }
    }

    fn log_run_header(&mut self, config: &JobConfiguration) {
        let lines = [
            BANNER.to_string(),
            "Starting compression".to_string(),
            format!("Input: {}", config.input_location.display()),
            format!("Output: {}", config.output_location.display()),
            format!("Target size: {}", config.target_size),
            format!("Parallel jobs: {}", config.parallelism),
            BANNER.to_string(),
        ];
        for line in lines {
            self.append_log(line, Severity::Info);
        }
    }

    fn finish(&mut self, terminal: Phase) {
        self.set_phase(terminal);
        self.config = None;
        dp_info!("Job finished as {}", terminal);
        set_current_job(None);
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        self.notifications
            .push(Notification::PhaseChanged { from, to });
    }

    fn append_log(&mut self, message: impl Into<String>, severity: Severity) {
        let entry = self.log.append(message, severity).clone();
        self.notifications.push(Notification::LogAppended(entry));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
