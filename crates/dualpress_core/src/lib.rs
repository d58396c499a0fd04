//! Dualpress core: pure job-progress state machine and view-model helpers.
mod clock;
mod config;
mod effect;
mod error;
mod event_log;
mod msg;
mod progress;
mod state;
mod timer;
mod update;
mod view_model;

pub use clock::Clock;
pub use config::{ConfigField, JobConfiguration, Preset, SizeUnit, TargetSize};
pub use effect::{Effect, Notification};
pub use error::{
    Command, CommandError, InvalidCountsError, InvalidProgressError, SignalError,
    ValidationError,
};
pub use event_log::{EventLog, LogEntry, Severity};
pub use msg::{Msg, ProgressSignal};
pub use progress::{ProgressTracker, TrackId};
pub use state::{AppState, ControllerSettings, JobId, Phase};
pub use timer::{format_elapsed, ElapsedTimer, TICK_PERIOD};
pub use update::update;
pub use view_model::{AppViewModel, TrackView, UNKNOWN_REMAINING};
