//! Dualpress engine: runs the external compressor and feeds its progress back.
mod bus;
mod engine;
mod estimate;
mod launcher;
mod parse;
mod script;
mod simulate;
mod ticker;
mod types;

pub use bus::{NotificationBus, DEFAULT_CAPACITY};
pub use engine::{EngineEvents, EngineHandle};
pub use estimate::{OutputProgress, STEP_CEILING, STEP_PERCENT};
pub use launcher::{line_event, ChannelProgressSink, JobLauncher, ProgressSink};
pub use parse::{classify, parse_line, ParsedLine};
pub use script::{ScriptLauncher, ScriptSettings, JOBS_ENV_VAR};
pub use simulate::SimulatedLauncher;
pub use ticker::run_ticker;
pub use types::{EngineEvent, FailureKind, JobId, LaunchRequest, OutputLevel};

pub use tokio_util::sync::CancellationToken;
