use std::fmt;

use thiserror::Error;

use crate::{ConfigField, Phase, TrackId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing {0}")]
    MissingField(ConfigField),
    #[error("target size must be greater than zero")]
    ZeroTargetSize,
    #[error("parallelism must be at least 1")]
    ZeroParallelism,
}

/// Commands a presentation layer can issue against the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Start => f.write_str("start"),
            Command::Stop => f.write_str("stop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid job configuration: {0}")]
    Validation(#[from] ValidationError),
    #[error("cannot {command} while {phase}")]
    InvalidStateTransition { command: Command, phase: Phase },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidProgressError {
    #[error("progress {percent} for track {track} is outside 0..=100")]
    OutOfRange { track: TrackId, percent: f64 },
    #[error("progress for track {track} went backwards ({current} -> {attempted})")]
    Regressed {
        track: TrackId,
        current: f64,
        attempted: f64,
    },
    #[error("unknown track {0}")]
    UnknownTrack(TrackId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCountsError {
    #[error("processed count {processed} exceeds total {total}")]
    ProcessedExceedsTotal { processed: u64, total: u64 },
    #[error("total count lowered from {previous} to {attempted}")]
    TotalDecreased { previous: u64, attempted: u64 },
}

/// A malformed signal from the external job. The signal is dropped and the
/// job keeps running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error(transparent)]
    Progress(#[from] InvalidProgressError),
    #[error(transparent)]
    Counts(#[from] InvalidCountsError),
}
