use serde::Serialize;

use crate::{JobId, LogEntry, Phase, TrackId};

/// Placeholder shown while the remaining time cannot be estimated.
pub const UNKNOWN_REMAINING: &str = "--:--";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppViewModel {
    pub phase: Phase,
    pub job_id: Option<JobId>,
    pub tracks: Vec<TrackView>,
    pub processed: u64,
    pub total: Option<u64>,
    pub elapsed_ms: i64,
    pub elapsed_text: String,
    pub remaining_ms: Option<i64>,
    pub remaining_text: Option<String>,
    pub log: Vec<LogEntry>,
    pub last_error: Option<String>,
}

impl AppViewModel {
    pub fn remaining_display(&self) -> &str {
        self.remaining_text.as_deref().unwrap_or(UNKNOWN_REMAINING)
    }

    pub fn track_percent(&self, track: &str) -> Option<f64> {
        self.tracks
            .iter()
            .find(|view| view.track.as_str() == track)
            .map(|view| view.percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackView {
    pub track: TrackId,
    pub percent: f64,
}
