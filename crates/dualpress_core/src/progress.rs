use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{InvalidCountsError, InvalidProgressError};

/// Identifier of one output variant ("track") of the job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Per-track completion percentages plus processed/total file counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTracker {
    tracks: Vec<(TrackId, f64)>,
    processed: u64,
    total: Option<u64>,
}

impl ProgressTracker {
    pub fn new(tracks: impl IntoIterator<Item = TrackId>) -> Self {
        Self {
            tracks: tracks.into_iter().map(|track| (track, 0.0)).collect(),
            processed: 0,
            total: None,
        }
    }

    /// Zeroes every track and forgets the counts.
    pub fn reset(&mut self) {
        for (_, percent) in &mut self.tracks {
            *percent = 0.0;
        }
        self.processed = 0;
        self.total = None;
    }

    pub fn set_track_progress(
        &mut self,
        track: &TrackId,
        percent: f64,
    ) -> Result<(), InvalidProgressError> {
        let current = self
            .tracks
            .iter_mut()
            .find(|(id, _)| id == track)
            .map(|(_, current)| current)
            .ok_or_else(|| InvalidProgressError::UnknownTrack(track.clone()))?;

        if !(0.0..=100.0).contains(&percent) {
            return Err(InvalidProgressError::OutOfRange {
                track: track.clone(),
                percent,
            });
        }
        if percent < *current {
            return Err(InvalidProgressError::Regressed {
                track: track.clone(),
                current: *current,
                attempted: percent,
            });
        }
        *current = percent;
        Ok(())
    }

    pub fn set_counts(&mut self, processed: u64, total: u64) -> Result<(), InvalidCountsError> {
        if processed > total {
            return Err(InvalidCountsError::ProcessedExceedsTotal { processed, total });
        }
        if let Some(previous) = self.total {
            if total < previous {
                return Err(InvalidCountsError::TotalDecreased {
                    previous,
                    attempted: total,
                });
            }
        }
        self.processed = processed;
        self.total = Some(total);
        Ok(())
    }

    pub fn track_progress(&self, track: &TrackId) -> Option<f64> {
        self.tracks
            .iter()
            .find(|(id, _)| id == track)
            .map(|(_, percent)| *percent)
    }

    /// Tracks in configuration order.
    pub fn tracks(&self) -> impl Iterator<Item = (&TrackId, f64)> + '_ {
        self.tracks.iter().map(|(id, percent)| (id, *percent))
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Linear extrapolation from the average time per processed file.
    /// Unknown until at least one file is processed.
    pub fn estimated_remaining(&self, elapsed_since_start: TimeDelta) -> Option<TimeDelta> {
        if self.processed == 0 {
            return None;
        }
        let total = self.total?;
        let elapsed_ms = i128::from(elapsed_since_start.num_milliseconds().max(0));
        let remaining_files = i128::from(total - self.processed);
        let remaining_ms = elapsed_ms * remaining_files / i128::from(self.processed);
        let remaining_ms = i64::try_from(remaining_ms).unwrap_or(i64::MAX);
        Some(TimeDelta::try_milliseconds(remaining_ms).unwrap_or(TimeDelta::MAX))
    }
}
