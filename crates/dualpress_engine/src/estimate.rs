//! Progress estimated from free-form compressor output, for scripts that
//! never print `PROGRESS`/`FILES` lines.

use crate::parse::COMPRESSING_MARKERS;
use crate::{EngineEvent, JobId};

/// Percent added per compressing line while the file total is unknown.
pub const STEP_PERCENT: f64 = 5.0;
/// The step approximation never claims more than this.
pub const STEP_CEILING: f64 = 90.0;

const FOUND_MARKERS: [&str; 2] = ["Found", "Gefunden"];

/// Counts `Compressing`/`Komprimiere` lines of one run. With a total taken
/// from a `Found N` line the estimate is the processed share; without one it
/// advances in fixed steps up to [`STEP_CEILING`]. Percentages never go down.
#[derive(Debug, Clone)]
pub struct OutputProgress {
    tracks: [String; 2],
    compressing: u64,
    total: Option<u64>,
    percent: f64,
    structured: bool,
}

impl OutputProgress {
    pub fn new(tracks: [String; 2]) -> Self {
        Self {
            tracks,
            compressing: 0,
            total: None,
            percent: 0.0,
            structured: false,
        }
    }

    /// Returns the estimated events implied by `event`. Silent for good once
    /// the script reports structured progress itself.
    pub fn observe(&mut self, event: &EngineEvent) -> Vec<EngineEvent> {
        match event {
            EngineEvent::TrackProgress { .. } | EngineEvent::FileCounts { .. } => {
                self.structured = true;
                Vec::new()
            }
            EngineEvent::Output { job_id, line, .. } if !self.structured => {
                self.observe_line(*job_id, line)
            }
            _ => Vec::new(),
        }
    }

    fn observe_line(&mut self, job_id: JobId, line: &str) -> Vec<EngineEvent> {
        if self.total.is_none() {
            if let Some(total) = found_total(line) {
                self.total = Some(total);
                return vec![self.counts(job_id, total)];
            }
        }
        if !COMPRESSING_MARKERS.iter().any(|marker| line.contains(marker)) {
            return Vec::new();
        }

        self.compressing += 1;
        let mut events = Vec::new();
        let estimate = match self.total {
            Some(total) if total > 0 => {
                events.push(self.counts(job_id, total));
                self.compressing.min(total) as f64 / total as f64 * 100.0
            }
            _ => (self.compressing as f64 * STEP_PERCENT).min(STEP_CEILING),
        };
        if estimate > self.percent {
            self.percent = estimate;
            events.extend(self.tracks.iter().map(|track| EngineEvent::TrackProgress {
                job_id,
                track: track.clone(),
                percent: estimate,
            }));
        }
        events
    }

    fn counts(&self, job_id: JobId, total: u64) -> EngineEvent {
        EngineEvent::FileCounts {
            job_id,
            processed: self.compressing.min(total),
            total,
        }
    }
}

/// First number after a `Found`/`Gefunden` marker, e.g. `Found 12 images`.
fn found_total(line: &str) -> Option<u64> {
    let rest = FOUND_MARKERS
        .iter()
        .find_map(|marker| line.split_once(marker).map(|(_, rest)| rest))?;
    rest.split(|c: char| !c.is_ascii_digit())
        .find(|digits| !digits.is_empty())?
        .parse()
        .ok()
}
