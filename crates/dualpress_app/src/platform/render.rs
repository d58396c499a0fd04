use std::thread::{self, JoinHandle};

use chrono::{Local, TimeDelta};
use dualpress_core::{
    format_elapsed, LogEntry, Notification, Severity, TrackId, UNKNOWN_REMAINING,
};
use dualpress_logging::dp_warn;
use tokio::sync::broadcast::{self, error::RecvError};

/// Turns the notification stream into terminal lines. Track and count
/// updates are folded into the status line printed on each timer tick.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    tracks: Vec<(TrackId, f64)>,
    counts: Option<(u64, u64)>,
}

impl TerminalRenderer {
    pub fn render(&mut self, notification: &Notification) -> Option<String> {
        match notification {
            Notification::LogAppended(entry) => Some(log_line(entry)),
            Notification::PhaseChanged { to, .. } => Some(format!("-- {to} --")),
            Notification::TrackProgress { track, percent } => {
                match self.tracks.iter_mut().find(|(known, _)| known == track) {
                    Some((_, value)) => *value = *percent,
                    None => self.tracks.push((track.clone(), *percent)),
                }
                None
            }
            Notification::CountsChanged { processed, total } => {
                self.counts = Some((*processed, *total));
                None
            }
            Notification::TimerTick {
                elapsed_ms,
                remaining_ms,
            } => Some(self.status_line(*elapsed_ms, *remaining_ms)),
            Notification::LogCleared => None,
        }
    }

    fn status_line(&self, elapsed_ms: i64, remaining_ms: Option<i64>) -> String {
        let elapsed = format_elapsed(TimeDelta::milliseconds(elapsed_ms));
        let remaining = remaining_ms
            .map(|ms| format_elapsed(TimeDelta::milliseconds(ms)))
            .unwrap_or_else(|| UNKNOWN_REMAINING.to_string());
        let mut parts = vec![format!("{elapsed} elapsed, {remaining} left")];
        parts.extend(
            self.tracks
                .iter()
                .map(|(track, percent)| format!("{track} {percent:.0}%")),
        );
        if let Some((processed, total)) = self.counts {
            parts.push(format!("{processed}/{total} files"));
        }
        parts.join(" | ")
    }
}

fn log_line(entry: &LogEntry) -> String {
    let label = match entry.severity {
        Severity::Info => "INFO",
        Severity::Success => "OK",
        Severity::Warning => "WARN",
        Severity::Error => "ERROR",
    };
    format!(
        "[{}] {:<5} {}",
        entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        label,
        entry.message
    )
}

/// Prints notifications until the bus is dropped.
pub fn spawn_renderer(mut rx: broadcast::Receiver<Notification>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut renderer = TerminalRenderer::default();
        loop {
            match rx.blocking_recv() {
                Ok(notification) => {
                    if let Some(line) = renderer.render(&notification) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    dp_warn!("Renderer lagged; {} notifications skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
