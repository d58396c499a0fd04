use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, ProgressSink};

/// Emits `EngineEvent::Tick` every `period`, first one period after the
/// start, until `cancel` fires.
pub async fn run_ticker(period: Duration, sink: &dyn ProgressSink, cancel: CancellationToken) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => sink.emit(EngineEvent::Tick),
        }
    }
}
