use std::sync::{Arc, Mutex};
use std::time::Duration;

use dualpress_engine::{
    CancellationToken, EngineEvent, FailureKind, JobLauncher, LaunchRequest, ProgressSink,
    SimulatedLauncher,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn request() -> LaunchRequest {
    LaunchRequest {
        input_dir: "/photos".into(),
        output_dir: "/out".into(),
        size_arg: "-k300".into(),
        parallelism: 4,
    }
}

#[tokio::test(start_paused = true)]
async fn simulation_walks_all_files_with_secondary_lagging() {
    let launcher = SimulatedLauncher::new(4, Duration::from_millis(200));
    let sink = TestSink::default();

    launcher
        .run(7, &request(), &sink, CancellationToken::new())
        .await
        .expect("simulation completes");

    let events = sink.take();
    assert!(matches!(events[0], EngineEvent::Output { job_id: 7, .. }));
    assert_eq!(
        events[1],
        EngineEvent::FileCounts {
            job_id: 7,
            processed: 0,
            total: 4
        }
    );

    let progress = |name: &str| -> Vec<f64> {
        events
            .iter()
            .filter_map(|event| match event {
                EngineEvent::TrackProgress { track, percent, .. } if track == name => {
                    Some(*percent)
                }
                _ => None,
            })
            .collect()
    };
    assert_eq!(progress("jpeg"), vec![25.0, 50.0, 75.0, 100.0]);
    assert_eq!(progress("png"), vec![0.0, 25.0, 50.0, 75.0, 100.0]);

    let last_counts = events.iter().rev().find_map(|event| match event {
        EngineEvent::FileCounts {
            processed, total, ..
        } => Some((*processed, *total)),
        _ => None,
    });
    assert_eq!(last_counts, Some((4, 4)));
}

#[tokio::test(start_paused = true)]
async fn simulation_stops_when_cancelled() {
    let launcher = SimulatedLauncher::new(1_000, Duration::from_secs(1));
    let sink = TestSink::default();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        trigger.cancel();
    });

    let result = launcher.run(1, &request(), &sink, cancel).await;

    assert_eq!(result, Err(FailureKind::Cancelled));
    let processed = sink
        .take()
        .iter()
        .filter(|event| {
            matches!(event, EngineEvent::FileCounts { processed, .. } if *processed > 0)
        })
        .count();
    assert!(processed < 10, "ran {processed} steps after cancellation");
}

#[tokio::test(start_paused = true)]
async fn custom_track_names_are_used() {
    let launcher =
        SimulatedLauncher::new(1, Duration::from_millis(10)).with_tracks("avif", "webp");
    let sink = TestSink::default();

    launcher
        .run(2, &request(), &sink, CancellationToken::new())
        .await
        .unwrap();

    let tracks: Vec<_> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::TrackProgress { track, .. } => Some(track),
            _ => None,
        })
        .collect();
    assert_eq!(tracks, vec!["avif", "webp", "webp"]);
}
