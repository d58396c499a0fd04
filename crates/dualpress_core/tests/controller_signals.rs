use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use dualpress_core::{
    update, AppState, Clock, ControllerSettings, Effect, InvalidCountsError,
    InvalidProgressError, JobConfiguration, JobId, Msg, Notification, Phase, ProgressSignal,
    Severity, SignalError, TargetSize, TrackId, UNKNOWN_REMAINING,
};

fn init_logging() {
    dualpress_logging::initialize_for_tests();
}

fn manual_state() -> (AppState, Arc<Mutex<DateTime<Utc>>>) {
    let now = Arc::new(Mutex::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
    ));
    let handle = now.clone();
    let clock = Clock::from_fn(move || *handle.lock().unwrap());
    (
        AppState::with_clock(clock, ControllerSettings::default()),
        now,
    )
}

fn started() -> (AppState, Arc<Mutex<DateTime<Utc>>>) {
    let (state, now) = manual_state();
    let config = JobConfiguration::new("/in", "/out", TargetSize::kilobytes(300), 4);
    let (state, _) = update(state, Msg::StartClicked(config));
    (state, now)
}

fn signal(state: AppState, job_id: JobId, signal: ProgressSignal) -> (AppState, Vec<Effect>) {
    update(state, Msg::Signal { job_id, signal })
}

fn progress(track: &str, percent: f64) -> ProgressSignal {
    ProgressSignal::TrackProgress {
        track: TrackId::from(track),
        percent,
    }
}

fn counts(processed: u64, total: u64) -> ProgressSignal {
    ProgressSignal::FileCounts { processed, total }
}

#[test]
fn end_to_end_run_completes_and_ignores_late_signals() {
    init_logging();
    let (state, _) = started();
    assert_eq!(state.phase(), Phase::Running);

    let (mut state, _) = signal(state, 1, counts(0, 15));
    assert_eq!(state.tracker().total(), Some(15));

    for i in 1..=10u32 {
        let (next, effects) = signal(state, 1, progress("jpeg", f64::from(i * 10)));
        assert!(effects.is_empty());
        state = next;
    }
    let jpeg = TrackId::from("jpeg");
    assert_eq!(state.tracker().track_progress(&jpeg), Some(100.0));

    let (state, effects) = signal(state, 1, ProgressSignal::JobCompleted);
    assert_eq!(effects, vec![Effect::StopTicker]);
    assert_eq!(state.phase(), Phase::Completed);
    assert!(!state.timer().is_running());
    let success: Vec<_> = state
        .log()
        .entries()
        .filter(|e| e.severity == Severity::Success)
        .map(|e| e.message.as_str())
        .collect();
    assert!(success.contains(&"Compression completed successfully"));
    assert!(success.contains(&"Output: /out"));

    let before = state.view();
    let (state, effects) = signal(state, 1, progress("png", 40.0));
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
}

#[test]
fn signals_after_cancel_or_for_stale_jobs_are_dropped() {
    init_logging();
    let (state, _) = started();
    let (state, _) = update(state, Msg::StopClicked);
    let log_len = state.log().len();

    let (state, effects) = signal(state, 1, ProgressSignal::JobCompleted);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Cancelled);
    assert_eq!(state.log().len(), log_len);

    let config = JobConfiguration::new("/a", "/b", TargetSize::megabytes(2), 8);
    let (state, _) = update(state, Msg::StartClicked(config));
    assert_eq!(state.active_job(), Some(2));

    // Job 1 is gone; only job 2 may drive progress.
    let (state, _) = signal(state, 1, progress("jpeg", 90.0));
    let (state, _) = signal(state, 1, ProgressSignal::JobFailed {
        reason: "killed".into(),
    });
    assert_eq!(state.phase(), Phase::Running);
    assert_eq!(state.tracker().track_progress(&TrackId::from("jpeg")), Some(0.0));

    let (state, _) = signal(state, 2, progress("jpeg", 15.0));
    assert_eq!(state.tracker().track_progress(&TrackId::from("jpeg")), Some(15.0));
}

#[test]
fn regressing_progress_is_logged_and_dropped() {
    init_logging();
    let (state, _) = started();
    let (mut state, _) = signal(state, 1, progress("png", 60.0));

    let err = state.apply_signal(1, progress("png", 55.0)).unwrap_err();
    assert!(matches!(
        err,
        SignalError::Progress(InvalidProgressError::Regressed { .. })
    ));
    assert_eq!(state.tracker().track_progress(&TrackId::from("png")), Some(60.0));
    assert_eq!(state.phase(), Phase::Running);

    let last = state.log().entries().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.message.starts_with("Invalid progress signal"));

    // Through `update` the job keeps running as well.
    let (state, effects) = signal(state, 1, progress("png", 120.0));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Running);
    assert_eq!(state.tracker().track_progress(&TrackId::from("png")), Some(60.0));
}

#[test]
fn invalid_counts_are_rejected_idempotently() {
    init_logging();
    let (state, _) = started();
    let (mut state, _) = signal(state, 1, counts(4, 10));

    for _ in 0..2 {
        assert_eq!(
            state.apply_signal(1, counts(12, 10)),
            Err(SignalError::Counts(InvalidCountsError::ProcessedExceedsTotal {
                processed: 12,
                total: 10,
            }))
        );
        assert_eq!(
            state.apply_signal(1, counts(5, 8)),
            Err(SignalError::Counts(InvalidCountsError::TotalDecreased {
                previous: 10,
                attempted: 8,
            }))
        );
        assert_eq!(state.tracker().processed(), 4);
        assert_eq!(state.tracker().total(), Some(10));
    }
}

#[test]
fn first_terminal_signal_wins() {
    init_logging();
    let (state, _) = started();
    let (state, _) = signal(state, 1, ProgressSignal::JobCompleted);
    let log_len = state.log().len();

    let (state, effects) = signal(
        state,
        1,
        ProgressSignal::JobFailed {
            reason: "late failure".into(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Completed);
    assert_eq!(state.log().len(), log_len);
}

#[test]
fn job_failure_stops_timer_and_logs_reason() {
    init_logging();
    let (state, now) = started();
    *now.lock().unwrap() += TimeDelta::seconds(9);

    let (mut state, effects) = signal(
        state,
        1,
        ProgressSignal::JobFailed {
            reason: "exit code 2".into(),
        },
    );

    assert_eq!(effects, vec![Effect::StopTicker]);
    assert_eq!(state.phase(), Phase::Failed);
    assert!(!state.timer().is_running());
    let last = state.log().entries().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert_eq!(last.message, "Compression failed: exit code 2");

    let notifications = state.drain_notifications();
    assert!(notifications.contains(&Notification::PhaseChanged {
        from: Phase::Running,
        to: Phase::Failed,
    }));
    assert_eq!(state.view().elapsed_text, "00:09");
}

#[test]
fn count_logging_is_throttled_to_reporting_boundaries() {
    init_logging();
    let (state, _) = started();
    let header_len = state.log().len();

    let (mut state, _) = signal(state, 1, counts(0, 12));
    for processed in 1..=12 {
        let (next, _) = signal(state, 1, counts(processed, 12));
        state = next;
    }

    let lines: Vec<_> = state
        .log()
        .entries()
        .skip(header_len)
        .map(|e| e.message.clone())
        .collect();
    assert_eq!(
        lines,
        vec![
            "Found 12 images".to_string(),
            "Processed 5/12 files".to_string(),
            "Processed 10/12 files".to_string(),
            "Processed 12/12 files".to_string(),
        ]
    );
}

#[test]
fn every_counts_update_is_notified() {
    init_logging();
    let (mut state, _) = started();
    state.drain_notifications();

    let (mut state, _) = signal(state, 1, counts(1, 3));
    assert!(state
        .drain_notifications()
        .contains(&Notification::CountsChanged {
            processed: 1,
            total: 3,
        }));
}

#[test]
fn view_estimates_remaining_time() {
    init_logging();
    let (state, now) = started();
    let view = state.view();
    assert_eq!(view.remaining_ms, None);
    assert_eq!(view.remaining_display(), UNKNOWN_REMAINING);

    *now.lock().unwrap() += TimeDelta::seconds(10);
    let (state, _) = signal(state, 1, counts(5, 15));
    let view = state.view();
    assert_eq!(view.remaining_ms, Some(20_000));
    assert_eq!(view.remaining_display(), "00:20");
    assert_eq!(view.elapsed_text, "00:10");
    assert_eq!(view.processed, 5);
    assert_eq!(view.total, Some(15));
}

#[test]
fn job_output_is_logged_only_for_the_running_job() {
    init_logging();
    let (state, _) = started();
    let (state, _) = update(
        state,
        Msg::JobOutput {
            job_id: 1,
            line: "Done: photo.jpg".into(),
            severity: Severity::Success,
        },
    );
    let last = state.log().entries().last().unwrap().clone();
    assert_eq!(last.message, "Done: photo.jpg");
    assert_eq!(last.severity, Severity::Success);

    let (state, _) = update(state, Msg::StopClicked);
    let log_len = state.log().len();
    let (state, _) = update(
        state,
        Msg::JobOutput {
            job_id: 1,
            line: "straggler".into(),
            severity: Severity::Info,
        },
    );
    assert_eq!(state.log().len(), log_len);
}

#[test]
fn view_serializes_for_display_consumers() {
    init_logging();
    let (state, _) = started();
    let (state, _) = signal(state, 1, progress("jpeg", 25.0));

    let json = serde_json::to_value(state.view()).unwrap();
    assert_eq!(json["phase"], "running");
    assert_eq!(json["tracks"][0]["track"], "jpeg");
    assert_eq!(json["tracks"][0]["percent"], 25.0);
    assert_eq!(json["log"][0]["severity"], "info");
}
