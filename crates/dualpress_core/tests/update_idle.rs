use dualpress_core::{update, AppState, Msg, Severity};

#[test]
fn tick_while_idle_changes_nothing() {
    let state = AppState::new();
    let before = state.view();

    let (mut next, effects) = update(state, Msg::Tick);

    assert_eq!(next.view(), before);
    assert!(effects.is_empty());
    assert!(next.drain_notifications().is_empty());
}

#[test]
fn job_output_while_idle_is_dropped() {
    let mut state = AppState::new();
    let before = state.view();
    state.drain_notifications();

    let (mut next, effects) = update(
        state,
        Msg::JobOutput {
            job_id: 1,
            line: "Compressing IMG_1.jpg".into(),
            severity: Severity::Info,
        },
    );

    assert_eq!(next.view(), before);
    assert!(effects.is_empty());
    assert!(next.drain_notifications().is_empty());
}
