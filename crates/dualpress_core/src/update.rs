use dualpress_logging::{dp_debug, dp_warn};

use crate::{AppState, CommandError, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Command errors never escape: they are logged and kept as the view's
/// `last_error`, and the state is left as the command found it.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartClicked(config) => {
            let result = state.start(config);
            settle(&mut state, result)
        }
        Msg::StopClicked => {
            let result = state.stop();
            settle(&mut state, result)
        }
        Msg::ClearLogClicked => {
            state.clear_log();
            Vec::new()
        }
        Msg::Signal { job_id, signal } => match state.apply_signal(job_id, signal) {
            Ok(effects) => effects,
            Err(err) => {
                dp_debug!("Signal for job {} rejected: {}", job_id, err);
                Vec::new()
            }
        },
        Msg::JobOutput {
            job_id,
            line,
            severity,
        } => {
            state.apply_output(job_id, line, severity);
            Vec::new()
        }
        Msg::Tick => {
            state.tick();
            Vec::new()
        }
    };

    (state, effects)
}

fn settle(state: &mut AppState, result: Result<Vec<Effect>, CommandError>) -> Vec<Effect> {
    match result {
        Ok(effects) => {
            state.set_last_error(None);
            effects
        }
        Err(err) => {
            dp_warn!("Command rejected: {}", err);
            state.set_last_error(Some(err.to_string()));
            Vec::new()
        }
    }
}
