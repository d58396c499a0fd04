use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use dualpress_core::{update, AppState, Clock, Msg, Notification, Phase};
use dualpress_engine::{
    EngineHandle, JobLauncher, NotificationBus, ScriptLauncher, SimulatedLauncher,
};
use dualpress_logging::{dp_debug, dp_info, dp_warn};

use super::cli::Cli;
use super::effects::EffectRunner;
use super::settings::AppSettings;
use super::{input, logging, render};

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings_path = cli.settings_path();
    let loaded = AppSettings::load(&settings_path)?;
    let from_file = loaded.is_some();
    let mut settings = loaded.unwrap_or_default();
    cli.apply_overrides(&mut settings);

    logging::initialize(settings.log_destination, cli.verbose);
    match (from_file, cli.config.is_some()) {
        (true, _) => dp_info!("Loaded settings from {:?}", settings_path),
        (false, true) => dp_warn!("Settings file {:?} not found; using defaults", settings_path),
        (false, false) => dp_debug!("No settings file; using defaults"),
    }

    let (engine, events) = EngineHandle::new(build_launcher(&cli, &settings));
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, events, msg_tx.clone());
    let bus = NotificationBus::default();
    let renderer = render::spawn_renderer(bus.subscribe());
    let state = AppState::with_clock(Clock::system(), settings.controller_settings());
    let mut controller = Controller::new(state, runner, bus);

    controller.dispatch(Msg::StartClicked(cli.job_configuration(&settings)));
    if controller.state().phase() == Phase::Running {
        println!("{}", input::HELP);
        input::spawn_command_reader(msg_tx);
        controller.run_until_finished(&msg_rx);
    }

    let view = controller.state().view();
    // Dropping the controller closes the bus, which ends the renderer.
    drop(controller);
    let _ = renderer.join();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    match view.phase {
        Phase::Completed | Phase::Cancelled => Ok(()),
        Phase::Failed => Err(anyhow!("compression failed")),
        Phase::Idle | Phase::Running => Err(anyhow!(view
            .last_error
            .unwrap_or_else(|| "job did not start".to_string()))),
    }
}

fn build_launcher(cli: &Cli, settings: &AppSettings) -> Arc<dyn JobLauncher> {
    match cli.simulate {
        Some(files) => Arc::new(
            SimulatedLauncher::new(files, Duration::from_millis(settings.simulation_step_ms))
                .with_tracks(settings.tracks.0.clone(), settings.tracks.1.clone()),
        ),
        None => Arc::new(ScriptLauncher::new(settings.script_settings())),
    }
}

/// Single owner of the application state. Every message goes through
/// `update`; effects go to the engine and notifications to the bus.
struct Controller {
    state: AppState,
    runner: EffectRunner,
    bus: NotificationBus<Notification>,
}

impl Controller {
    fn new(state: AppState, runner: EffectRunner, bus: NotificationBus<Notification>) -> Self {
        Self { state, runner, bus }
    }

    fn state(&self) -> &AppState {
        &self.state
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notifications = state.drain_notifications();
        self.state = state;

        self.runner.enqueue(effects);
        for notification in notifications {
            self.bus.publish(notification);
        }
    }

    /// Processes the inbox until the running job reaches a terminal phase.
    fn run_until_finished(&mut self, inbox: &mpsc::Receiver<Msg>) {
        while self.state.phase() == Phase::Running {
            match inbox.recv() {
                Ok(msg) => self.dispatch(msg),
                Err(_) => break,
            }
        }
    }
}
