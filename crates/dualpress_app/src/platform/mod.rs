mod app;
mod cli;
mod effects;
mod input;
mod logging;
mod render;
mod settings;

pub use app::run_app;
