mod app;
mod config;
mod effects;
mod logging;

pub use app::run_relay;
