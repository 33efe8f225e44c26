//! Life Game focus timer.
//!
//! A Pomodoro timer that keeps its state across restarts and turns every
//! completed focus session into coins and experience. On macOS it lives in
//! the menubar; elsewhere it runs as a console program.

use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

mod app;
mod display;
mod event;
mod focus;
mod models;
mod notifications;
mod persistence;
mod recorder;
mod timer;

#[cfg(target_os = "macos")]
mod audio;
#[cfg(target_os = "macos")]
mod menu;
#[cfg(target_os = "macos")]
mod tray;

#[cfg(not(target_os = "macos"))]
mod console;

use app::App;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lifegame_timer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = Arc::new(Mutex::new(App::new()?));

    #[cfg(target_os = "macos")]
    tray::run(app)?;

    #[cfg(not(target_os = "macos"))]
    console::run(app)?;

    Ok(())
}
