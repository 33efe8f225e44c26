//! Timer tick loop for driving the focus timer.

use crate::app::{lock, App, SharedApp};
use crate::display::format_tray_title;
use crate::focus::CompletionEvent;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Message sent from the timer thread to the UI host.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerMessage {
    /// Timer state has changed, UI needs update.
    StateChanged { title: String },
    /// A phase completed, trigger notification/sound.
    Completed(CompletionEvent),
}

/// Runs the timer loop, ticking every second.
/// Sends messages to the UI host via the provided channel and returns once
/// the host has hung up.
pub fn run_timer_loop(app: SharedApp, tx: Sender<TimerMessage>) {
    loop {
        thread::sleep(TICK_INTERVAL);

        let messages = {
            let mut app = lock(&app);
            tick_once(&mut app)
        };

        for msg in messages {
            if tx.send(msg).is_err() {
                debug!("Timer channel closed, stopping ticker");
                return;
            }
        }
    }
}

/// Performs one ticker step and returns the messages for the UI host.
fn tick_once(app: &mut App) -> Vec<TimerMessage> {
    app.recorder.check_day_rollover();

    let applied = app.tick();
    let mut messages = Vec::new();

    if let Some(e) = applied.warning {
        warn!("Failed to save timer state: {}", e);
    }
    if let Some(event) = applied.completion {
        messages.push(TimerMessage::Completed(event));
    }
    if applied.changed {
        messages.push(TimerMessage::StateChanged {
            title: format_tray_title(&app.timer),
        });
    }

    messages
}
