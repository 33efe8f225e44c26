//! System notifications for phase completion.

use crate::focus::CompletionEvent;
use crate::models::LONG_BREAK_MINS;
use notify_rust::Notification;
use std::thread;
use tracing::warn;

/// Shows the notification matching a completion event.
pub fn notify_completion(event: CompletionEvent) {
    match event {
        CompletionEvent::FocusComplete {
            count,
            is_long_break,
            ..
        } => {
            if is_long_break {
                notify_long_break_start(LONG_BREAK_MINS);
            } else {
                notify_focus_complete(count);
            }
        }
        CompletionEvent::BreakComplete => notify_break_complete(),
    }
}

/// Body text for a completed focus session.
fn focus_complete_body(count: u32) -> String {
    if count == 1 {
        "Great work! You've completed 1 focus session.\nYour break is ready when you are."
            .to_string()
    } else {
        format!(
            "Great work! You've completed {} focus sessions.\nYour break is ready when you are.",
            count
        )
    }
}

/// Shows a notification in a background thread to avoid blocking.
fn show(summary: &'static str, body: String) {
    thread::spawn(move || {
        if let Err(e) = Notification::new()
            .summary(summary)
            .body(&body)
            .sound_name("default")
            .show()
        {
            warn!("Failed to show notification: {}", e);
        }
    });
}

/// Shows a notification when a focus phase is completed.
pub fn notify_focus_complete(count: u32) {
    show("Focus Complete! 🍅", focus_complete_body(count));
}

/// Shows a notification when a break is completed.
pub fn notify_break_complete() {
    show(
        "Break Over! ☕",
        "Ready to start another focus session?".to_string(),
    );
}

/// Shows a notification when a long break is earned.
pub fn notify_long_break_start(duration_mins: u32) {
    show(
        "Long Break Time! 🎉",
        format!(
            "You've earned a {} minute break. Great job staying focused!",
            duration_mins
        ),
    );
}
