//! User commands shared by the menubar and console hosts.

use crate::app::App;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

// Menu item IDs as constants
pub const ID_TOGGLE: &str = "toggle";
pub const ID_RESET: &str = "reset";
pub const ID_FOCUS: &str = "switch_focus";
pub const ID_BREAK: &str = "switch_break";
pub const ID_SOUND_TOGGLE: &str = "sound_toggle";
pub const ID_NOTIF_TOGGLE: &str = "notif_toggle";
pub const ID_RESET_COUNT: &str = "reset_count";
pub const ID_QUIT: &str = "quit";
/// Prefix of the focus duration preset IDs, e.g. `focus_25`.
pub const FOCUS_PRESET_PREFIX: &str = "focus_";

/// A user action on the timer or its settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Reset,
    SwitchToFocus,
    SwitchToBreak,
    SetFocusDuration(u32),
    ToggleSound,
    ToggleNotifications,
    ResetToday,
    Quit,
}

impl Command {
    /// Maps a menu item ID to its command.
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub fn from_menu_id(id: &str) -> Option<Self> {
        let command = match id {
            ID_TOGGLE => Self::Toggle,
            ID_RESET => Self::Reset,
            ID_FOCUS => Self::SwitchToFocus,
            ID_BREAK => Self::SwitchToBreak,
            ID_SOUND_TOGGLE => Self::ToggleSound,
            ID_NOTIF_TOGGLE => Self::ToggleNotifications,
            ID_RESET_COUNT => Self::ResetToday,
            ID_QUIT => Self::Quit,
            _ => {
                let mins = id.strip_prefix(FOCUS_PRESET_PREFIX)?.parse().ok()?;
                Self::SetFocusDuration(mins)
            }
        };
        Some(command)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command: {0}")]
pub struct ParseCommandError(String);

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Parses console input such as `t`, `reset` or `d 30`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let command = match (parts.next(), parts.next()) {
            (Some("t" | "toggle" | "start" | "pause"), None) => Self::Toggle,
            (Some("r" | "reset"), None) => Self::Reset,
            (Some("f" | "focus"), None) => Self::SwitchToFocus,
            (Some("b" | "break"), None) => Self::SwitchToBreak,
            (Some("d" | "duration"), Some(mins)) => Self::SetFocusDuration(
                mins.parse().map_err(|_| ParseCommandError(s.trim().to_string()))?,
            ),
            (Some("sound"), None) => Self::ToggleSound,
            (Some("notify"), None) => Self::ToggleNotifications,
            (Some("reset-today"), None) => Self::ResetToday,
            (Some("q" | "quit" | "exit"), None) => Self::Quit,
            _ => return Err(ParseCommandError(s.trim().to_string())),
        };

        if parts.next().is_some() {
            return Err(ParseCommandError(s.trim().to_string()));
        }
        Ok(command)
    }
}

/// Result of handling a command.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Event handled, continue running.
    Continue,
    /// User requested quit.
    Quit,
    /// Timer state changed, UI needs update.
    StateChanged,
    /// Settings changed, UI needs update.
    SettingsChanged,
}

/// Handles a command and updates the app state accordingly.
pub fn handle_command(app: &mut App, command: Command) -> EventResult {
    let applied = match command {
        Command::Toggle => app.toggle(),
        Command::Reset => app.reset(),
        Command::SwitchToFocus => app.switch_to_focus(),
        Command::SwitchToBreak => app.switch_to_break(),
        Command::SetFocusDuration(mins) => app.set_focus_duration(mins),
        Command::ToggleSound => {
            app.update_setting(|s| s.sound_enabled = !s.sound_enabled);
            return EventResult::SettingsChanged;
        }
        Command::ToggleNotifications => {
            app.update_setting(|s| s.notifications_enabled = !s.notifications_enabled);
            return EventResult::SettingsChanged;
        }
        Command::ResetToday => {
            app.reset_today();
            return EventResult::StateChanged;
        }
        Command::Quit => return EventResult::Quit,
    };

    if let Some(e) = applied.warning {
        warn!("Failed to save timer state: {}", e);
    }

    if applied.changed {
        EventResult::StateChanged
    } else {
        EventResult::Continue
    }
}
