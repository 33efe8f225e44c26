//! Menu building and updating for the tray dropdown.

use crate::app::App;
use crate::display::{format_lifetime, format_progress, format_status, format_today};
use crate::event::{
    FOCUS_PRESET_PREFIX, ID_BREAK, ID_FOCUS, ID_NOTIF_TOGGLE, ID_QUIT, ID_RESET, ID_RESET_COUNT,
    ID_SOUND_TOGGLE, ID_TOGGLE,
};
use crate::models::Settings;
use muda::accelerator::Accelerator;
use muda::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use std::collections::HashMap;
use thiserror::Error;

pub const ID_STATUS: &str = "status";
pub const ID_PROGRESS: &str = "progress";
pub const ID_TODAY: &str = "today";
pub const ID_LIFETIME: &str = "lifetime";

/// Focus durations offered in the settings submenu.
pub const FOCUS_PRESETS: [u32; 7] = [15, 20, 25, 30, 45, 50, 60];

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu error: {0}")]
    Muda(#[from] muda::Error),
}

/// Holds references to menu items that need dynamic updates.
pub struct MenuItems {
    pub status: MenuItem,
    pub progress: MenuItem,
    pub today: MenuItem,
    pub lifetime: MenuItem,
    pub toggle: MenuItem,
    pub focus_sub: Submenu,
    pub focus_checks: HashMap<u32, CheckMenuItem>,
    pub sound_toggle: CheckMenuItem,
    pub notif_toggle: CheckMenuItem,
}

fn info_item(id: &str, text: String) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), text, false, None::<Accelerator>)
}

fn action_item(id: &str, text: &str) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), text, true, None::<Accelerator>)
}

/// Label of the start/pause item for the current state.
fn toggle_label(app: &App) -> &'static str {
    if app.state().is_active {
        "⏸  Pause"
    } else {
        "▶  Start"
    }
}

/// Builds the complete menu structure.
pub fn build_menu(app: &App) -> Result<(Menu, MenuItems), MenuError> {
    let menu = Menu::new();

    // Status display (disabled, info only)
    let status = info_item(ID_STATUS, format_status(&app.timer));
    let progress = info_item(ID_PROGRESS, format_progress(&app.timer));
    menu.append(&status)?;
    menu.append(&progress)?;

    menu.append(&PredefinedMenuItem::separator())?;

    let today = info_item(ID_TODAY, format_today(app.recorder.today()));
    let lifetime = info_item(ID_LIFETIME, format_lifetime(app.recorder.stats()));
    menu.append(&today)?;
    menu.append(&lifetime)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Control buttons
    let toggle = action_item(ID_TOGGLE, toggle_label(app));
    menu.append(&toggle)?;
    menu.append(&action_item(ID_RESET, "↺  Reset"))?;
    menu.append(&action_item(ID_FOCUS, "🍅  Switch to Focus"))?;
    menu.append(&action_item(ID_BREAK, "☕  Switch to Break"))?;

    menu.append(&PredefinedMenuItem::separator())?;

    let settings = build_settings_submenu(&app.settings, app.state().focus_mins)?;
    menu.append(&settings.submenu)?;

    menu.append(&PredefinedMenuItem::separator())?;

    menu.append(&action_item(ID_QUIT, "Quit Focus Timer"))?;

    let items = MenuItems {
        status,
        progress,
        today,
        lifetime,
        toggle,
        focus_sub: settings.focus_sub,
        focus_checks: settings.focus_checks,
        sound_toggle: settings.sound_toggle,
        notif_toggle: settings.notif_toggle,
    };

    Ok((menu, items))
}

struct SettingsSubmenu {
    submenu: Submenu,
    focus_sub: Submenu,
    focus_checks: HashMap<u32, CheckMenuItem>,
    sound_toggle: CheckMenuItem,
    notif_toggle: CheckMenuItem,
}

fn focus_sub_label(focus_mins: u32) -> String {
    format!("Focus: {} min", focus_mins)
}

fn build_settings_submenu(
    settings: &Settings,
    focus_mins: u32,
) -> Result<SettingsSubmenu, MenuError> {
    let submenu = Submenu::new("⚙  Settings", true);

    let focus_sub = Submenu::new(focus_sub_label(focus_mins), true);
    let mut focus_checks = HashMap::new();
    for mins in FOCUS_PRESETS {
        let item = CheckMenuItem::with_id(
            MenuId::new(format!("{}{}", FOCUS_PRESET_PREFIX, mins)),
            format!("{} min", mins),
            true,
            mins == focus_mins,
            None::<Accelerator>,
        );
        focus_sub.append(&item)?;
        focus_checks.insert(mins, item);
    }
    submenu.append(&focus_sub)?;

    submenu.append(&PredefinedMenuItem::separator())?;

    let sound_toggle = CheckMenuItem::with_id(
        MenuId::new(ID_SOUND_TOGGLE),
        "Sound Enabled",
        true,
        settings.sound_enabled,
        None::<Accelerator>,
    );
    submenu.append(&sound_toggle)?;

    let notif_toggle = CheckMenuItem::with_id(
        MenuId::new(ID_NOTIF_TOGGLE),
        "Notifications Enabled",
        true,
        settings.notifications_enabled,
        None::<Accelerator>,
    );
    submenu.append(&notif_toggle)?;

    submenu.append(&PredefinedMenuItem::separator())?;

    submenu.append(&action_item(ID_RESET_COUNT, "Reset Today's Count"))?;

    Ok(SettingsSubmenu {
        submenu,
        focus_sub,
        focus_checks,
        sound_toggle,
        notif_toggle,
    })
}

/// Updates the menu items based on the current app state.
pub fn update_menu_items(items: &MenuItems, app: &App) {
    items.status.set_text(format_status(&app.timer));
    items.progress.set_text(format_progress(&app.timer));
    items.today.set_text(format_today(app.recorder.today()));
    items.lifetime.set_text(format_lifetime(app.recorder.stats()));
    items.toggle.set_text(toggle_label(app));

    let focus_mins = app.state().focus_mins;
    items.focus_sub.set_text(focus_sub_label(focus_mins));
    for (&mins, check) in &items.focus_checks {
        check.set_checked(mins == focus_mins);
    }
    items.sound_toggle.set_checked(app.settings.sound_enabled);
    items
        .notif_toggle
        .set_checked(app.settings.notifications_enabled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::is_valid_focus_mins;

    #[test]
    fn test_focus_presets_are_valid() {
        assert!(FOCUS_PRESETS.iter().all(|&m| is_valid_focus_mins(m)));
        assert!(FOCUS_PRESETS.contains(&25));
    }

    #[test]
    fn test_focus_sub_label() {
        assert_eq!(focus_sub_label(25), "Focus: 25 min");
    }
}
