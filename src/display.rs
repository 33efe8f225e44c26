//! Text rendering of timer state and statistics, shared by both hosts.

use crate::focus::FocusTimer;
use crate::models::{DailyStats, FocusStats, TimerStatus};

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats the tray title based on current timer state.
pub fn format_tray_title(timer: &FocusTimer) -> String {
    let time = format_time(timer.state().time_left_secs);
    match timer.state().status() {
        TimerStatus::FocusRunning => format!("🍅 {}", time),
        TimerStatus::FocusPaused => format!("⏸ {}", time),
        TimerStatus::BreakRunning => format!("☕ {}", time),
        TimerStatus::BreakPaused => format!("☕ ⏸ {}", time),
    }
}

/// Formats the status line for the menu.
pub fn format_status(timer: &FocusTimer) -> String {
    let state = timer.state();
    let time = format_time(state.time_left_secs);
    let kind = if timer.is_long_break() {
        "Long break"
    } else {
        "Short break"
    };

    match state.status() {
        TimerStatus::FocusRunning => format!("⏱  Focus - {} remaining", time),
        TimerStatus::FocusPaused if state.time_left_secs == state.focus_secs() => {
            format!("Ready to focus ({} min)", state.focus_mins)
        }
        TimerStatus::FocusPaused => format!("⏸  Focus - {} (paused)", time),
        TimerStatus::BreakRunning => format!("☕  {} - {}", kind, time),
        TimerStatus::BreakPaused => format!("☕  {} - {} (paused)", kind, time),
    }
}

/// Formats the progress bar for the menu.
pub fn format_progress(timer: &FocusTimer) -> String {
    let pct = timer.progress_percent().clamp(0.0, 1.0);
    let filled = (pct * 20.0).round() as usize;
    let empty = 20 - filled;
    format!(
        "{}{}  {}%",
        "█".repeat(filled),
        "░".repeat(empty),
        (pct * 100.0).round() as u32
    )
}

/// Formats the daily stats for the menu.
pub fn format_today(today: &DailyStats) -> String {
    let tomatoes = "🍅".repeat(today.completed_pomodoros.min(10) as usize);
    let extra = if today.completed_pomodoros > 10 {
        format!("+{}", today.completed_pomodoros - 10)
    } else {
        String::new()
    };

    if today.completed_pomodoros == 0 {
        "Today: —  0 (0 min)".to_string()
    } else {
        format!(
            "Today: {}{}  {} ({} min)",
            tomatoes, extra, today.completed_pomodoros, today.total_focus_minutes
        )
    }
}

/// Formats the lifetime stats and rewards.
pub fn format_lifetime(stats: &FocusStats) -> String {
    format!(
        "Total: {} sessions, {} min  💰 {}  ⭐ {}",
        stats.focus_sessions_completed, stats.total_focus_time, stats.balance, stats.xp
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimerState;
    use chrono::Local;

    fn timer(time_left_secs: u32, is_active: bool, is_break: bool) -> FocusTimer {
        FocusTimer::from_state(TimerState {
            time_left_secs,
            is_active,
            is_break,
            ..TimerState::default()
        })
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(125), "02:05");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(3600), "60:00");
    }

    #[test]
    fn test_format_tray_title() {
        assert_eq!(format_tray_title(&timer(1432, true, false)), "🍅 23:52");
        assert_eq!(format_tray_title(&timer(600, false, false)), "⏸ 10:00");
        assert_eq!(format_tray_title(&timer(272, true, true)), "☕ 04:32");
        assert_eq!(format_tray_title(&timer(272, false, true)), "☕ ⏸ 04:32");
    }

    #[test]
    fn test_format_status_ready() {
        assert_eq!(
            format_status(&FocusTimer::default()),
            "Ready to focus (25 min)"
        );
    }

    #[test]
    fn test_format_status_focus() {
        assert_eq!(
            format_status(&timer(1432, true, false)),
            "⏱  Focus - 23:52 remaining"
        );
        assert_eq!(
            format_status(&timer(600, false, false)),
            "⏸  Focus - 10:00 (paused)"
        );
    }

    #[test]
    fn test_format_status_breaks() {
        assert_eq!(
            format_status(&timer(180, true, true)),
            "☕  Short break - 03:00"
        );
        assert_eq!(
            format_status(&timer(600, false, true)),
            "☕  Long break - 10:00 (paused)"
        );
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(
            format_progress(&FocusTimer::default()),
            "░░░░░░░░░░░░░░░░░░░░  0%"
        );
        assert_eq!(
            format_progress(&timer(750, true, false)),
            "██████████░░░░░░░░░░  50%"
        );
    }

    #[test]
    fn test_format_today_empty() {
        let today = DailyStats::new(Local::now().date_naive());
        assert_eq!(format_today(&today), "Today: —  0 (0 min)");
    }

    #[test]
    fn test_format_today_with_sessions() {
        let today = DailyStats {
            date: Local::now().date_naive(),
            completed_pomodoros: 4,
            total_focus_minutes: 100,
        };
        assert_eq!(format_today(&today), "Today: 🍅🍅🍅🍅  4 (100 min)");
    }

    #[test]
    fn test_format_today_many_sessions() {
        let today = DailyStats {
            date: Local::now().date_naive(),
            completed_pomodoros: 15,
            total_focus_minutes: 375,
        };
        let result = format_today(&today);
        assert!(result.contains("+5"));
        assert!(result.contains("15"));
        assert!(result.contains("375 min"));
    }

    #[test]
    fn test_format_lifetime() {
        let mut stats = FocusStats::default();
        stats.add_session(25);
        assert_eq!(
            format_lifetime(&stats),
            "Total: 1 sessions, 25 min  💰 10  ⭐ 20"
        );
    }
}
