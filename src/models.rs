//! Data models for the focus timer.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default length of a focus phase in minutes.
pub const DEFAULT_FOCUS_MINS: u32 = 25;
/// Shortest focus phase that can be configured.
pub const MIN_FOCUS_MINS: u32 = 1;
/// Longest focus phase that can be configured.
pub const MAX_FOCUS_MINS: u32 = 60;
pub const SHORT_BREAK_MINS: u32 = 5;
pub const LONG_BREAK_MINS: u32 = 15;
/// Every n-th completed focus session earns a long break.
pub const LONG_BREAK_INTERVAL: u32 = 4;

/// Coins awarded per recorded focus session.
pub const SESSION_COIN_REWARD: u64 = 10;
/// Experience awarded per recorded focus session.
pub const SESSION_XP_REWARD: u64 = 20;

/// Returns true if `mins` is an acceptable focus duration.
pub fn is_valid_focus_mins(mins: u32) -> bool {
    (MIN_FOCUS_MINS..=MAX_FOCUS_MINS).contains(&mins)
}

/// Break length (minutes) following the `session_number`-th focus session.
pub fn break_mins_for(session_number: u32) -> u32 {
    if is_long_break(session_number) {
        LONG_BREAK_MINS
    } else {
        SHORT_BREAK_MINS
    }
}

/// Returns true if the break after the `session_number`-th focus session is long.
pub fn is_long_break(session_number: u32) -> bool {
    session_number % LONG_BREAK_INTERVAL == 0
}

/// The persisted timer record.
///
/// Field names on the wire follow the `pomodoro-state` document written by
/// the web client, so both can share stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerState {
    /// Seconds remaining in the current phase.
    #[serde(rename = "timeLeft")]
    pub time_left_secs: u32,
    /// Whether the countdown is running.
    #[serde(rename = "isActive")]
    pub is_active: bool,
    /// Configured focus length in minutes, within [1, 60].
    #[serde(rename = "duration")]
    pub focus_mins: u32,
    /// Focus phases completed since the state was created.
    #[serde(rename = "sessionCount")]
    pub completed_sessions: u32,
    /// Break phase when true, focus phase otherwise.
    #[serde(rename = "isBreak")]
    pub is_break: bool,
    /// Seconds spent in completed focus phases.
    #[serde(rename = "totalFocusTime")]
    pub total_focus_secs: u64,
    /// Full length of the current phase in seconds. Zero when unknown, as in
    /// documents written by the web client.
    #[serde(rename = "phaseLength", default)]
    pub phase_secs: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            time_left_secs: DEFAULT_FOCUS_MINS * 60,
            is_active: false,
            focus_mins: DEFAULT_FOCUS_MINS,
            completed_sessions: 0,
            is_break: false,
            total_focus_secs: 0,
            phase_secs: DEFAULT_FOCUS_MINS * 60,
        }
    }
}

impl TimerState {
    /// Returns the combined phase/running status.
    pub fn status(&self) -> TimerStatus {
        match (self.is_break, self.is_active) {
            (false, true) => TimerStatus::FocusRunning,
            (false, false) => TimerStatus::FocusPaused,
            (true, true) => TimerStatus::BreakRunning,
            (true, false) => TimerStatus::BreakPaused,
        }
    }

    /// Full length of a focus phase in seconds.
    pub fn focus_secs(&self) -> u32 {
        self.focus_mins * 60
    }
}

/// All combinations of phase and running flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    FocusRunning,
    FocusPaused,
    BreakRunning,
    BreakPaused,
}

/// User-configurable settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Whether to play sounds on phase completion.
    pub sound_enabled: bool,
    /// Whether to show system notifications.
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}

/// Lifetime focus statistics and rewards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FocusStats {
    pub focus_sessions_completed: u64,
    /// Total focus time in minutes.
    pub total_focus_time: u64,
    pub balance: u64,
    pub xp: u64,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for FocusStats {
    fn default() -> Self {
        Self {
            focus_sessions_completed: 0,
            total_focus_time: 0,
            balance: 0,
            xp: 0,
            updated_at: Utc::now(),
        }
    }
}

impl FocusStats {
    /// Adds one completed focus session of `duration_mins` and its rewards.
    pub fn add_session(&mut self, duration_mins: u32) {
        self.focus_sessions_completed += 1;
        self.total_focus_time += u64::from(duration_mins);
        self.balance += SESSION_COIN_REWARD;
        self.xp += SESSION_XP_REWARD;
        self.updated_at = Utc::now();
    }
}

/// Daily statistics for persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub completed_pomodoros: u32,
    pub total_focus_minutes: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed_pomodoros: 0,
            total_focus_minutes: 0,
        }
    }

    /// Returns true if these stats belong to a day other than today.
    pub fn is_stale(&self) -> bool {
        self.date != Local::now().date_naive()
    }

    pub fn add_session(&mut self, duration_mins: u32) {
        self.completed_pomodoros += 1;
        self.total_focus_minutes += duration_mins;
    }
}
