//! SQLite persistence layer for timer state, settings and statistics.
//!
//! JSON documents live in a small key-value table; per-day statistics get
//! their own table.

use crate::models::{
    is_valid_focus_mins, DailyStats, FocusStats, Settings, TimerState, DEFAULT_FOCUS_MINS,
};
use chrono::{Local, NaiveDate};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Key of the persisted timer state.
pub const TIMER_STATE_KEY: &str = "pomodoro-state";
/// Key of the persisted user settings.
pub const SETTINGS_KEY: &str = "config";
/// Key of the lifetime focus statistics.
pub const FOCUS_STATS_KEY: &str = "life-game-state";

/// Environment variable overriding the database directory.
pub const DATA_DIR_ENV: &str = "LIFEGAME_DATA_DIR";

const DB_FILE_NAME: &str = "lifegame-timer.db";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory")]
    DirectoryCreation,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database at the default location, initializing tables if needed.
    pub fn new() -> Result<Self, DatabaseError> {
        Self::open(&Self::db_path())
    }

    /// Opens the database at `path`, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| DatabaseError::DirectoryCreation)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;
        debug!(path = %path.display(), "opened database");

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Drops every table so that subsequent writes fail (for testing).
    #[cfg(test)]
    pub fn drop_tables_for_test(&self) {
        self.conn
            .execute_batch("DROP TABLE kv_store; DROP TABLE daily_stats;")
            .unwrap();
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_stats (
                date TEXT PRIMARY KEY,
                completed_pomodoros INTEGER NOT NULL DEFAULT 0,
                total_focus_minutes INTEGER NOT NULL DEFAULT 0
            );
        "#,
        )?;
        Ok(())
    }

    /// Resolves the database path, honoring `LIFEGAME_DATA_DIR`.
    pub fn db_path() -> PathBuf {
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir).join(DB_FILE_NAME);
        }

        ProjectDirs::from("com", "lifegame", "LifeGameTimer")
            .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
    }

    /// Reads the raw value stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)",
            [key, value],
        )?;
        Ok(())
    }

    /// Loads the timer state, falling back to defaults on missing or corrupt data.
    pub fn load_timer_state(&self) -> TimerState {
        let json = match self.get_value(TIMER_STATE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return TimerState::default(),
            Err(e) => {
                warn!("Failed to read timer state, using defaults: {}", e);
                return TimerState::default();
            }
        };

        match parse_timer_state(&json) {
            Some(state) => state,
            None => {
                warn!("Stored timer state is corrupt, using defaults");
                TimerState::default()
            }
        }
    }

    /// Saves the timer state.
    pub fn save_timer_state(&self, state: &TimerState) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(state)?;
        self.set_value(TIMER_STATE_KEY, &json)
    }

    /// Loads settings from the database, returning defaults if not found.
    pub fn load_settings(&self) -> Result<Settings, DatabaseError> {
        match self.get_value(SETTINGS_KEY)? {
            Some(j) => Ok(serde_json::from_str(&j)?),
            None => Ok(Settings::default()),
        }
    }

    /// Saves settings to the database.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(settings)?;
        self.set_value(SETTINGS_KEY, &json)
    }

    /// Loads lifetime focus statistics, returning zeroed stats if not found.
    pub fn load_focus_stats(&self) -> Result<FocusStats, DatabaseError> {
        match self.get_value(FOCUS_STATS_KEY)? {
            Some(j) => Ok(serde_json::from_str(&j)?),
            None => Ok(FocusStats::default()),
        }
    }

    pub fn save_focus_stats(&self, stats: &FocusStats) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(stats)?;
        self.set_value(FOCUS_STATS_KEY, &json)
    }

    /// Saves the statistics row for `stats.date`.
    pub fn save_daily_stats(&self, stats: &DailyStats) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO daily_stats (date, completed_pomodoros, total_focus_minutes)
             VALUES (?, ?, ?)",
            params![
                stats.date.to_string(),
                stats.completed_pomodoros,
                stats.total_focus_minutes,
            ],
        )?;
        Ok(())
    }

    /// Gets daily statistics for a specific date.
    pub fn get_daily_stats(&self, date: NaiveDate) -> Result<DailyStats, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT date, completed_pomodoros, total_focus_minutes
             FROM daily_stats WHERE date = ?",
            [date.to_string()],
            |row| {
                Ok(DailyStats {
                    date,
                    completed_pomodoros: row.get(1)?,
                    total_focus_minutes: row.get(2)?,
                })
            },
        );

        match result {
            Ok(stats) => Ok(stats),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(DailyStats::new(date)),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the statistics for today.
    pub fn load_today_stats(&self) -> Result<DailyStats, DatabaseError> {
        self.get_daily_stats(Local::now().date_naive())
    }

    /// Resets the statistics for today.
    pub fn reset_today(&self) -> Result<(), DatabaseError> {
        let today = Local::now().date_naive();
        self.conn.execute(
            "DELETE FROM daily_stats WHERE date = ?",
            [today.to_string()],
        )?;
        Ok(())
    }
}

/// Parses a stored timer state, replacing fields no operation could produce.
fn parse_timer_state(json: &str) -> Option<TimerState> {
    let mut state: TimerState = serde_json::from_str(json).ok()?;
    if !is_valid_focus_mins(state.focus_mins) {
        warn!(
            duration = state.focus_mins,
            "Stored focus duration out of range, using default"
        );
        state.focus_mins = DEFAULT_FOCUS_MINS;
        if !state.is_break {
            state.time_left_secs = state.time_left_secs.min(state.focus_secs());
        }
    }
    if state.time_left_secs == 0 {
        state.time_left_secs = state.focus_secs();
    }
    Some(state)
}
