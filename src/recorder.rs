//! Session recorder: long-lived focus statistics and rewards.
//!
//! The timer reports every completed focus phase here. Totals outlive timer
//! resets and are written to the same database as the rest of the
//! application statistics.

use crate::models::{DailyStats, FocusStats};
use crate::persistence::{Database, DatabaseError};
use chrono::Local;
use serde_json::Value;
use tracing::{info, warn};

/// Receiver of completed focus sessions.
pub trait SessionRecorder {
    /// Records one completed focus session. Never fails from the caller's view.
    fn record_focus_session(&mut self, duration_mins: u32);
}

/// Fields an imported document must carry as non-negative integers.
const REQUIRED_STAT_FIELDS: [&str; 4] = [
    "focusSessionsCompleted",
    "totalFocusTime",
    "balance",
    "xp",
];

/// Recorder backed by the SQLite database.
pub struct StatsRecorder {
    db: Database,
    stats: FocusStats,
    today: DailyStats,
}

impl StatsRecorder {
    /// Creates a recorder, loading previously recorded statistics.
    pub fn new(db: Database) -> Result<Self, DatabaseError> {
        let stats = match db.load_focus_stats() {
            Ok(stats) => stats,
            Err(DatabaseError::Json(e)) => {
                warn!("Stored focus statistics are corrupt, starting over: {}", e);
                FocusStats::default()
            }
            Err(e) => return Err(e),
        };
        let today = db.load_today_stats()?;

        Ok(Self { db, stats, today })
    }

    /// Lifetime totals.
    pub fn stats(&self) -> &FocusStats {
        &self.stats
    }

    /// Totals for the current day.
    pub fn today(&self) -> &DailyStats {
        &self.today
    }

    /// Starts a fresh day if the date has changed.
    pub fn check_day_rollover(&mut self) {
        if self.today.is_stale() {
            self.today = DailyStats::new(Local::now().date_naive());
        }
    }

    /// Clears today's counts; lifetime totals are kept.
    pub fn reset_today(&mut self) {
        self.today = DailyStats::new(Local::now().date_naive());
        if let Err(e) = self.db.reset_today() {
            warn!("Failed to reset today's statistics: {}", e);
        }
    }

    /// Serializes the lifetime totals as pretty JSON.
    #[cfg_attr(target_os = "macos", allow(dead_code))]
    pub fn export_data(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.stats)
    }

    /// Replaces the lifetime totals with an exported document.
    ///
    /// Returns false and leaves the statistics untouched if the document is
    /// not a valid export.
    #[cfg_attr(target_os = "macos", allow(dead_code))]
    pub fn import_data(&mut self, data: &str) -> bool {
        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(e) => {
                warn!("Rejected statistics import: {}", e);
                return false;
            }
        };

        let valid = value.as_object().is_some_and(|obj| {
            REQUIRED_STAT_FIELDS
                .iter()
                .all(|field| obj.get(*field).is_some_and(Value::is_u64))
        });
        if !valid {
            warn!("Rejected statistics import: missing or invalid fields");
            return false;
        }

        let stats: FocusStats = match serde_json::from_value(value) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Rejected statistics import: {}", e);
                return false;
            }
        };

        self.stats = stats;
        if let Err(e) = self.db.save_focus_stats(&self.stats) {
            warn!("Failed to save imported statistics: {}", e);
        }
        info!(
            sessions = self.stats.focus_sessions_completed,
            "Imported focus statistics"
        );
        true
    }
}

impl SessionRecorder for StatsRecorder {
    fn record_focus_session(&mut self, duration_mins: u32) {
        self.check_day_rollover();
        self.stats.add_session(duration_mins);
        self.today.add_session(duration_mins);

        if let Err(e) = self.db.save_focus_stats(&self.stats) {
            warn!("Failed to save focus statistics: {}", e);
        }
        if let Err(e) = self.db.save_daily_stats(&self.today) {
            warn!("Failed to save daily statistics: {}", e);
        }

        info!(
            duration_mins,
            total_sessions = self.stats.focus_sessions_completed,
            "Recorded focus session"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_recorder() -> StatsRecorder {
        StatsRecorder::new(Database::new_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_recorder_starts_empty() {
        let recorder = create_test_recorder();
        assert_eq!(recorder.stats().focus_sessions_completed, 0);
        assert_eq!(recorder.today().completed_pomodoros, 0);
        assert!(!recorder.today().is_stale());
    }

    #[test]
    fn test_record_focus_session() {
        let mut recorder = create_test_recorder();
        recorder.record_focus_session(25);
        recorder.record_focus_session(50);

        let stats = recorder.stats();
        assert_eq!(stats.focus_sessions_completed, 2);
        assert_eq!(stats.total_focus_time, 75);
        assert_eq!(stats.balance, 20);
        assert_eq!(stats.xp, 40);

        assert_eq!(recorder.today().completed_pomodoros, 2);
        assert_eq!(recorder.today().total_focus_minutes, 75);
    }

    #[test]
    fn test_recorded_stats_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.db");

        {
            let mut recorder = StatsRecorder::new(Database::open(&path).unwrap()).unwrap();
            recorder.record_focus_session(30);
        }

        let recorder = StatsRecorder::new(Database::open(&path).unwrap()).unwrap();
        assert_eq!(recorder.stats().focus_sessions_completed, 1);
        assert_eq!(recorder.stats().total_focus_time, 30);
        assert_eq!(recorder.today().total_focus_minutes, 30);
    }

    #[test]
    fn test_corrupt_stats_start_over() {
        let db = Database::new_in_memory().unwrap();
        db.set_value(crate::persistence::FOCUS_STATS_KEY, "garbage")
            .unwrap();

        let recorder = StatsRecorder::new(db).unwrap();
        assert_eq!(recorder.stats().focus_sessions_completed, 0);
    }

    #[test]
    fn test_reset_today_keeps_lifetime_totals() {
        let mut recorder = create_test_recorder();
        recorder.record_focus_session(25);

        recorder.reset_today();

        assert_eq!(recorder.today().completed_pomodoros, 0);
        assert_eq!(recorder.stats().focus_sessions_completed, 1);
    }

    #[test]
    fn test_export_then_import() {
        let mut source = create_test_recorder();
        source.record_focus_session(25);
        source.record_focus_session(25);
        let exported = source.export_data().unwrap();

        let mut target = create_test_recorder();
        assert!(target.import_data(&exported));
        assert_eq!(target.stats().focus_sessions_completed, 2);
        assert_eq!(target.stats().total_focus_time, 50);
        assert_eq!(target.stats().balance, 20);
    }

    #[test]
    fn test_import_rejects_invalid_documents() {
        let mut recorder = create_test_recorder();
        recorder.record_focus_session(25);
        let before = recorder.stats().clone();

        assert!(!recorder.import_data("not json"));
        assert!(!recorder.import_data("[1, 2, 3]"));
        assert!(!recorder.import_data(r#"{"balance": 5, "xp": 1}"#));
        assert!(!recorder.import_data(
            r#"{"focusSessionsCompleted": -1, "totalFocusTime": 0, "balance": 0, "xp": 0}"#
        ));

        assert_eq!(recorder.stats(), &before);
    }

    #[test]
    fn test_import_without_timestamp() {
        let mut recorder = create_test_recorder();
        assert!(recorder.import_data(
            r#"{"focusSessionsCompleted": 3, "totalFocusTime": 75, "balance": 30, "xp": 60}"#
        ));
        assert_eq!(recorder.stats().xp, 60);
    }
}
