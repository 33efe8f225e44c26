//! Main application state and logic.
//!
//! `App` applies each operation to the timer core and then runs its side
//! effects: persisting the new state and recording completed sessions.

use crate::focus::{CompletionEvent, FocusTimer};
use crate::models::{Settings, TimerState};
use crate::persistence::{Database, DatabaseError};
use crate::recorder::{SessionRecorder, StatsRecorder};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// The app as shared between the ticker thread and the UI host.
pub type SharedApp = Arc<Mutex<App>>;

/// Locks the shared app. The state is complete after every operation, so a
/// poisoned lock is still usable.
pub fn lock(app: &SharedApp) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of a timer operation.
#[derive(Debug, Default)]
pub struct Applied {
    /// Whether the timer state changed.
    pub changed: bool,
    /// Set when a phase ran out.
    pub completion: Option<CompletionEvent>,
    /// Set when the new state could not be persisted. In-memory state is
    /// still updated.
    pub warning: Option<DatabaseError>,
}

/// Main application state (without audio - audio is handled separately on main thread).
pub struct App<R = StatsRecorder> {
    pub timer: FocusTimer,
    pub settings: Settings,
    pub recorder: R,
    pub db: Database,
}

impl App {
    /// Creates a new application instance from the default database.
    pub fn new() -> Result<Self, AppError> {
        let db = Database::new()?;
        // The recorder keeps its own connection to the same file.
        let recorder = StatsRecorder::new(Database::new()?)?;
        Self::with_parts(db, recorder)
    }

    /// Resets today's statistics.
    pub fn reset_today(&mut self) {
        self.recorder.reset_today();
    }
}

impl<R: SessionRecorder> App<R> {
    /// Creates an app from an opened database and a recorder.
    pub fn with_parts(db: Database, recorder: R) -> Result<Self, AppError> {
        let state = db.load_timer_state();
        let settings = db.load_settings().unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        });

        info!(
            focus_mins = state.focus_mins,
            sessions = state.completed_sessions,
            is_break = state.is_break,
            "Loaded timer state"
        );

        Ok(Self {
            timer: FocusTimer::from_state(state),
            settings,
            recorder,
            db,
        })
    }

    /// Current timer snapshot.
    pub fn state(&self) -> &TimerState {
        self.timer.state()
    }

    /// Starts or pauses the countdown.
    pub fn toggle(&mut self) -> Applied {
        self.timer.toggle();
        self.persisted(None)
    }

    /// Pauses and rewinds to a fresh focus phase.
    pub fn reset(&mut self) -> Applied {
        self.timer.reset();
        self.persisted(None)
    }

    /// Changes the focus duration. Out-of-range values are ignored.
    pub fn set_focus_duration(&mut self, mins: u32) -> Applied {
        if !self.timer.set_focus_duration(mins) {
            debug!(mins, "Ignored out-of-range focus duration");
            return Applied::default();
        }
        self.persisted(None)
    }

    /// Advances the timer by one second if it is running.
    pub fn tick(&mut self) -> Applied {
        if !self.timer.state().is_active {
            return Applied::default();
        }

        let completion = self.timer.tick();
        if let Some(CompletionEvent::FocusComplete { duration_mins, .. }) = completion {
            self.recorder.record_focus_session(duration_mins);
        }
        if let Some(event) = completion {
            info!(?event, "Phase complete");
        }
        self.persisted(completion)
    }

    /// Jumps to a running focus phase.
    pub fn switch_to_focus(&mut self) -> Applied {
        self.timer.switch_to_focus();
        self.persisted(None)
    }

    /// Jumps to a paused break.
    pub fn switch_to_break(&mut self) -> Applied {
        self.timer.switch_to_break();
        self.persisted(None)
    }

    /// Updates a setting and saves to database.
    pub fn update_setting<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut Settings),
    {
        updater(&mut self.settings);
        if let Err(e) = self.db.save_settings(&self.settings) {
            warn!("Failed to save settings: {}", e);
        }
    }

    /// Saves the current state after a mutation has been applied.
    fn persisted(&self, completion: Option<CompletionEvent>) -> Applied {
        Applied {
            changed: true,
            completion,
            warning: self.db.save_timer_state(self.timer.state()).err(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimerStatus;

    /// Recorder that remembers what it was told.
    #[derive(Default)]
    struct RecordedSessions(Vec<u32>);

    impl SessionRecorder for RecordedSessions {
        fn record_focus_session(&mut self, duration_mins: u32) {
            self.0.push(duration_mins);
        }
    }

    fn create_test_app() -> App<RecordedSessions> {
        let db = Database::new_in_memory().unwrap();
        App::with_parts(db, RecordedSessions::default()).unwrap()
    }

    fn run_until_completion<R: SessionRecorder>(app: &mut App<R>) -> CompletionEvent {
        loop {
            if let Some(event) = app.tick().completion {
                return event;
            }
        }
    }

    #[test]
    fn test_app_initial_state() {
        let app = create_test_app();
        assert_eq!(*app.state(), TimerState::default());
        assert_eq!(app.settings, Settings::default());
    }

    #[test]
    fn test_toggle_persists() {
        let mut app = create_test_app();
        let applied = app.toggle();

        assert!(applied.changed);
        assert!(applied.warning.is_none());
        assert!(app.db.load_timer_state().is_active);

        app.toggle();
        assert!(!app.db.load_timer_state().is_active);
    }

    #[test]
    fn test_tick_while_paused_does_nothing() {
        let mut app = create_test_app();
        let applied = app.tick();

        assert!(!applied.changed);
        assert!(applied.completion.is_none());
        assert_eq!(app.state().time_left_secs, 1500);
    }

    #[test]
    fn test_tick_persists_countdown() {
        let mut app = create_test_app();
        app.toggle();
        for _ in 0..10 {
            app.tick();
        }

        assert_eq!(app.state().time_left_secs, 1490);
        assert_eq!(app.db.load_timer_state().time_left_secs, 1490);
    }

    #[test]
    fn test_focus_completion_is_recorded() {
        let mut app = create_test_app();
        app.set_focus_duration(1);
        app.toggle();

        let event = run_until_completion(&mut app);

        assert_eq!(
            event,
            CompletionEvent::FocusComplete {
                count: 1,
                duration_mins: 1,
                is_long_break: false,
            }
        );
        assert_eq!(app.recorder.0, vec![1]);
        assert_eq!(app.state().status(), TimerStatus::BreakPaused);

        let stored = app.db.load_timer_state();
        assert_eq!(stored.completed_sessions, 1);
        assert_eq!(stored.total_focus_secs, 60);
        assert!(stored.is_break);
    }

    #[test]
    fn test_break_completion_is_not_recorded() {
        let mut app = create_test_app();
        app.switch_to_break();
        app.toggle();

        let event = run_until_completion(&mut app);

        assert_eq!(event, CompletionEvent::BreakComplete);
        assert!(app.recorder.0.is_empty());
        assert_eq!(app.state().status(), TimerStatus::FocusPaused);
    }

    #[test]
    fn test_recorded_once_per_focus_phase() {
        let mut app = create_test_app();
        app.set_focus_duration(1);

        for _ in 0..4 {
            app.switch_to_focus();
            run_until_completion(&mut app);
        }

        assert_eq!(app.recorder.0, vec![1, 1, 1, 1]);
        assert_eq!(app.state().completed_sessions, 4);
        assert_eq!(app.state().time_left_secs, 900);
    }

    #[test]
    fn test_invalid_duration_not_persisted() {
        let mut app = create_test_app();
        app.toggle();
        let before = *app.state();

        let applied = app.set_focus_duration(0);

        assert!(!applied.changed);
        assert_eq!(*app.state(), before);
        assert_eq!(app.db.load_timer_state(), before);
    }

    #[test]
    fn test_reset_persists() {
        let mut app = create_test_app();
        app.set_focus_duration(10);
        app.switch_to_break();
        app.reset();

        let stored = app.db.load_timer_state();
        assert!(!stored.is_break);
        assert!(!stored.is_active);
        assert_eq!(stored.time_left_secs, 600);
    }

    #[test]
    fn test_state_reloads_on_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");

        let saved = {
            let mut app =
                App::with_parts(Database::open(&path).unwrap(), RecordedSessions::default())
                    .unwrap();
            app.set_focus_duration(35);
            app.switch_to_focus();
            app.tick();
            *app.state()
        };

        let app =
            App::with_parts(Database::open(&path).unwrap(), RecordedSessions::default()).unwrap();
        assert_eq!(*app.state(), saved);
        assert_eq!(app.state().time_left_secs, 35 * 60 - 1);
    }

    #[test]
    fn test_persistence_failure_is_a_warning() {
        let mut app = create_test_app();
        app.db.drop_tables_for_test();

        let applied = app.toggle();

        assert!(applied.changed);
        assert!(applied.warning.is_some());
        assert!(app.state().is_active);
    }

    #[test]
    fn test_update_setting() {
        let mut app = create_test_app();
        app.update_setting(|s| s.sound_enabled = false);

        assert!(!app.settings.sound_enabled);

        // Verify it was saved
        let loaded = app.db.load_settings().unwrap();
        assert!(!loaded.sound_enabled);
    }

    #[test]
    fn test_stats_recorder_wiring() {
        let db = Database::new_in_memory().unwrap();
        let recorder = StatsRecorder::new(Database::new_in_memory().unwrap()).unwrap();
        let mut app = App::with_parts(db, recorder).unwrap();

        app.set_focus_duration(1);
        app.toggle();
        run_until_completion(&mut app);

        assert_eq!(app.recorder.stats().focus_sessions_completed, 1);
        assert_eq!(app.recorder.today().total_focus_minutes, 1);

        app.reset_today();
        assert_eq!(app.recorder.today().completed_pomodoros, 0);
        assert_eq!(app.recorder.stats().focus_sessions_completed, 1);
    }
}
