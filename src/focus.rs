//! Focus timer core: the Pomodoro state machine.
//!
//! `FocusTimer` owns the `TimerState` and performs no I/O. Every operation
//! mutates the state in place and reports what happened; persisting the new
//! state and recording completed sessions is left to the caller.

use crate::models::{
    break_mins_for, is_long_break, is_valid_focus_mins, TimerState, LONG_BREAK_MINS,
    SHORT_BREAK_MINS,
};

/// Events that should trigger notifications/sounds and session recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEvent {
    FocusComplete {
        /// Completed focus sessions after this one.
        count: u32,
        duration_mins: u32,
        is_long_break: bool,
    },
    BreakComplete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusTimer {
    state: TimerState,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::from_state(TimerState::default())
    }
}

impl FocusTimer {
    /// Wraps a previously persisted state.
    ///
    /// A missing or inconsistent phase length is inferred from the phase and
    /// the time left.
    pub fn from_state(mut state: TimerState) -> Self {
        if !is_known_phase_length(&state) {
            state.phase_secs = if !state.is_break {
                state.focus_secs()
            } else if state.time_left_secs > SHORT_BREAK_MINS * 60 {
                LONG_BREAK_MINS * 60
            } else {
                SHORT_BREAK_MINS * 60
            };
        }
        state.phase_secs = state.phase_secs.max(state.time_left_secs);

        Self { state }
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Flips between running and paused.
    pub fn toggle(&mut self) {
        self.state.is_active = !self.state.is_active;
    }

    /// Pauses and rewinds to the start of a focus phase.
    pub fn reset(&mut self) {
        self.state.is_active = false;
        self.state.is_break = false;
        self.start_phase(self.state.focus_secs());
    }

    /// Changes the focus length, pausing the timer and restarting the phase clock.
    ///
    /// Values outside [1, 60] minutes leave the state untouched. Returns
    /// whether the change was applied.
    pub fn set_focus_duration(&mut self, mins: u32) -> bool {
        if !is_valid_focus_mins(mins) {
            return false;
        }

        self.state.focus_mins = mins;
        self.state.is_active = false;
        self.start_phase(mins * 60);
        true
    }

    /// Advances the timer by one second.
    ///
    /// A tick while paused does nothing. When the phase runs out the timer
    /// moves to the next phase and pauses itself.
    pub fn tick(&mut self) -> Option<CompletionEvent> {
        if !self.state.is_active {
            return None;
        }

        self.state.time_left_secs = self.state.time_left_secs.saturating_sub(1);
        if self.state.time_left_secs > 0 {
            return None;
        }

        let event = if self.state.is_break {
            self.finish_break()
        } else {
            self.finish_focus()
        };
        self.state.is_active = false;
        Some(event)
    }

    fn finish_focus(&mut self) -> CompletionEvent {
        self.state.completed_sessions = self.state.completed_sessions.saturating_add(1);
        self.state.total_focus_secs = self
            .state
            .total_focus_secs
            .saturating_add(u64::from(self.state.focus_secs()));

        let count = self.state.completed_sessions;
        let is_long = is_long_break(count);
        self.state.is_break = true;
        self.start_phase(break_mins_for(count) * 60);

        CompletionEvent::FocusComplete {
            count,
            duration_mins: self.state.focus_mins,
            is_long_break: is_long,
        }
    }

    fn finish_break(&mut self) -> CompletionEvent {
        self.state.is_break = false;
        self.start_phase(self.state.focus_secs());
        CompletionEvent::BreakComplete
    }

    /// Jumps to a fresh focus phase and starts it right away.
    pub fn switch_to_focus(&mut self) {
        self.state.is_break = false;
        self.state.is_active = true;
        self.start_phase(self.state.focus_secs());
    }

    /// Jumps to a paused break sized as if the current session had completed.
    pub fn switch_to_break(&mut self) {
        self.state.is_break = true;
        self.state.is_active = false;
        let next_session = self.state.completed_sessions.saturating_add(1);
        self.start_phase(break_mins_for(next_session) * 60);
    }

    /// Returns true if the current phase is a long break.
    pub fn is_long_break(&self) -> bool {
        self.state.is_break && self.state.phase_secs == LONG_BREAK_MINS * 60
    }

    /// Returns the progress through the current phase (0.0 to 1.0).
    pub fn progress_percent(&self) -> f32 {
        if self.state.phase_secs == 0 {
            return 1.0;
        }
        1.0 - (self.state.time_left_secs as f32 / self.state.phase_secs as f32)
    }

    fn start_phase(&mut self, secs: u32) {
        self.state.time_left_secs = secs;
        self.state.phase_secs = secs;
    }
}

fn is_known_phase_length(state: &TimerState) -> bool {
    if state.is_break {
        state.phase_secs == SHORT_BREAK_MINS * 60 || state.phase_secs == LONG_BREAK_MINS * 60
    } else {
        state.phase_secs == state.focus_secs()
    }
}
