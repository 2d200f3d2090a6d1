//! Drift-corrected countdown/stopwatch state machine.
//!
//! The engine owns no thread and reads no clock: every time-dependent
//! operation takes an explicit `now_ms`, so the tick loop feeds it wall-clock
//! milliseconds and tests feed it simulated values. While running, the
//! displayed seconds are recomputed from an absolute reference on every tick
//! instead of being decremented, so irregular tick scheduling cannot
//! accumulate error.

use crate::models::{Mode, TimerConfig};

/// Emitted exactly once per finished session, whether it reached zero
/// naturally or was skipped. Never emitted on reset or mode switches.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCompleted {
    /// Mode of the session that just finished.
    pub mode: Mode,
    /// Configured duration of the finished session, not wall-clock elapsed.
    pub duration_secs: u32,
    /// Task bound at completion time, if any.
    pub task_id: Option<i64>,
    /// Cumulative completed work sessions after this completion.
    pub sessions_completed: u32,
    /// Mode the engine transitioned into.
    pub next_mode: Mode,
    /// Whether the next session began running immediately.
    pub auto_started: bool,
}

/// The timer state machine.
///
/// Holds the current mode, the displayed seconds (remaining for countdown
/// modes, elapsed for the stopwatch), the running flag, and the cumulative
/// work-session counter that drives long-break scheduling. The configuration
/// is a read-only input replaced through [`TimerEngine::set_config`].
#[derive(Debug, Clone)]
pub struct TimerEngine {
    config: TimerConfig,
    mode: Mode,
    /// Remaining seconds (countdown modes) or elapsed seconds (stopwatch).
    seconds: u32,
    running: bool,
    sessions_completed: u32,
    active_task_id: Option<i64>,
    /// Absolute end time while a countdown runs.
    target_end_ms: Option<u64>,
    /// Absolute start time while the stopwatch runs.
    started_ms: Option<u64>,
}

impl TimerEngine {
    pub fn new(config: TimerConfig) -> Self {
        let seconds = config.duration_for(Mode::Work);
        Self {
            config,
            mode: Mode::Work,
            seconds,
            running: false,
            sessions_completed: 0,
            active_task_id: None,
            target_end_ms: None,
            started_ms: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Remaining seconds in countdown modes, elapsed seconds on the stopwatch.
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn task_id(&self) -> Option<i64> {
        self.active_task_id
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Fractional completion in [0, 1] for display. Fixed at 1.0 for the
    /// stopwatch, which has no bound; 0.0 when the configured total is zero.
    pub fn progress(&self) -> f32 {
        if self.mode == Mode::Stopwatch {
            return 1.0;
        }
        let total = self.config.duration_for(self.mode);
        if total == 0 {
            return 0.0;
        }
        // A retarget or config edit can leave more seconds than the
        // configured total; clamp so the display never leaves the range.
        (1.0 - self.seconds as f32 / total as f32).clamp(0.0, 1.0)
    }

    /// Starts the timer if paused, pauses it if running.
    pub fn toggle(&mut self, now_ms: u64) {
        if self.running {
            self.pause(now_ms);
        } else {
            self.start(now_ms);
        }
    }

    fn start(&mut self, now_ms: u64) {
        self.running = true;
        if self.mode == Mode::Stopwatch {
            // Derive the start time from the elapsed seconds so a resumed
            // stopwatch continues from where it paused.
            self.started_ms = Some(now_ms.saturating_sub(u64::from(self.seconds) * 1000));
        } else {
            self.target_end_ms = Some(now_ms + u64::from(self.seconds) * 1000);
        }
    }

    fn pause(&mut self, now_ms: u64) {
        // Flush the drift-corrected value before dropping the reference so a
        // pause between ticks keeps the latest second as the resume basis.
        self.refresh(now_ms);
        self.running = false;
        self.target_end_ms = None;
        self.started_ms = None;
    }

    /// Recomputes the displayed seconds from the absolute reference.
    fn refresh(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        if let Some(target) = self.target_end_ms {
            self.seconds = target.saturating_sub(now_ms).div_ceil(1000) as u32;
        } else if let Some(started) = self.started_ms {
            self.seconds = (now_ms.saturating_sub(started) / 1000) as u32;
        }
    }

    /// Advances the clock. Returns a completion when a countdown crosses zero.
    /// Ticks arriving after a pause, reset, or mode switch are ignored.
    pub fn tick(&mut self, now_ms: u64) -> Option<SessionCompleted> {
        if !self.running {
            return None;
        }
        self.refresh(now_ms);
        if self.mode.is_countdown() && self.seconds == 0 {
            return Some(self.complete(now_ms));
        }
        None
    }

    /// Forces the current session to complete as if it had reached zero.
    /// No-op on the stopwatch, which has no completion to force.
    pub fn skip(&mut self, now_ms: u64) -> Option<SessionCompleted> {
        if self.mode == Mode::Stopwatch {
            return None;
        }
        Some(self.complete(now_ms))
    }

    /// Stops the timer and restores the configured duration for the current
    /// mode (zero for the stopwatch).
    pub fn reset(&mut self) {
        self.running = false;
        self.target_end_ms = None;
        self.started_ms = None;
        self.seconds = self.config.duration_for(self.mode);
    }

    /// Switches mode, discarding any in-flight session. Re-selecting the
    /// mode of a running timer is a no-op.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.running && mode == self.mode {
            return;
        }
        self.running = false;
        self.target_end_ms = None;
        self.started_ms = None;
        self.mode = mode;
        self.seconds = self.config.duration_for(mode);
    }

    /// Edits the displayed time of a paused countdown. Silently rejected
    /// while running, in stopwatch mode, or for zero seconds.
    pub fn retarget(&mut self, secs: u32) {
        if self.running || self.mode == Mode::Stopwatch || secs == 0 {
            return;
        }
        self.seconds = secs;
    }

    /// Installs a new configuration. The displayed time follows immediately
    /// while idle; a session in progress keeps its current target.
    pub fn set_config(&mut self, config: TimerConfig) {
        self.config = config;
        if !self.running {
            self.seconds = self.config.duration_for(self.mode);
        }
    }

    /// Binds the work-session counter to a task, or unbinds with `None`.
    pub fn bind_task(&mut self, task_id: Option<i64>) {
        self.active_task_id = task_id;
    }

    /// The completion transition: stop, count a finished work session, pick
    /// the next mode, and auto-start it when the matching flag is set.
    fn complete(&mut self, now_ms: u64) -> SessionCompleted {
        let finished = self.mode;
        let duration_secs = self.config.duration_for(finished);
        self.running = false;
        self.target_end_ms = None;

        let next_mode = if finished == Mode::Work {
            self.sessions_completed += 1;
            let interval = self.config.long_break_interval;
            if interval > 0 && self.sessions_completed % interval == 0 {
                Mode::LongBreak
            } else {
                Mode::ShortBreak
            }
        } else {
            Mode::Work
        };

        self.mode = next_mode;
        self.seconds = self.config.duration_for(next_mode);

        let auto_started = match next_mode {
            Mode::Work => self.config.auto_start_work,
            Mode::ShortBreak | Mode::LongBreak => self.config.auto_start_breaks,
            Mode::Stopwatch => false,
        };
        if auto_started {
            self.start(now_ms);
        }

        SessionCompleted {
            mode: finished,
            duration_secs,
            task_id: self.active_task_id,
            sessions_completed: self.sessions_completed,
            next_mode,
            auto_started,
        }
    }
}
