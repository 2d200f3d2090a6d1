//! Data models for the Pomidor application.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Timer mode. The three countdown modes take their duration from the
/// configuration; the stopwatch counts up and never completes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Focused work session.
    #[default]
    Work,
    /// Short break between work sessions.
    ShortBreak,
    /// Long break after a full cycle of work sessions.
    LongBreak,
    /// Free-running count-up timer.
    Stopwatch,
}

impl Mode {
    /// Returns true for modes that count down toward zero.
    pub fn is_countdown(&self) -> bool {
        !matches!(self, Self::Stopwatch)
    }

    /// Returns true for either break mode.
    pub fn is_break(&self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }

    /// Human-readable label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::ShortBreak => "short break",
            Self::LongBreak => "long break",
            Self::Stopwatch => "stopwatch",
        }
    }

    /// Parses a mode name as typed at the prompt.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "work" | "w" => Some(Self::Work),
            "short" | "short_break" | "sb" => Some(Self::ShortBreak),
            "long" | "long_break" | "lb" => Some(Self::LongBreak),
            "stopwatch" | "sw" => Some(Self::Stopwatch),
            _ => None,
        }
    }
}

/// Countdown durations and session-chaining policy, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerConfig {
    /// Duration of a work session.
    pub work_secs: u32,
    /// Duration of a short break.
    pub short_break_secs: u32,
    /// Duration of a long break.
    pub long_break_secs: u32,
    /// Completed work sessions between long breaks. 0 disables long breaks.
    pub long_break_interval: u32,
    /// Whether breaks begin running as soon as a work session completes.
    pub auto_start_breaks: bool,
    /// Whether the next work session begins as soon as a break completes.
    pub auto_start_work: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            long_break_interval: 4,
            auto_start_breaks: false,
            auto_start_work: false,
        }
    }
}

impl TimerConfig {
    /// Configured duration for a mode; the stopwatch starts at zero.
    pub fn duration_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_secs,
            Mode::ShortBreak => self.short_break_secs,
            Mode::LongBreak => self.long_break_secs,
            Mode::Stopwatch => 0,
        }
    }
}

/// User-configurable settings, persisted as a JSON blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Timer durations and chaining policy.
    pub timer: TimerConfig,
    /// Whether to play a chime on timer completion.
    pub sound_enabled: bool,
    /// Whether to show desktop notifications.
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}

/// A tracked task. The timer engine only ever holds a task id; the task
/// itself lives in the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    /// How many work sessions the task is expected to take.
    pub estimated_sessions: u32,
    /// Work sessions completed while this task was bound.
    pub completed_sessions: u32,
    pub done: bool,
    pub created_at: NaiveDate,
}

/// Per-day focus statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub focus_seconds: u32,
    pub sessions_completed: u32,
}

impl DailyStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            focus_seconds: 0,
            sessions_completed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_is_countdown() {
        assert!(Mode::Work.is_countdown());
        assert!(Mode::ShortBreak.is_countdown());
        assert!(Mode::LongBreak.is_countdown());
        assert!(!Mode::Stopwatch.is_countdown());
    }

    #[test]
    fn test_mode_is_break() {
        assert!(!Mode::Work.is_break());
        assert!(Mode::ShortBreak.is_break());
        assert!(Mode::LongBreak.is_break());
        assert!(!Mode::Stopwatch.is_break());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("work"), Some(Mode::Work));
        assert_eq!(Mode::parse("w"), Some(Mode::Work));
        assert_eq!(Mode::parse("short"), Some(Mode::ShortBreak));
        assert_eq!(Mode::parse("long_break"), Some(Mode::LongBreak));
        assert_eq!(Mode::parse("sw"), Some(Mode::Stopwatch));
        assert_eq!(Mode::parse("nap"), None);
    }

    #[test]
    fn test_timer_config_default() {
        let config = TimerConfig::default();
        assert_eq!(config.work_secs, 1500);
        assert_eq!(config.short_break_secs, 300);
        assert_eq!(config.long_break_secs, 900);
        assert_eq!(config.long_break_interval, 4);
        assert!(!config.auto_start_breaks);
        assert!(!config.auto_start_work);
    }

    #[test]
    fn test_duration_for_mode() {
        let config = TimerConfig::default();
        assert_eq!(config.duration_for(Mode::Work), 1500);
        assert_eq!(config.duration_for(Mode::ShortBreak), 300);
        assert_eq!(config.duration_for(Mode::LongBreak), 900);
        assert_eq!(config.duration_for(Mode::Stopwatch), 0);
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.timer, TimerConfig::default());
        assert!(settings.sound_enabled);
        assert!(settings.notifications_enabled);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = Settings {
            timer: TimerConfig {
                work_secs: 1800,
                long_break_interval: 3,
                auto_start_breaks: true,
                ..TimerConfig::default()
            },
            sound_enabled: false,
            notifications_enabled: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, settings);
    }
}
