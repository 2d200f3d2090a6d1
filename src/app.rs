//! Application state: the timer engine plus its collaborators.

use crate::engine::{SessionCompleted, TimerEngine};
use crate::models::{Mode, Settings, Task};
use crate::persistence::{Database, DatabaseError};
use chrono::Local;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Main application state. The engine is the single writer of timer state;
/// the App layer turns its completion events into database side effects.
pub struct App {
    pub engine: TimerEngine,
    pub settings: Settings,
    pub db: Database,
}

impl App {
    /// Creates a new application instance.
    pub fn new() -> Result<Self, AppError> {
        let db = Database::new()?;
        Self::with_db(db)
    }

    /// Creates a new app with a custom database (for testing).
    #[cfg(test)]
    pub fn new_with_db(db: Database) -> Result<Self, AppError> {
        Self::with_db(db)
    }

    fn with_db(db: Database) -> Result<Self, AppError> {
        let settings = db.load_settings()?;
        let engine = TimerEngine::new(settings.timer.clone());
        Ok(Self {
            engine,
            settings,
            db,
        })
    }

    /// Advances the engine and applies completion side effects.
    /// Returns (display_changed, optional_completion_event).
    pub fn tick(&mut self, now_ms: u64) -> (bool, Option<SessionCompleted>) {
        let before = self.engine.seconds();
        let completion = self.engine.tick(now_ms);
        if let Some(ref event) = completion {
            self.record_completion(event);
        }
        let changed = completion.is_some() || self.engine.seconds() != before;
        (changed, completion)
    }

    /// Skips the current session, applying the same side effects as a
    /// natural completion.
    pub fn skip(&mut self, now_ms: u64) -> Option<SessionCompleted> {
        let completion = self.engine.skip(now_ms);
        if let Some(ref event) = completion {
            self.record_completion(event);
        }
        completion
    }

    /// Task and analytics bookkeeping for a finished session. Best-effort:
    /// the engine's transition has already happened, and database failures
    /// stay here.
    fn record_completion(&mut self, event: &SessionCompleted) {
        if event.mode != Mode::Work {
            return;
        }
        let today = Local::now().date_naive();
        if let Err(e) = self.db.log_session(today, event.duration_secs) {
            eprintln!("Failed to log session: {}", e);
        }
        if let Some(task_id) = event.task_id {
            if let Err(e) = self.db.increment_task_sessions(task_id) {
                eprintln!("Failed to update task {}: {}", task_id, e);
            }
        }
    }

    /// Updates a setting, saves it, and pushes the timer configuration into
    /// the engine so idle displays follow immediately.
    pub fn update_setting<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut Settings),
    {
        updater(&mut self.settings);
        let _ = self.db.save_settings(&self.settings);
        self.engine.set_config(self.settings.timer.clone());
    }

    /// Binds the engine to a task after checking it exists. Returns the
    /// bound task, or `None` when the id is unknown (binding untouched).
    pub fn bind_task(&mut self, id: i64) -> Result<Option<Task>, DatabaseError> {
        match self.db.get_task(id)? {
            Some(task) => {
                self.engine.bind_task(Some(id));
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Clears any bound task.
    pub fn unbind_task(&mut self) {
        self.engine.bind_task(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimerConfig;
    use crate::persistence::Database;
    use chrono::Local;

    fn create_test_app() -> App {
        let db = Database::new_in_memory().unwrap();
        App::new_with_db(db).unwrap()
    }

    #[test]
    fn test_app_initial_state() {
        let app = create_test_app();
        assert_eq!(app.settings, Settings::default());
        assert_eq!(app.engine.mode(), Mode::Work);
        assert_eq!(app.engine.seconds(), 1500);
        assert!(!app.engine.is_running());
    }

    #[test]
    fn test_tick_reports_display_changes() {
        let mut app = create_test_app();

        // Idle: nothing changes.
        let (changed, event) = app.tick(1_000);
        assert!(!changed);
        assert!(event.is_none());

        app.engine.toggle(1_000);
        let (changed, event) = app.tick(2_000);
        assert!(changed);
        assert!(event.is_none());

        // Same second: no visible change.
        let (changed, _) = app.tick(2_100);
        assert!(!changed);
    }

    #[test]
    fn test_work_completion_logs_session() {
        let mut app = create_test_app();
        app.engine.toggle(0);

        let event = app.tick(1_500_000).1.expect("completion");
        assert_eq!(event.mode, Mode::Work);

        let today = Local::now().date_naive();
        let stats = app.db.get_daily_stats(today).unwrap();
        assert_eq!(stats.sessions_completed, 1);
        assert_eq!(stats.focus_seconds, 1500);
    }

    #[test]
    fn test_skip_increments_bound_task() {
        let mut app = create_test_app();
        let task = app.db.create_task("Deep work", 4).unwrap();
        assert!(app.bind_task(task.id).unwrap().is_some());

        app.skip(0);

        let loaded = app.db.get_task(task.id).unwrap().unwrap();
        assert_eq!(loaded.completed_sessions, 1);
    }

    #[test]
    fn test_break_completion_records_nothing() {
        let mut app = create_test_app();
        app.skip(0); // work -> short break, logs one session
        app.skip(0); // short break -> work, logs nothing

        let today = Local::now().date_naive();
        let stats = app.db.get_daily_stats(today).unwrap();
        assert_eq!(stats.sessions_completed, 1);
    }

    #[test]
    fn test_unbound_completion_touches_no_task() {
        let mut app = create_test_app();
        let task = app.db.create_task("Untouched", 1).unwrap();

        app.skip(0);

        let loaded = app.db.get_task(task.id).unwrap().unwrap();
        assert_eq!(loaded.completed_sessions, 0);
    }

    #[test]
    fn test_bind_unknown_task_leaves_binding_untouched() {
        let mut app = create_test_app();
        let task = app.db.create_task("Real", 1).unwrap();
        app.bind_task(task.id).unwrap();

        assert!(app.bind_task(999).unwrap().is_none());
        assert_eq!(app.engine.task_id(), Some(task.id));

        app.unbind_task();
        assert_eq!(app.engine.task_id(), None);
    }

    #[test]
    fn test_update_setting_persists_and_reconfigures_engine() {
        let mut app = create_test_app();
        app.update_setting(|s| s.timer.work_secs = 1800);

        assert_eq!(app.engine.seconds(), 1800);
        let loaded = app.db.load_settings().unwrap();
        assert_eq!(loaded.timer.work_secs, 1800);
    }

    #[test]
    fn test_update_setting_does_not_disturb_running_timer() {
        let mut app = create_test_app();
        app.engine.toggle(0);
        app.tick(10_000);

        app.update_setting(|s| s.timer.work_secs = 3000);
        assert_eq!(app.engine.seconds(), 1490);
    }

    #[test]
    fn test_settings_load_configures_engine() {
        let db = Database::new_in_memory().unwrap();
        let settings = Settings {
            timer: TimerConfig {
                work_secs: 600,
                ..TimerConfig::default()
            },
            ..Settings::default()
        };
        db.save_settings(&settings).unwrap();

        let app = App::new_with_db(db).unwrap();
        assert_eq!(app.engine.seconds(), 600);
    }
}
