//! SQLite persistence for settings, tasks, and daily focus statistics.

use crate::models::{DailyStats, Settings, Task};
use chrono::{Days, Local, NaiveDate};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

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
    /// Opens the database at its default location, initializing tables if
    /// needed.
    pub fn new() -> Result<Self, DatabaseError> {
        let db_path = Self::db_path();

        // Ensure directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| DatabaseError::DirectoryCreation)?;
        }

        Self::open(&db_path)
    }

    /// Opens a database at an explicit path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                estimated_sessions INTEGER NOT NULL DEFAULT 1,
                completed_sessions INTEGER NOT NULL DEFAULT 0,
                done INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_stats (
                date TEXT PRIMARY KEY,
                focus_seconds INTEGER NOT NULL DEFAULT 0,
                sessions_completed INTEGER NOT NULL DEFAULT 0
            );
        "#,
        )?;
        Ok(())
    }

    fn db_path() -> PathBuf {
        ProjectDirs::from("io", "pomidor", "Pomidor")
            .map(|dirs| dirs.data_dir().join("pomidor.db"))
            .unwrap_or_else(|| PathBuf::from("pomidor.db"))
    }

    /// Loads settings from the database, returning defaults if not found.
    pub fn load_settings(&self) -> Result<Settings, DatabaseError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = 'config'",
                [],
                |row| row.get(0),
            )
            .ok();

        match json {
            Some(j) => Ok(serde_json::from_str(&j)?),
            None => Ok(Settings::default()),
        }
    }

    /// Saves settings to the database.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(settings)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES ('config', ?)",
            [&json],
        )?;
        Ok(())
    }

    /// Inserts a new task and returns it with its assigned id.
    pub fn create_task(&self, title: &str, estimated: u32) -> Result<Task, DatabaseError> {
        let created_at = Local::now().date_naive();
        self.conn.execute(
            "INSERT INTO tasks (title, estimated_sessions, created_at) VALUES (?, ?, ?)",
            params![title, estimated, created_at.to_string()],
        )?;
        Ok(Task {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            estimated_sessions: estimated,
            completed_sessions: 0,
            done: false,
            created_at,
        })
    }

    /// Returns all tasks, open ones first.
    pub fn list_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, estimated_sessions, completed_sessions, done, created_at
             FROM tasks ORDER BY done, id",
        )?;
        let tasks = stmt
            .query_map([], Self::task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Looks up a single task by id.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, title, estimated_sessions, completed_sessions, done, created_at
             FROM tasks WHERE id = ?",
            [id],
            Self::task_from_row,
        );
        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let created: String = row.get(5)?;
        let created_at = created.parse::<NaiveDate>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            estimated_sessions: row.get(2)?,
            completed_sessions: row.get(3)?,
            done: row.get(4)?,
            created_at,
        })
    }

    /// Marks a task done or reopens it.
    pub fn set_task_done(&self, id: i64, done: bool) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE tasks SET done = ? WHERE id = ?",
            params![done, id],
        )?;
        Ok(())
    }

    /// Deletes a task.
    pub fn delete_task(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM tasks WHERE id = ?", [id])?;
        Ok(())
    }

    /// Adds one completed work session to a task's counter.
    pub fn increment_task_sessions(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE tasks SET completed_sessions = completed_sessions + 1 WHERE id = ?",
            [id],
        )?;
        Ok(())
    }

    /// Records one completed work session of `duration_secs` on the given day.
    pub fn log_session(&self, date: NaiveDate, duration_secs: u32) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO daily_stats (date, focus_seconds, sessions_completed)
             VALUES (?1, ?2, 1)
             ON CONFLICT(date) DO UPDATE SET
                 focus_seconds = focus_seconds + ?2,
                 sessions_completed = sessions_completed + 1",
            params![date.to_string(), duration_secs],
        )?;
        Ok(())
    }

    /// Gets daily statistics for a specific date, empty if none recorded.
    pub fn get_daily_stats(&self, date: NaiveDate) -> Result<DailyStats, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT focus_seconds, sessions_completed FROM daily_stats WHERE date = ?",
            [date.to_string()],
            |row| {
                Ok(DailyStats {
                    date,
                    focus_seconds: row.get(0)?,
                    sessions_completed: row.get(1)?,
                })
            },
        );

        match result {
            Ok(stats) => Ok(stats),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(DailyStats::empty(date)),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the seven days ending at `end`, oldest first.
    pub fn week_stats(&self, end: NaiveDate) -> Result<Vec<DailyStats>, DatabaseError> {
        let mut week = Vec::with_capacity(7);
        for back in (0..7).rev() {
            let Some(date) = end.checked_sub_days(Days::new(back)) else {
                continue;
            };
            week.push(self.get_daily_stats(date)?);
        }
        Ok(week)
    }

    /// Total completed work sessions across all recorded days.
    pub fn total_sessions(&self) -> Result<u32, DatabaseError> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(sessions_completed), 0) FROM daily_stats",
            [],
            |row| row.get(0),
        )?;
        Ok(total as u32)
    }

    /// Consecutive days with at least one completed session, counting back
    /// from `today`. A quiet day today does not break yesterday's streak.
    pub fn current_streak(&self, today: NaiveDate) -> Result<u32, DatabaseError> {
        let mut day = today;
        if self.get_daily_stats(day)?.sessions_completed == 0 {
            match day.checked_sub_days(Days::new(1)) {
                Some(yesterday) => day = yesterday,
                None => return Ok(0),
            }
        }

        let mut streak = 0;
        while self.get_daily_stats(day)?.sessions_completed > 0 {
            streak += 1;
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => break,
            }
        }
        Ok(streak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimerConfig;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_database_creation() {
        let db = Database::new_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_database_creation_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomidor.db");
        let db = Database::open(&path).unwrap();
        db.save_settings(&Settings::default()).unwrap();
        drop(db);

        // Reopening sees the persisted settings.
        let db = Database::open(&path).unwrap();
        assert_eq!(db.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_save_and_load() {
        let db = Database::new_in_memory().unwrap();

        // Default settings should be returned when nothing is saved
        let settings = db.load_settings().unwrap();
        assert_eq!(settings, Settings::default());

        let custom = Settings {
            timer: TimerConfig {
                work_secs: 1800,
                short_break_secs: 600,
                long_break_secs: 1200,
                long_break_interval: 3,
                auto_start_breaks: true,
                auto_start_work: false,
            },
            sound_enabled: false,
            notifications_enabled: true,
        };
        db.save_settings(&custom).unwrap();

        let loaded = db.load_settings().unwrap();
        assert_eq!(loaded, custom);
    }

    #[test]
    fn test_settings_overwrite() {
        let db = Database::new_in_memory().unwrap();

        let mut settings = Settings::default();
        settings.timer.work_secs = 1800;
        db.save_settings(&settings).unwrap();

        settings.timer.work_secs = 2700;
        db.save_settings(&settings).unwrap();

        let loaded = db.load_settings().unwrap();
        assert_eq!(loaded.timer.work_secs, 2700);
    }

    #[test]
    fn test_create_and_list_tasks() {
        let db = Database::new_in_memory().unwrap();

        let a = db.create_task("Write report", 3).unwrap();
        let b = db.create_task("Review patches", 1).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.completed_sessions, 0);

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Write report");
        assert_eq!(tasks[1].title, "Review patches");
    }

    #[test]
    fn test_done_tasks_sort_last() {
        let db = Database::new_in_memory().unwrap();
        let a = db.create_task("First", 1).unwrap();
        db.create_task("Second", 1).unwrap();

        db.set_task_done(a.id, true).unwrap();
        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks[0].title, "Second");
        assert_eq!(tasks[1].title, "First");
        assert!(tasks[1].done);
    }

    #[test]
    fn test_get_task_missing() {
        let db = Database::new_in_memory().unwrap();
        assert_eq!(db.get_task(42).unwrap(), None);
    }

    #[test]
    fn test_increment_task_sessions() {
        let db = Database::new_in_memory().unwrap();
        let task = db.create_task("Focus", 2).unwrap();

        db.increment_task_sessions(task.id).unwrap();
        db.increment_task_sessions(task.id).unwrap();

        let loaded = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(loaded.completed_sessions, 2);
    }

    #[test]
    fn test_delete_task() {
        let db = Database::new_in_memory().unwrap();
        let task = db.create_task("Temp", 1).unwrap();
        db.delete_task(task.id).unwrap();
        assert_eq!(db.get_task(task.id).unwrap(), None);
    }

    #[test]
    fn test_log_session_accumulates() {
        let db = Database::new_in_memory().unwrap();
        let day = date(2024, 3, 11);

        db.log_session(day, 1500).unwrap();
        db.log_session(day, 1500).unwrap();

        let stats = db.get_daily_stats(day).unwrap();
        assert_eq!(stats.sessions_completed, 2);
        assert_eq!(stats.focus_seconds, 3000);
    }

    #[test]
    fn test_daily_stats_for_nonexistent_date() {
        let db = Database::new_in_memory().unwrap();
        let day = date(2024, 1, 15);
        let stats = db.get_daily_stats(day).unwrap();
        assert_eq!(stats.date, day);
        assert_eq!(stats.sessions_completed, 0);
        assert_eq!(stats.focus_seconds, 0);
    }

    #[test]
    fn test_week_stats_spans_seven_days() {
        let db = Database::new_in_memory().unwrap();
        let end = date(2024, 3, 11);
        db.log_session(end, 1500).unwrap();
        db.log_session(date(2024, 3, 5), 1500).unwrap();
        db.log_session(date(2024, 3, 4), 1500).unwrap(); // outside window

        let week = db.week_stats(end).unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2024, 3, 5));
        assert_eq!(week[0].sessions_completed, 1);
        assert_eq!(week[6].date, end);
        assert_eq!(week[6].sessions_completed, 1);
        assert_eq!(week[3].sessions_completed, 0);
    }

    #[test]
    fn test_total_sessions() {
        let db = Database::new_in_memory().unwrap();
        assert_eq!(db.total_sessions().unwrap(), 0);

        db.log_session(date(2024, 3, 10), 1500).unwrap();
        db.log_session(date(2024, 3, 11), 1500).unwrap();
        db.log_session(date(2024, 3, 11), 1500).unwrap();
        assert_eq!(db.total_sessions().unwrap(), 3);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let db = Database::new_in_memory().unwrap();
        let today = date(2024, 3, 11);
        db.log_session(today, 1500).unwrap();
        db.log_session(date(2024, 3, 10), 1500).unwrap();
        db.log_session(date(2024, 3, 9), 1500).unwrap();
        db.log_session(date(2024, 3, 7), 1500).unwrap(); // gap on the 8th

        assert_eq!(db.current_streak(today).unwrap(), 3);
    }

    #[test]
    fn test_streak_survives_quiet_today() {
        let db = Database::new_in_memory().unwrap();
        let today = date(2024, 3, 11);
        db.log_session(date(2024, 3, 10), 1500).unwrap();
        db.log_session(date(2024, 3, 9), 1500).unwrap();

        assert_eq!(db.current_streak(today).unwrap(), 2);
    }

    #[test]
    fn test_streak_zero_without_recent_activity() {
        let db = Database::new_in_memory().unwrap();
        let today = date(2024, 3, 11);
        db.log_session(date(2024, 3, 1), 1500).unwrap();
        assert_eq!(db.current_streak(today).unwrap(), 0);
    }
}
