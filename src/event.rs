//! Command handling for the interactive prompt.

use crate::app::App;
use crate::engine::SessionCompleted;
use crate::models::Mode;
use crate::timer::format_time;
use chrono::Local;

/// Result of handling one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Line handled, nothing to show.
    Continue,
    /// User requested quit.
    Quit,
    /// Timer state changed, status line needs reprint.
    StateChanged,
    /// Settings changed, status line needs reprint.
    SettingsChanged,
    /// State changed with a completion event.
    StateChangedWithCompletion(SessionCompleted),
    /// Text to print back to the user.
    Message(String),
}

const USAGE: &str = "\
commands:
  start | pause        toggle the timer
  reset                restore the configured duration
  skip                 finish the current session now
  mode <m>             work | short | long | stopwatch
  time <secs>          edit a paused countdown
  add <title>          add a task (optional trailing estimate, e.g. 'add report 3')
  tasks                list tasks
  task <id> | none     bind sessions to a task / unbind
  done <id>            mark a task done
  del <id>             delete a task
  stats                today, last 7 days, streak
  set <key> <value>    work|short|long <secs>, interval <n>,
                       autobreaks|autowork|sound|notify on|off
  status               reprint the status line
  quit";

/// Handles one input line and updates the app state accordingly.
pub fn handle_command(app: &mut App, line: &str, now_ms: u64) -> EventResult {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return EventResult::Continue;
    };

    match cmd {
        "start" | "pause" | "toggle" | "p" => {
            app.engine.toggle(now_ms);
            EventResult::StateChanged
        }
        "reset" | "r" => {
            app.engine.reset();
            EventResult::StateChanged
        }
        "skip" | "s" => match app.skip(now_ms) {
            Some(event) => EventResult::StateChangedWithCompletion(event),
            None => EventResult::Continue,
        },
        "mode" | "m" => match parts.next().and_then(Mode::parse) {
            Some(mode) => {
                app.engine.set_mode(mode);
                EventResult::StateChanged
            }
            None => EventResult::Message("usage: mode work|short|long|stopwatch".into()),
        },
        "time" | "t" => match parts.next().and_then(|s| s.parse::<u32>().ok()) {
            Some(secs) => {
                // The engine silently rejects invalid retargets.
                app.engine.retarget(secs);
                EventResult::StateChanged
            }
            None => EventResult::Message("usage: time <seconds>".into()),
        },
        "add" => handle_add(app, parts.collect::<Vec<_>>()),
        "tasks" | "ls" => match app.db.list_tasks() {
            Ok(tasks) => EventResult::Message(format_task_list(&tasks, app.engine.task_id())),
            Err(e) => EventResult::Message(format!("Failed to list tasks: {}", e)),
        },
        "task" => match parts.next() {
            Some("none") => {
                app.unbind_task();
                EventResult::Message("Task unbound".into())
            }
            Some(arg) => match arg.parse::<i64>() {
                Ok(id) => match app.bind_task(id) {
                    Ok(Some(task)) => {
                        EventResult::Message(format!("Tracking #{} {}", task.id, task.title))
                    }
                    Ok(None) => EventResult::Message(format!("No task #{}", id)),
                    Err(e) => EventResult::Message(format!("Failed to bind task: {}", e)),
                },
                Err(_) => EventResult::Message("usage: task <id> | task none".into()),
            },
            None => EventResult::Message("usage: task <id> | task none".into()),
        },
        "done" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
            Some(id) => match app.db.set_task_done(id, true) {
                Ok(()) => EventResult::Message(format!("Task #{} done", id)),
                Err(e) => EventResult::Message(format!("Failed to update task: {}", e)),
            },
            None => EventResult::Message("usage: done <id>".into()),
        },
        "del" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
            Some(id) => match app.db.delete_task(id) {
                Ok(()) => {
                    if app.engine.task_id() == Some(id) {
                        app.unbind_task();
                    }
                    EventResult::Message(format!("Task #{} deleted", id))
                }
                Err(e) => EventResult::Message(format!("Failed to delete task: {}", e)),
            },
            None => EventResult::Message("usage: del <id>".into()),
        },
        "stats" => EventResult::Message(format_stats(app)),
        "set" => handle_setting_change(app, parts.next(), parts.next()),
        "status" => EventResult::StateChanged,
        "help" | "?" => EventResult::Message(USAGE.into()),
        "quit" | "exit" | "q" => EventResult::Quit,
        _ => EventResult::Message(format!("Unknown command: {} (try 'help')", cmd)),
    }
}

fn handle_add(app: &mut App, mut words: Vec<&str>) -> EventResult {
    if words.is_empty() {
        return EventResult::Message("usage: add <title> [estimate]".into());
    }

    // A trailing number is the session estimate.
    let estimate = match words.last().and_then(|w| w.parse::<u32>().ok()) {
        Some(n) if words.len() > 1 && n > 0 => {
            words.pop();
            n
        }
        _ => 1,
    };

    let title = words.join(" ");
    match app.db.create_task(&title, estimate) {
        Ok(task) => EventResult::Message(format!("Added #{} {}", task.id, task.title)),
        Err(e) => EventResult::Message(format!("Failed to add task: {}", e)),
    }
}

/// Handles `set <key> <value>` settings changes.
fn handle_setting_change(app: &mut App, key: Option<&str>, value: Option<&str>) -> EventResult {
    let (Some(key), Some(value)) = (key, value) else {
        return EventResult::Message("usage: set <key> <value>".into());
    };

    match key {
        "work" | "short" | "long" => {
            let Ok(secs) = value.parse::<u32>() else {
                return EventResult::Message(format!("usage: set {} <seconds>", key));
            };
            app.update_setting(|s| match key {
                "work" => s.timer.work_secs = secs,
                "short" => s.timer.short_break_secs = secs,
                _ => s.timer.long_break_secs = secs,
            });
            EventResult::SettingsChanged
        }
        "interval" => {
            let Ok(n) = value.parse::<u32>() else {
                return EventResult::Message("usage: set interval <count>".into());
            };
            app.update_setting(|s| s.timer.long_break_interval = n);
            EventResult::SettingsChanged
        }
        "autobreaks" | "autowork" | "sound" | "notify" => {
            let on = match value {
                "on" | "true" => true,
                "off" | "false" => false,
                _ => return EventResult::Message(format!("usage: set {} on|off", key)),
            };
            app.update_setting(|s| match key {
                "autobreaks" => s.timer.auto_start_breaks = on,
                "autowork" => s.timer.auto_start_work = on,
                "sound" => s.sound_enabled = on,
                _ => s.notifications_enabled = on,
            });
            EventResult::SettingsChanged
        }
        _ => EventResult::Message(format!("Unknown setting: {}", key)),
    }
}

fn format_task_list(tasks: &[crate::models::Task], bound: Option<i64>) -> String {
    if tasks.is_empty() {
        return "No tasks. Use 'add <title>' to create one.".to_string();
    }
    let mut lines = Vec::with_capacity(tasks.len());
    for task in tasks {
        let marker = if task.done {
            'x'
        } else if bound == Some(task.id) {
            '>'
        } else {
            ' '
        };
        lines.push(format!(
            "{} #{:<3} {} ({}/{})",
            marker, task.id, task.title, task.completed_sessions, task.estimated_sessions
        ));
    }
    lines.join("\n")
}

fn format_stats(app: &App) -> String {
    let today = Local::now().date_naive();
    let daily = app.db.get_daily_stats(today);
    let week = app.db.week_stats(today);
    let total = app.db.total_sessions();
    let streak = app.db.current_streak(today);

    match (daily, week, total, streak) {
        (Ok(daily), Ok(week), Ok(total), Ok(streak)) => {
            let week_sessions: u32 = week.iter().map(|d| d.sessions_completed).sum();
            format!(
                "today: {} sessions, {} focused\nlast 7 days: {} sessions\nall time: {} sessions, streak: {} days",
                daily.sessions_completed,
                format_time(daily.focus_seconds),
                week_sessions,
                total,
                streak
            )
        }
        _ => "Failed to load stats".to_string(),
    }
}
