//! Timer tick loop and time formatting.

use crate::app::App;
use crate::engine::SessionCompleted;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Message sent from the tick thread to the main loop.
#[derive(Debug, Clone)]
pub enum TimerMessage {
    /// Timer state has changed, status line needs update.
    StateChanged { line: String },
    /// A session completed, trigger notification/sound.
    Completed(SessionCompleted),
}

/// Current wall-clock time in milliseconds. The engine never reads a clock
/// itself; this is the single production source of `now_ms`.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Runs the timer loop, ticking every second.
/// Sends messages to the main thread via the provided channel.
pub fn run_timer_loop(app: Arc<Mutex<App>>, tx: Sender<TimerMessage>) {
    loop {
        thread::sleep(Duration::from_secs(1));

        let message = {
            let mut app = app.lock().unwrap();

            let (changed, completion) = app.tick(now_ms());

            if let Some(event) = completion {
                let _ = tx.send(TimerMessage::Completed(event));
            }

            if changed {
                Some(TimerMessage::StateChanged {
                    line: format_status(&app),
                })
            } else {
                None
            }
        };

        if let Some(msg) = message {
            if tx.send(msg).is_err() {
                // Main loop is gone; stop ticking.
                return;
            }
        }
    }
}

/// Formats the one-line status shown at the prompt.
pub fn format_status(app: &App) -> String {
    let engine = &app.engine;
    let marker = if engine.is_running() { "▶" } else { "⏸" };
    let task = match engine.task_id() {
        Some(id) => format!(" · task #{}", id),
        None => String::new(),
    };
    format!(
        "{} {} {} · {} sessions{}",
        marker,
        engine.mode().label(),
        format_time(engine.seconds()),
        engine.sessions_completed(),
        task
    )
}

/// Formats seconds as MM:SS, rolling into H:MM:SS past an hour.
pub fn format_time(secs: u32) -> String {
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
