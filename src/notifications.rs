//! Desktop notifications for session completions.

use notify_rust::Notification;
use std::thread;

/// Shows a notification when a work session completes.
/// Runs in a background thread to avoid blocking the main loop.
pub fn notify_work_complete(sessions_completed: u32) {
    thread::spawn(move || {
        let body = format!(
            "Session {} finished. Time for a break.",
            sessions_completed
        );
        if let Err(e) = Notification::new()
            .summary("Work session complete 🍅")
            .body(&body)
            .show()
        {
            eprintln!("Failed to show notification: {}", e);
        }
    });
}

/// Shows a notification when a long break starts.
pub fn notify_long_break_start(duration_secs: u32) {
    thread::spawn(move || {
        let body = format!(
            "Full cycle done. Take a {} minute long break.",
            duration_secs / 60
        );
        if let Err(e) = Notification::new()
            .summary("Long break 🎉")
            .body(&body)
            .show()
        {
            eprintln!("Failed to show notification: {}", e);
        }
    });
}

/// Shows a notification when a break completes.
pub fn notify_break_complete() {
    thread::spawn(|| {
        if let Err(e) = Notification::new()
            .summary("Break over ☕")
            .body("Back to work when you're ready.")
            .show()
        {
            eprintln!("Failed to show notification: {}", e);
        }
    });
}
