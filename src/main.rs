//! Pomidor - a terminal Pomodoro timer and task tracker.
//!
//! A background thread ticks the timer once per second; a second thread
//! reads command lines from stdin. Both feed a single channel drained by
//! the main loop, so every state transition happens on one logical timeline.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

mod app;
mod audio;
mod engine;
mod event;
mod models;
mod notifications;
mod persistence;
mod timer;

use app::App;
use audio::AudioPlayer;
use engine::SessionCompleted;
use event::EventResult;
use models::Mode;
use timer::{now_ms, TimerMessage};

/// Everything the main loop reacts to.
enum MainMessage {
    Timer(TimerMessage),
    Input(String),
    InputClosed,
}

struct Frontend {
    app: Arc<Mutex<App>>,
    audio: Option<AudioPlayer>,
}

impl Frontend {
    fn new(app: Arc<Mutex<App>>) -> Self {
        let audio = AudioPlayer::new().ok();
        Self { app, audio }
    }

    fn handle_completion(&self, event: &SessionCompleted) {
        let app = self.app.lock().unwrap();

        println!(
            "{} session complete → {}",
            event.mode.label(),
            event.next_mode.label()
        );

        if app.settings.sound_enabled {
            if let Some(ref audio) = self.audio {
                if event.mode == Mode::Work {
                    audio.play_work_chime();
                } else {
                    audio.play_break_chime();
                }
            }
        }

        if app.settings.notifications_enabled {
            if event.mode == Mode::Work {
                if event.next_mode == Mode::LongBreak {
                    notifications::notify_long_break_start(app.settings.timer.long_break_secs);
                } else {
                    notifications::notify_work_complete(event.sessions_completed);
                }
            } else if event.mode.is_break() {
                notifications::notify_break_complete();
            }
        }
    }

    fn print_status(&self) {
        let app = self.app.lock().unwrap();
        println!("{}", timer::format_status(&app));
    }
}

/// Reads stdin lines into the main channel.
fn run_input_loop(tx: Sender<MainMessage>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if tx.send(MainMessage::Input(line)).is_err() {
                    return;
                }
            }
            Err(_) => break,
        }
    }
    let _ = tx.send(MainMessage::InputClosed);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = Arc::new(Mutex::new(App::new()?));
    let frontend = Frontend::new(Arc::clone(&app));

    let (tx, rx) = mpsc::channel();

    // Timer tick thread, bridged into the main channel.
    let (timer_tx, timer_rx) = mpsc::channel();
    let app_clone = Arc::clone(&app);
    thread::spawn(move || {
        timer::run_timer_loop(app_clone, timer_tx);
    });
    let bridge_tx = tx.clone();
    thread::spawn(move || {
        for msg in timer_rx {
            if bridge_tx.send(MainMessage::Timer(msg)).is_err() {
                return;
            }
        }
    });

    // Stdin reader thread.
    let input_tx = tx.clone();
    thread::spawn(move || {
        run_input_loop(input_tx);
    });
    drop(tx);

    println!("pomidor — type 'help' for commands");
    frontend.print_status();

    for msg in rx {
        match msg {
            MainMessage::Timer(TimerMessage::StateChanged { line }) => {
                print!("\r\x1b[2K{}", line);
                let _ = io::stdout().flush();
            }
            MainMessage::Timer(TimerMessage::Completed(event)) => {
                println!();
                frontend.handle_completion(&event);
            }
            MainMessage::Input(line) => {
                let result = {
                    let mut app = app.lock().unwrap();
                    event::handle_command(&mut app, &line, now_ms())
                };
                match result {
                    EventResult::Quit => break,
                    EventResult::StateChanged | EventResult::SettingsChanged => {
                        frontend.print_status();
                    }
                    EventResult::StateChangedWithCompletion(event) => {
                        frontend.handle_completion(&event);
                        frontend.print_status();
                    }
                    EventResult::Message(text) => println!("{}", text),
                    EventResult::Continue => {}
                }
            }
            MainMessage::InputClosed => break,
        }
    }

    Ok(())
}
