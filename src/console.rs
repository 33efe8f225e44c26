//! Console host for platforms without a menubar.
//!
//! Commands are read line by line from stdin; the timer title is printed
//! whenever it changes.

use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::app::{lock, App, SharedApp};
use crate::display::{format_lifetime, format_progress, format_status, format_today};
use crate::event::{self, Command, EventResult};
use crate::notifications;
use crate::timer::{self, TimerMessage};
use tracing::warn;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const HELP: &str = "\
Commands:
  t, toggle        start or pause the timer
  r, reset         back to a fresh focus phase
  f, focus         switch to focus and start
  b, break         switch to a break
  d <minutes>      set focus duration (1-60)
  sound, notify    toggle sound / notifications
  reset-today      clear today's count
  s, status        show timer and statistics
  export           print statistics as JSON
  import <file>    replace statistics from an export
  q, quit          exit";

/// A line of console input.
#[derive(Debug)]
enum Input {
    Command(Command),
    Status,
    Export,
    Import(String),
    Help,
    Empty,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if let Some(("import", path)) = line.split_once(' ') {
        return Input::Import(path.trim().to_string());
    }
    match line {
        "" => Input::Empty,
        "s" | "status" => Input::Status,
        "export" => Input::Export,
        "h" | "help" | "?" => Input::Help,
        _ => match line.parse() {
            Ok(command) => Input::Command(command),
            Err(e) => Input::Invalid(format!("{}", e)),
        },
    }
}

fn status_report(app: &App) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        format_status(&app.timer),
        format_progress(&app.timer),
        format_today(app.recorder.today()),
        format_lifetime(app.recorder.stats())
    )
}

/// Runs the console host until `quit` or end of input.
pub fn run(app: SharedApp) -> Result<(), Box<dyn Error>> {
    let (timer_tx, timer_rx) = mpsc::channel();
    let ticker_app = Arc::clone(&app);
    thread::spawn(move || {
        timer::run_timer_loop(ticker_app, timer_tx);
    });

    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("{}", status_report(&lock(&app)));
    println!("Type 'help' for commands.");

    loop {
        drain_timer_messages(&app, &timer_rx);

        match line_rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if !handle_line(&app, &line) {
                    return Ok(());
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
        io::stdout().flush()?;
    }
}

fn drain_timer_messages(app: &SharedApp, timer_rx: &Receiver<TimerMessage>) {
    while let Ok(msg) = timer_rx.try_recv() {
        match msg {
            TimerMessage::StateChanged { title } => {
                print!("\r{}   ", title);
            }
            TimerMessage::Completed(event) => {
                println!();
                let app = lock(app);
                println!("{}", format_status(&app.timer));
                if app.settings.sound_enabled {
                    // Terminal bell
                    print!("\x07");
                }
                if app.settings.notifications_enabled {
                    notifications::notify_completion(event);
                }
            }
        }
    }
}

/// Handles one line of input. Returns false when the host should exit.
fn handle_line(app: &SharedApp, line: &str) -> bool {
    let mut app = lock(app);
    match parse_input(line) {
        Input::Command(command) => match event::handle_command(&mut app, command) {
            EventResult::Quit => return false,
            EventResult::StateChanged | EventResult::SettingsChanged => {
                println!("{}", format_status(&app.timer));
            }
            EventResult::Continue => {
                println!("Nothing changed ({})", format_status(&app.timer));
            }
        },
        Input::Status => println!("{}", status_report(&app)),
        Input::Export => match app.recorder.export_data() {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to export statistics: {}", e),
        },
        Input::Import(path) => match fs::read_to_string(&path) {
            Ok(data) if app.recorder.import_data(&data) => println!("Statistics imported"),
            Ok(_) => println!("Not a valid statistics export: {}", path),
            Err(e) => println!("Cannot read {}: {}", path, e),
        },
        Input::Help => println!("{}", HELP),
        Input::Empty => {}
        Input::Invalid(message) => println!("{} (type 'help')", message),
    }
    true
}
