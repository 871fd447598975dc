use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{select, tick, unbounded, Receiver};
use sysinfo::System;

use soundscape::audio_system::AudioOutput;
use soundscape::board::Soundboard;
use soundscape::config::Config;
use soundscape::dialog::Confirm;
use soundscape::effect::FadeOut;
use soundscape::error::AppResult;
use soundscape::messaging::{Command, CommandExecutor, CommandResult, Event, EventBus};
use soundscape::timing::SystemClock;

const LOG_TARGET_STARTUP: &str = "soundscape::startup";

/// Initialize tracing with file rotation
///
/// Logs are written to `<config dir>/Soundscape/logs/soundscape.YYYY-MM-DD.log`.
/// Debug builds also log to the console.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = Config::log_dir().unwrap_or_else(|_| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "soundscape.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // The console is the user interface here, so only debug builds share it
    // with log output.
    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting Soundscape v{} ({})", version, architecture);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
}

/// Read stdin on a helper thread so the main loop can keep polling
fn spawn_console_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Console read failed: {}", e);
                    break;
                }
            }
        }
        tracing::debug!("Console reader stopped");
    });
    rx
}

/// Yes/no prompt answered on the next console line
struct ConsoleConfirm {
    lines: Receiver<String>,
}

impl Confirm for ConsoleConfirm {
    fn confirm(&mut self, title: &str, question: &str) -> bool {
        print!("{}: {} [y/N] ", title, question);
        flush_stdout();
        match self.lines.recv() {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn prompt() {
    print!("> ");
    flush_stdout();
}

fn flush_stdout() {
    if let Err(e) = io::stdout().flush() {
        tracing::debug!("Failed to flush stdout: {}", e);
    }
}

fn report(result: CommandResult) {
    match result {
        CommandResult::Success => {}
        CommandResult::SuccessWithValue(text) => println!("{}", text),
        CommandResult::Error(message) => println!("✗ {}", message),
    }
}

fn main() -> AppResult<()> {
    initialize_tracing();
    log_runtime_environment();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Using default configuration: {:#}", anyhow::Error::new(e));
            Config::default()
        }
    };

    let output = AudioOutput::open_default().context("Failed to open the default audio output")?;

    let bus = EventBus::new();
    let (events, _subscription) = bus.subscribe();
    let mut board = Soundboard::new(Box::new(output.port_factory()), Arc::new(SystemClock))
        .with_fade(FadeOut::new(config.fade_budget_ms))
        .with_default_volume(config.default_volume)
        .with_bus(bus.clone());
    let executor = CommandExecutor::new(bus);

    println!("Soundscape v{}  (type 'help' for commands)", env!("CARGO_PKG_VERSION"));

    let startup_project = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.last_project.clone());
    if let Some(path) = startup_project {
        if let Err(e) = board.load(&path) {
            tracing::warn!("Couldn't load {}: {}", path.display(), e);
            println!("✗ Couldn't load {}: {}", path.display(), e);
        }
    }

    let lines = spawn_console_reader();
    let ticker = tick(Duration::from_millis(config.poll_interval_ms));
    let mut confirm = ConsoleConfirm {
        lines: lines.clone(),
    };

    prompt();
    'main: loop {
        select! {
            recv(lines) -> line => {
                let Ok(line) = line else {
                    // stdin closed
                    break 'main;
                };
                if !line.trim().is_empty() {
                    match line.parse::<Command>() {
                        Ok(command) => {
                            let result = executor.execute(&mut board, command, &mut confirm);
                            report(result);
                        }
                        Err(e) => println!("✗ {}", e),
                    }
                }
                prompt();
            }
            recv(ticker) -> _ => board.poll(),
        }

        for event in events.try_iter() {
            match event {
                Event::Shutdown => break 'main,
                Event::ProjectSaved { ref path, .. } | Event::ProjectLoaded { ref path, .. } => {
                    config.last_project = Some(path.clone());
                    println!("{}", event.description());
                }
                Event::UnitStateChanged { .. } => {
                    tracing::debug!("{}", event.description());
                }
                other => println!("{}", other.description()),
            }
        }
    }

    board.clear();
    if let Err(e) = config.save() {
        tracing::warn!("Failed to save config: {:#}", anyhow::Error::new(e));
    }
    tracing::info!("Soundscape stopped");
    Ok(())
}
