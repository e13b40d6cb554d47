use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::unbounded;
use sysinfo::System;

use sfx_panel::app::{DemoApp, FrameOutcome};
use sfx_panel::audio_system::AudioSystem;
use sfx_panel::config::Config;
use sfx_panel::error::AppResult;
use sfx_panel::input::{console, AxisSource};
use sfx_panel::messaging::Event;

const LOG_TARGET_STARTUP: &str = "sfx_panel::startup";

/// Initialize tracing with file rotation
///
/// Logs are written to:
/// - Linux: ~/.config/SfxPanel/logs/
/// - macOS: ~/Library/Application Support/SfxPanel/logs/
/// - Windows: %APPDATA%\SfxPanel\logs\
///
/// Log files rotate daily and are named: sfx-panel.log.YYYY-MM-DD
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("SfxPanel").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "sfx-panel.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // stdout belongs to the console panel
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
    let mut system = System::new();
    system.refresh_cpu();

    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting SFX Panel v{} on ({})", version, architecture);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
    tracing::debug!(target: LOG_TARGET_STARTUP, "CPUs: {}", system.cpus().len());
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Features: dialog={}, gamepad={}",
        cfg!(feature = "dialog"),
        cfg!(feature = "gamepad")
    );
}

#[cfg(feature = "gamepad")]
fn open_gamepad(
    tx: &crossbeam_channel::Sender<sfx_panel::input::RawEvent>,
) -> Option<sfx_panel::input::gamepad::GamepadInput> {
    match sfx_panel::input::gamepad::GamepadInput::new() {
        Ok(gamepad) => {
            if let Some(name) = gamepad.connected_name() {
                let _ = tx.send(sfx_panel::input::RawEvent::ControllerAdded { name });
            }
            Some(gamepad)
        }
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

/// Print what happened since the last frame
fn report_events(events: &crossbeam_channel::Receiver<Event>) {
    for event in events.try_iter() {
        match event {
            // failures are already reported by the frame loop
            Event::ErrorOccurred { .. } => {}
            Event::PositionChanged { .. } => tracing::debug!("{}", event.description()),
            _ => {
                tracing::info!("{}", event.description());
                println!("{}", event.description());
            }
        }
    }
}

fn main() -> AppResult<()> {
    initialize_tracing();
    log_runtime_environment();

    let config = Config::load().context("Failed to load configuration")?;

    let audio = match AudioSystem::new(&config) {
        Ok(audio) => Some(audio),
        Err(e) => {
            tracing::warn!("Audio output unavailable: {:#}", anyhow::Error::from(e));
            None
        }
    };

    let (tx, rx) = unbounded();
    let mut app = DemoApp::new(&config, audio, rx);
    let (events, subscriber) = app.event_bus().subscribe();

    console::spawn_console_reader(tx.clone()).context("Failed to start console reader")?;

    #[cfg(feature = "gamepad")]
    let mut gamepad = open_gamepad(&tx);
    #[cfg(feature = "gamepad")]
    let mut pending = Vec::new();

    let interval = Duration::from_millis(config.frame_interval_ms);
    loop {
        #[cfg(feature = "gamepad")]
        let device: Option<&dyn AxisSource> = match gamepad.as_mut() {
            Some(pad) => {
                pad.drain(&mut pending);
                for event in pending.drain(..) {
                    let _ = tx.send(event);
                }
                Some(&*pad)
            }
            None => None,
        };
        #[cfg(not(feature = "gamepad"))]
        let device: Option<&dyn AxisSource> = None;

        let outcome = app.frame(device);
        report_events(&events);

        if outcome == FrameOutcome::Quit {
            break;
        }
        thread::sleep(interval);
    }

    app.event_bus().unsubscribe(subscriber);
    app.shutdown();
    tracing::info!("SFX Panel exited");
    Ok(())
}
