//! # play-register
//!
//! Terminal front end for the play register.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  stdin thread ──► lines ──┬── start / pay / reset ──► RegisterHandle    │
//! │                           │                                             │
//! │                           └── anything else ──► decoded feed            │
//! │                                                    │                    │
//! │                                   KeyboardCamera + ScanSource           │
//! │                                                    │ scan(code)         │
//! │                                                    ▼                    │
//! │                                             RegisterEngine              │
//! │                                              │            │             │
//! │                                  TerminalAudio        snapshots         │
//! │                                  (bell, voice)        → screen::run     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr (`RUST_LOG`, default `info,register=debug`); the
//! screen goes to stdout.

mod audio;
mod camera;
mod input;
mod screen;

use std::io::ErrorKind;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use register_engine::{
    Decoded, RegisterConfig, RegisterEngine, RegisterHandle, ScanError, ScanSource,
};

use crate::audio::TerminalAudio;
use crate::camera::KeyboardCamera;
use crate::input::Input;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = RegisterConfig::load_or_default(None);
    let rules = config.rules();
    info!(
        item = %rules.item_name,
        unit_price = %rules.unit_price,
        "Configuration loaded"
    );

    let (register, engine_task) =
        RegisterEngine::spawn_with_config(&config, TerminalAudio::spawn());

    let (decoded_tx, decoded_rx) = mpsc::channel(config.scanner.decode_buffer);
    let (scanner, scanner_task) = ScanSource::spawn(
        KeyboardCamera,
        decoded_rx,
        register.clone(),
        config.scanner.duplicate_cooldown(),
    );

    let screen_task = tokio::spawn(screen::run(register.subscribe(), scanner.subscribe(), rules));

    let mut lines = spawn_stdin_reader();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.recv() => {
                let line = match line {
                    Some(Ok(line)) => line,
                    Some(Err(e)) => {
                        decoded_tx
                            .send(Err(read_failure(e)))
                            .await
                            .context("scan source stopped")?;
                        continue;
                    }
                    None => {
                        info!("Input closed");
                        break;
                    }
                };
                if !handle_input(Input::parse(&line), &register, &decoded_tx).await? {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    scanner.shutdown().await;
    register.shutdown().await?;

    let session = engine_task.await.context("register engine task failed")?;
    scanner_task.await.context("scan source task failed")?;
    screen_task.await.context("screen task failed")?;

    info!(
        state = %session.state(),
        items = session.total_count(),
        "Register closed"
    );
    Ok(())
}

/// Acts on one line of input. Returns false when the operator quits.
async fn handle_input(
    input: Input,
    register: &RegisterHandle,
    decoded_tx: &mpsc::Sender<Decoded>,
) -> anyhow::Result<bool> {
    match input {
        Input::Start => {
            register.start().await?;
        }
        Input::Pay => {
            // The pay control is inert until something has been scanned.
            if register.snapshot().can_pay {
                register.request_payment().await?;
            } else {
                info!("Nothing to pay for yet");
            }
        }
        Input::Reset => {
            register.reset().await?;
        }
        Input::Json => {
            println!("{}", serde_json::to_string_pretty(&register.snapshot())?);
        }
        Input::Quit => return Ok(false),
        Input::Code(code) => {
            decoded_tx
                .send(Ok(code))
                .await
                .context("scan source stopped")?;
        }
        Input::Blank => {}
    }
    Ok(true)
}

/// Reads stdin on a plain thread so a pending read never holds up shutdown.
///
/// A line that is not UTF-8 is reported and skipped; any other read error
/// is reported once and ends the reader.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (line_tx, line_rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let fatal = matches!(&line, Err(e) if e.kind() != ErrorKind::InvalidData);
            if line_tx.blocking_send(line).is_err() || fatal {
                break;
            }
        }
    });
    line_rx
}

/// Maps a stdin failure onto the scanner's error vocabulary: garbled bytes
/// are an unreadable frame, anything else means the "camera" is gone.
fn read_failure(error: std::io::Error) -> ScanError {
    if error.kind() == ErrorKind::InvalidData {
        ScanError::Decode(error.to_string())
    } else {
        ScanError::CameraUnavailable(error.to_string())
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=register=trace` - Include dropped decodes
/// - Default: INFO, DEBUG for the register crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,register=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Completes on Ctrl+C (or SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, closing the register");
}
