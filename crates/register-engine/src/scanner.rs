//! # Scan Source
//!
//! Turns a camera's raw decode stream into scan events, and only while the
//! register is scanning.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  engine activation (watch<bool>)                                        │
//! │        │ true  → camera.open()   status Active / Unavailable            │
//! │        │ false → camera.close()  status Inactive, suppressor cleared    │
//! │        ▼                                                                │
//! │  ┌───────────┐   raw decodes    ┌────────────┐   admitted    ┌───────┐ │
//! │  │  Camera   │ ───(mpsc)──────► │  ScanGate  │ ────────────► │engine │ │
//! │  │ + decoder │                  │ open?      │  handle.scan  │ inbox │ │
//! │  └───────────┘                  │ duplicate? │               └───────┘ │
//! │                                 └────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decoded feed carries failures too. A frame that fails to decode is
//! noise and is only logged; losing the camera (unplugged, permission
//! revoked) releases it and reports `Unavailable` until the register next
//! enters scanning.
//!
//! A decoder reports the same code on every frame it stays in view. The
//! gate turns that into a single scan: a code equal to the previous one is
//! dropped while it keeps reappearing within the cooldown. Showing a
//! different code, or taking the item away for longer than the cooldown,
//! lets the same code ring up again.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::engine::RegisterHandle;
use crate::error::ScanError;

// =============================================================================
// Camera
// =============================================================================

/// One item on the decoded feed: a code, or why there is none.
pub type Decoded = Result<String, ScanError>;

/// A camera plus decoder. Decoded codes travel over a separate channel so
/// that the device side can live on its own thread.
pub trait Camera: Send + 'static {
    /// Starts capture. Called each time the register enters scanning.
    fn open(&mut self) -> Result<(), ScanError>;

    /// Stops capture and releases the device.
    fn close(&mut self);
}

/// Camera health as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanStatus {
    #[default]
    Inactive,
    Active,
    Unavailable {
        reason: String,
    },
}

// =============================================================================
// Duplicate Suppression
// =============================================================================

/// Collapses a code held in front of the camera into one sighting.
#[derive(Debug, Clone)]
pub struct DuplicateSuppressor {
    cooldown: Duration,
    last: Option<(String, Instant)>,
}

impl DuplicateSuppressor {
    pub fn new(cooldown: Duration) -> Self {
        DuplicateSuppressor {
            cooldown,
            last: None,
        }
    }

    /// Records a sighting and says whether it is new.
    ///
    /// Every sighting refreshes the timestamp, so the cooldown runs from the
    /// last frame the code was seen in.
    pub fn admit(&mut self, code: &str, now: Instant) -> bool {
        let fresh = match &self.last {
            Some((last_code, seen_at)) if last_code == code => {
                now.saturating_duration_since(*seen_at) >= self.cooldown
            }
            _ => true,
        };

        match &mut self.last {
            Some((last_code, seen_at)) if last_code == code => *seen_at = now,
            _ => self.last = Some((code.to_string(), now)),
        }

        fresh
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

/// Why a decode did or did not become a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Forward,
    /// The camera is closed; the decode is stale.
    Inactive,
    /// Same code, still in view.
    Duplicate,
}

/// Decides which raw decodes become scan events.
#[derive(Debug, Clone)]
pub struct ScanGate {
    open: bool,
    suppressor: DuplicateSuppressor,
}

impl ScanGate {
    pub fn new(cooldown: Duration) -> Self {
        ScanGate {
            open: false,
            suppressor: DuplicateSuppressor::new(cooldown),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the gate and forgets the last code, so the first scan of the
    /// next session always counts.
    pub fn close(&mut self) {
        self.open = false;
        self.suppressor.clear();
    }

    pub fn admit(&mut self, code: &str, now: Instant) -> Admission {
        if !self.open {
            return Admission::Inactive;
        }
        if self.suppressor.admit(code, now) {
            Admission::Forward
        } else {
            Admission::Duplicate
        }
    }
}

// =============================================================================
// Scan Source Handle
// =============================================================================

/// Observes and stops a running scan source.
#[derive(Clone)]
pub struct ScanSourceHandle {
    status_rx: watch::Receiver<ScanStatus>,
    shutdown_tx: mpsc::Sender<()>,
}

impl ScanSourceHandle {
    pub fn status(&self) -> ScanStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanStatus> {
        self.status_rx.clone()
    }

    /// Closes the camera and stops the task.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

// =============================================================================
// Scan Source
// =============================================================================

/// Drives a camera from the engine's activation signal.
pub struct ScanSource<C: Camera> {
    camera: C,
    activation: watch::Receiver<bool>,
    decoded_rx: mpsc::Receiver<Decoded>,
    engine: RegisterHandle,
    gate: ScanGate,
    status_tx: watch::Sender<ScanStatus>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<C: Camera> ScanSource<C> {
    /// Spawns the scan source. The join handle gives the camera back once
    /// the task ends.
    pub fn spawn(
        camera: C,
        decoded_rx: mpsc::Receiver<Decoded>,
        engine: RegisterHandle,
        cooldown: Duration,
    ) -> (ScanSourceHandle, JoinHandle<C>) {
        let (status_tx, status_rx) = watch::channel(ScanStatus::Inactive);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let source = ScanSource {
            camera,
            activation: engine.scanner_activation(),
            decoded_rx,
            engine,
            gate: ScanGate::new(cooldown),
            status_tx,
            shutdown_rx,
        };

        let join = tokio::spawn(source.run());

        (
            ScanSourceHandle {
                status_rx,
                shutdown_tx,
            },
            join,
        )
    }

    async fn run(mut self) -> C {
        info!("Scan source started");

        if *self.activation.borrow_and_update() {
            self.activate();
        }

        loop {
            tokio::select! {
                changed = self.activation.changed() => {
                    if changed.is_err() {
                        debug!("Register engine gone, stopping scan source");
                        break;
                    }
                    let wanted = *self.activation.borrow_and_update();
                    if wanted && !self.gate.is_open() {
                        self.activate();
                    } else if !wanted {
                        self.deactivate();
                    }
                }

                decoded = self.decoded_rx.recv() => {
                    match decoded {
                        Some(Ok(code)) => {
                            if !self.forward(code).await {
                                break;
                            }
                        }
                        Some(Err(e)) => self.fault(e),
                        None => {
                            info!("Decoder feed closed");
                            break;
                        }
                    }
                }

                Some(()) = self.shutdown_rx.recv() => {
                    info!("Scan source shutting down");
                    break;
                }
            }
        }

        self.deactivate();
        info!("Scan source stopped");
        self.camera
    }

    /// Returns false once the engine stops accepting scans.
    async fn forward(&mut self, code: String) -> bool {
        match self.gate.admit(&code, Instant::now()) {
            Admission::Forward => {
                debug!(code = %code, "Forwarding scan");
                if let Err(e) = self.engine.scan(code).await {
                    warn!(error = %e, "Register engine rejected scan");
                    return false;
                }
            }
            Admission::Inactive => trace!(code = %code, "Dropping decode while inactive"),
            Admission::Duplicate => trace!(code = %code, "Dropping repeated decode"),
        }
        true
    }

    fn fault(&mut self, error: ScanError) {
        if !self.gate.is_open() {
            trace!(error = %error, "Ignoring scanner fault while inactive");
            return;
        }

        match error {
            ScanError::Decode(reason) => debug!(%reason, "Frame did not decode"),
            lost => {
                warn!(error = %lost, "Camera lost while scanning");
                self.camera.close();
                self.gate.close();
                self.status_tx.send_replace(ScanStatus::Unavailable {
                    reason: lost.to_string(),
                });
            }
        }
    }

    fn activate(&mut self) {
        match self.camera.open() {
            Ok(()) => {
                info!("Camera opened");
                self.gate.open();
                self.status_tx.send_replace(ScanStatus::Active);
            }
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "Camera failed to open");
                self.status_tx.send_replace(ScanStatus::Unavailable {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn deactivate(&mut self) {
        if self.gate.is_open() {
            self.camera.close();
            info!("Camera closed");
        }
        self.gate.close();
        self.status_tx.send_replace(ScanStatus::Inactive);
    }
}

// =============================================================================
// Tests
// =============================================================================
