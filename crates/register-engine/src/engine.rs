//! # Register Engine
//!
//! Owns the one `Session` and feeds it events one at a time.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RegisterEngine Architecture                       │
//! │                                                                         │
//! │   Presentation            Scan source                                  │
//! │   start / pay / reset     scan(code)                                   │
//! │        │                       │                                        │
//! │        └──────────┬────────────┘                                        │
//! │                   ▼                                                     │
//! │        ┌─────────────────────┐                                          │
//! │        │  inbox (mpsc, FIFO) │   arrival order == apply order           │
//! │        └──────────┬──────────┘                                          │
//! │                   ▼                                                     │
//! │        ┌─────────────────────┐      ┌────────────────────────────┐     │
//! │        │  Session::apply     │─────►│ EffectExecutor             │     │
//! │        │  (register-core)    │      │ tone now / speech later    │     │
//! │        └──────────┬──────────┘      └────────────────────────────┘     │
//! │                   │                                                     │
//! │          ┌────────┴─────────┐                                           │
//! │          ▼                  ▼                                           │
//! │   watch<SessionSnapshot>  watch<bool>                                   │
//! │   (presentation)          (scanner activation)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No lock guards the session: only the actor task ever touches it, and it
//! finishes one event (state, effects, published snapshot) before taking
//! the next from the inbox.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use register_core::{
    Event, Outcome, RegisterRules, ScanEvent, Session, SessionSnapshot, Transition,
};

use crate::audio::AudioFeedback;
use crate::config::RegisterConfig;
use crate::error::{EngineError, EngineResult};
use crate::executor::EffectExecutor;

// =============================================================================
// Inbox Messages
// =============================================================================

#[derive(Debug)]
enum Command {
    /// Apply an event; optionally report the outcome.
    Apply {
        event: Event,
        reply: Option<oneshot::Sender<Outcome>>,
    },
    /// Stop the actor.
    Shutdown,
}

// =============================================================================
// Register Handle
// =============================================================================

/// Cloneable handle for sending events to the engine and observing it.
#[derive(Clone)]
pub struct RegisterHandle {
    inbox_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    scanning_rx: watch::Receiver<bool>,
}

impl RegisterHandle {
    /// Queues an event without waiting for it to be applied.
    pub async fn send(&self, event: Event) -> EngineResult<()> {
        self.inbox_tx
            .send(Command::Apply { event, reply: None })
            .await
            .map_err(|_| EngineError::ChannelClosed("Register inbox closed".into()))
    }

    /// Queues an event and waits until the engine has applied (or ignored)
    /// it.
    pub async fn dispatch(&self, event: Event) -> EngineResult<Outcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.inbox_tx
            .send(Command::Apply {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| EngineError::ChannelClosed("Register inbox closed".into()))?;

        reply_rx.await.map_err(|_| EngineError::ShuttingDown)
    }

    /// "Start the register" intent.
    pub async fn start(&self) -> EngineResult<Outcome> {
        self.dispatch(Event::Start).await
    }

    /// "Pay" intent. Ignored by the engine when the cart is empty.
    pub async fn request_payment(&self) -> EngineResult<Outcome> {
        self.dispatch(Event::RequestPayment).await
    }

    /// "Next customer" intent.
    pub async fn reset(&self) -> EngineResult<Outcome> {
        self.dispatch(Event::Reset).await
    }

    /// Delivers one decoded code. The id and timestamp of the line item are
    /// fixed here, as the code enters the inbox.
    pub async fn scan(&self, code: impl Into<String>) -> EngineResult<()> {
        self.send(Event::Scan(ScanEvent::new(code))).await
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver that wakes on every applied event.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// True exactly while the session is scanning.
    pub fn scanner_activation(&self) -> watch::Receiver<bool> {
        self.scanning_rx.clone()
    }

    /// Asks the engine to stop after the events already queued.
    pub async fn shutdown(&self) -> EngineResult<()> {
        self.inbox_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| EngineError::ChannelClosed("Register inbox closed".into()))
    }
}

// =============================================================================
// Register Engine
// =============================================================================

/// The actor that owns the session.
pub struct RegisterEngine {
    session: Session,
    rules: RegisterRules,
    executor: EffectExecutor,
    inbox_rx: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    scanning_tx: watch::Sender<bool>,
}

impl RegisterEngine {
    /// Spawns the engine with explicit rules.
    ///
    /// The join handle yields the final session once the engine stops.
    pub fn spawn(
        rules: RegisterRules,
        audio: Arc<dyn AudioFeedback>,
        inbox_capacity: usize,
    ) -> (RegisterHandle, JoinHandle<Session>) {
        let session = Session::new();
        let (inbox_tx, inbox_rx) = mpsc::channel(inbox_capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let (scanning_tx, scanning_rx) = watch::channel(session.state().is_scanning());

        let engine = RegisterEngine {
            session,
            rules,
            executor: EffectExecutor::new(audio),
            inbox_rx,
            snapshot_tx,
            scanning_tx,
        };

        let join = tokio::spawn(engine.run());

        let handle = RegisterHandle {
            inbox_tx,
            snapshot_rx,
            scanning_rx,
        };

        (handle, join)
    }

    /// Spawns the engine from loaded configuration.
    pub fn spawn_with_config(
        config: &RegisterConfig,
        audio: Arc<dyn AudioFeedback>,
    ) -> (RegisterHandle, JoinHandle<Session>) {
        Self::spawn(config.rules(), audio, config.engine.inbox_capacity)
    }

    /// Main engine loop.
    async fn run(mut self) -> Session {
        info!(
            unit_price = %self.rules.unit_price,
            speech_delay = ?self.rules.speech_delay,
            "Register engine started"
        );

        while let Some(command) = self.inbox_rx.recv().await {
            match command {
                Command::Apply { event, reply } => {
                    let outcome = self.handle(event);
                    if let Some(reply) = reply {
                        // The caller may have stopped waiting; nothing to do.
                        let _ = reply.send(outcome);
                    }
                }
                Command::Shutdown => {
                    info!("Register engine shutting down");
                    break;
                }
            }
        }

        // Releases the camera before the activation channel closes.
        self.scanning_tx.send_replace(false);

        info!(
            state = %self.session.state(),
            items = self.session.total_count(),
            "Register engine stopped"
        );
        self.session
    }

    /// Applies one event: transition, effects, then publication.
    fn handle(&mut self, event: Event) -> Outcome {
        let event_name = event.name();

        let Transition {
            session,
            effects,
            outcome,
        } = std::mem::take(&mut self.session).apply(event, &self.rules);
        self.session = session;

        match &outcome {
            Outcome::Applied => debug!(
                event = event_name,
                state = %self.session.state(),
                count = self.session.total_count(),
                total = %self.session.total_amount(),
                "Event applied"
            ),
            Outcome::Ignored(reason) => debug!(
                event = event_name,
                state = %self.session.state(),
                %reason,
                "Event ignored"
            ),
        }

        self.executor.execute_all(effects);

        if outcome.is_applied() {
            self.publish();
        }

        outcome
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.snapshot());

        let scanning = self.session.state().is_scanning();
        self.scanning_tx.send_if_modified(|active| {
            if *active == scanning {
                return false;
            }
            info!(scanning, "Scanner activation changed");
            *active = scanning;
            true
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{Cue, RecordingAudio};
    use register_core::{CoreError, Money, RegisterState};
    use std::time::Duration;

    fn spawn(audio: &RecordingAudio) -> (RegisterHandle, JoinHandle<Session>) {
        RegisterEngine::spawn(RegisterRules::default(), Arc::new(audio.clone()), 16)
    }

    #[tokio::test]
    async fn test_start_initializes_audio_and_activates_scanner() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);
        let activation = handle.scanner_activation();

        assert!(!*activation.borrow());
        assert_eq!(handle.start().await.unwrap(), Outcome::Applied);

        // Initialization happened while the start event was being handled.
        assert_eq!(audio.cues(), vec![Cue::Initialize]);
        assert_eq!(handle.snapshot().state, RegisterState::Scanning);
        assert!(*activation.borrow());
    }

    #[tokio::test]
    async fn test_second_start_is_ignored() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);

        handle.start().await.unwrap();
        let outcome = handle.start().await.unwrap();

        assert!(matches!(
            outcome,
            Outcome::Ignored(CoreError::InvalidTransition { event: "start", .. })
        ));
        assert_eq!(audio.cues(), vec![Cue::Initialize]);
    }

    #[tokio::test]
    async fn test_repeated_codes_each_ring_up() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);

        handle.start().await.unwrap();
        for code in ["A1", "A2", "A1"] {
            handle.dispatch(Event::Scan(ScanEvent::new(code))).await.unwrap();
        }

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.total_count, 3);
        assert_eq!(snapshot.total_amount, Money::from_yen(330));
        assert_eq!(
            snapshot.items.iter().filter(|i| i.code == "A1").count(),
            2
        );
        assert_eq!(snapshot.last_scanned.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_payment_with_empty_cart_changes_nothing() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);

        handle.start().await.unwrap();
        let before = handle.snapshot();
        let outcome = handle.request_payment().await.unwrap();

        assert_eq!(outcome, Outcome::Ignored(CoreError::EmptyCart));
        assert_eq!(handle.snapshot(), before);
        assert_eq!(handle.snapshot().state, RegisterState::Scanning);
        assert!(audio.speech().is_empty());
    }

    #[tokio::test]
    async fn test_full_customer_cycle() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);
        let activation = handle.scanner_activation();

        handle.start().await.unwrap();
        handle.dispatch(Event::Scan(ScanEvent::new("A1"))).await.unwrap();
        handle.dispatch(Event::Scan(ScanEvent::new("A2"))).await.unwrap();

        assert_eq!(handle.request_payment().await.unwrap(), Outcome::Applied);
        assert_eq!(handle.snapshot().state, RegisterState::Payment);
        assert_eq!(handle.snapshot().total_count, 2);
        assert!(!*activation.borrow());

        assert_eq!(handle.reset().await.unwrap(), Outcome::Applied);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, RegisterState::Scanning);
        assert_eq!(snapshot.total_count, 0);
        assert!(snapshot.total_amount.is_zero());
        assert!(snapshot.last_scanned.is_none());
        assert!(*activation.borrow());

        let speech = audio.speech();
        assert!(speech.contains(&"ごうけい、220えんです。".to_string()));
        assert!(speech.contains(&"つぎの、どうぞ！".to_string()));
    }

    #[tokio::test]
    async fn test_scan_and_payment_back_to_back_keep_order() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);
        handle.start().await.unwrap();
        handle.scan("A1").await.unwrap();

        // Fire-and-forget scan immediately followed by the pay intent; the
        // scan may still be queued when payment is requested.
        handle.scan("A2").await.unwrap();
        let outcome = handle.request_payment().await.unwrap();

        assert_eq!(outcome, Outcome::Applied);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, RegisterState::Payment);
        assert_eq!(snapshot.total_count, 2);
        assert_eq!(snapshot.total_amount.yen(), 220);
        assert!(audio
            .speech()
            .contains(&"ごうけい、220えんです。".to_string()));
    }

    #[tokio::test]
    async fn test_scan_after_payment_is_not_counted() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);
        handle.start().await.unwrap();
        handle.scan("A1").await.unwrap();
        handle.request_payment().await.unwrap();

        // A decode that raced the pay button and lost.
        handle.scan("late").await.unwrap();
        let outcome = handle.reset().await.unwrap();

        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(handle.snapshot().total_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_plays_tone_then_speaks_price_later() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);
        handle.start().await.unwrap();

        handle.dispatch(Event::Scan(ScanEvent::new("A1"))).await.unwrap();
        assert_eq!(audio.cues(), vec![Cue::Initialize, Cue::Tone]);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(
            audio.cues(),
            vec![
                Cue::Initialize,
                Cue::Tone,
                Cue::Speech("ひゃくじゅうえん".into())
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_price_speech_survives_payment() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);
        handle.start().await.unwrap();

        handle.dispatch(Event::Scan(ScanEvent::new("A1"))).await.unwrap();
        handle.request_payment().await.unwrap();
        assert_eq!(audio.speech(), vec!["ごうけい、110えんです。".to_string()]);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(
            audio.speech(),
            vec![
                "ごうけい、110えんです。".to_string(),
                "ひゃくじゅうえん".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_audio_failures_do_not_stop_the_register() {
        let audio = RecordingAudio::failing();
        let (handle, _join) = spawn(&audio);

        assert_eq!(handle.start().await.unwrap(), Outcome::Applied);
        handle.dispatch(Event::Scan(ScanEvent::new("A1"))).await.unwrap();
        assert_eq!(handle.request_payment().await.unwrap(), Outcome::Applied);
        assert_eq!(handle.snapshot().total_count, 1);
    }

    #[tokio::test]
    async fn test_shutdown_returns_session_and_closes_inbox() {
        let audio = RecordingAudio::new();
        let (handle, join) = spawn(&audio);
        let activation = handle.scanner_activation();

        handle.start().await.unwrap();
        handle.scan("A1").await.unwrap();
        handle.shutdown().await.unwrap();

        let session = join.await.unwrap();
        assert_eq!(session.total_count(), 1);
        assert!(!*activation.borrow());

        assert!(matches!(
            handle.start().await,
            Err(EngineError::ChannelClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribers_see_each_applied_event() {
        let audio = RecordingAudio::new();
        let (handle, _join) = spawn(&audio);
        let mut snapshots = handle.subscribe();
        snapshots.borrow_and_update();

        handle.start().await.unwrap();
        assert!(snapshots.has_changed().unwrap());
        assert_eq!(
            snapshots.borrow_and_update().state,
            RegisterState::Scanning
        );

        // Ignored events publish nothing.
        handle.reset().await.unwrap();
        assert!(!snapshots.has_changed().unwrap());
    }
}
