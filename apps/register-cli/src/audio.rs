//! Terminal stand-in for a speaker and a speech synthesizer.
//!
//! The tone is a bell plus a marker line. Speech is printed by a worker
//! task that takes a while per character, like a real voice would; requests
//! arriving while it talks overwrite each other and only the newest one is
//! spoken next.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use register_engine::{AudioError, AudioFeedback};
use tokio::sync::watch;
use tracing::debug;

/// Time spent "saying" one character.
const SPEECH_PER_CHAR: Duration = Duration::from_millis(120);

pub struct TerminalAudio {
    ready: AtomicBool,
    speech_tx: watch::Sender<Option<String>>,
}

impl TerminalAudio {
    /// Creates the backend and its speech worker. Must be called inside a
    /// Tokio runtime.
    pub fn spawn() -> Arc<Self> {
        let (speech_tx, speech_rx) = watch::channel(None);
        tokio::spawn(speech_worker(speech_rx));

        Arc::new(TerminalAudio {
            ready: AtomicBool::new(false),
            speech_tx,
        })
    }

    fn ensure_ready(&self) -> Result<(), AudioError> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AudioError::Unavailable)
        }
    }
}

impl AudioFeedback for TerminalAudio {
    fn initialize(&self) -> Result<(), AudioError> {
        if !self.ready.swap(true, Ordering::AcqRel) {
            debug!("Terminal audio ready");
        }
        Ok(())
    }

    fn play_tone(&self) -> Result<(), AudioError> {
        self.ensure_ready()?;
        println!("\x07♪ ピッ");
        Ok(())
    }

    fn speak(&self, text: &str) -> Result<(), AudioError> {
        self.ensure_ready()?;
        self.speech_tx.send_replace(Some(text.to_string()));
        Ok(())
    }
}

async fn speech_worker(mut speech_rx: watch::Receiver<Option<String>>) {
    while speech_rx.changed().await.is_ok() {
        let Some(text) = speech_rx.borrow_and_update().clone() else {
            continue;
        };
        println!("🔊 「{text}」");
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        tokio::time::sleep(SPEECH_PER_CHAR.saturating_mul(chars)).await;
    }
}
