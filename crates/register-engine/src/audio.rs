//! # Audio Feedback
//!
//! The seam between the register and whatever makes noise: a beep for each
//! scan and a voice for prices and prompts.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  initialize()   idempotent; called while handling the start gesture    │
//! │  play_tone()    returns immediately; sound plays in the background     │
//! │  speak(text)    returns immediately; may drop the request if busy,     │
//! │                 only the newest request has to be honoured             │
//! │                                                                         │
//! │  Errors are reported, never panicked. The executor logs and drops      │
//! │  them; the state machine never sees them.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::AudioError;

/// Tone and speech output.
///
/// Implementations must not block: the engine calls them from its event
/// loop.
pub trait AudioFeedback: Send + Sync + 'static {
    /// Prepares output. Safe to call more than once.
    fn initialize(&self) -> Result<(), AudioError>;

    /// Short confirmation beep.
    fn play_tone(&self) -> Result<(), AudioError>;

    /// Says `text`, replacing anything still queued.
    fn speak(&self, text: &str) -> Result<(), AudioError>;
}

/// Silent backend for a muted register or headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAudio;

impl AudioFeedback for NoOpAudio {
    fn initialize(&self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play_tone(&self) -> Result<(), AudioError> {
        Ok(())
    }

    fn speak(&self, _text: &str) -> Result<(), AudioError> {
        Ok(())
    }
}
