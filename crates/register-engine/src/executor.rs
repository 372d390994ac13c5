//! # Effect Executor
//!
//! Carries out the [`Effect`]s a transition asks for.
//!
//! ## Execution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Effect                  Runs                    On failure             │
//! │  ──────────────────────  ──────────────────────  ─────────────────────  │
//! │  InitializeAudio         inline, before the      warn! and continue     │
//! │                          next event              │                      │
//! │  PlayTone                inline (non-blocking)   warn! and continue     │
//! │  Speak(text)             inline (non-blocking)   warn! and continue     │
//! │  After { delay, e }      spawned timer task,     (same, for e)          │
//! │                          never cancelled                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A deferred effect outlives the state that scheduled it: the spoken price
//! of the last scan may still play after the screen moved on to payment.

use std::sync::Arc;
use tracing::{trace, warn};

use register_core::Effect;

use crate::audio::AudioFeedback;
use crate::error::AudioError;

/// Applies effects against an audio backend.
#[derive(Clone)]
pub struct EffectExecutor {
    audio: Arc<dyn AudioFeedback>,
}

impl EffectExecutor {
    pub fn new(audio: Arc<dyn AudioFeedback>) -> Self {
        EffectExecutor { audio }
    }

    /// Executes effects in order.
    pub fn execute_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Executes one effect. Must be called from within a Tokio runtime when
    /// the effect is deferred.
    pub fn execute(&self, effect: Effect) {
        match effect {
            Effect::InitializeAudio => absorb("initialize", self.audio.initialize()),
            Effect::PlayTone => absorb("play_tone", self.audio.play_tone()),
            Effect::Speak(text) => absorb("speak", self.audio.speak(&text)),
            Effect::After { delay, effect } => {
                trace!(?delay, "Scheduling deferred effect");
                let executor = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    executor.execute(*effect);
                });
            }
        }
    }
}

/// Audio is best-effort: a failure is logged and otherwise forgotten.
fn absorb(operation: &'static str, result: Result<(), AudioError>) {
    if let Err(e) = result {
        warn!(operation, error = %e, "Audio feedback failed, continuing without it");
    }
}
