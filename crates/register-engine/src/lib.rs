//! # register-engine: Runtime for the Play Register
//!
//! Hosts the pure state machine from `register-core` and connects it to
//! the outside world: a camera feeding decoded codes in, a speaker and a
//! voice going out, and a screen watching snapshots.
//!
//! ## Runtime Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────────┐    scan(code)    ┌──────────────────┐               │
//! │   │  ScanSource  │ ───────────────► │  RegisterEngine  │               │
//! │   │  camera +    │ ◄─────────────── │  one inbox,      │               │
//! │   │  dedupe      │  activation      │  one Session     │               │
//! │   └──────────────┘  (watch<bool>)   └────────┬─────────┘               │
//! │                                              │                          │
//! │              start / pay / reset             │ effects                  │
//! │   ┌──────────────┐ ───────────────►          ▼                          │
//! │   │ Presentation │                  ┌──────────────────┐               │
//! │   │ (any UI)     │ ◄─────────────── │  EffectExecutor  │──► Audio      │
//! │   └──────────────┘  SessionSnapshot └──────────────────┘   Feedback    │
//! │                     (watch)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`audio`] - `AudioFeedback` trait and the silent backend
//! - [`config`] - TOML + environment configuration
//! - [`engine`] - `RegisterEngine` actor and its `RegisterHandle`
//! - [`error`] - Engine, audio, scan and config errors
//! - [`executor`] - Runs effects: tone now, speech after a delay
//! - [`scanner`] - Camera activation and duplicate suppression
//!
//! ## Example
//! ```rust,ignore
//! let config = RegisterConfig::load_or_default(None);
//! let (register, _engine) = RegisterEngine::spawn_with_config(&config, Arc::new(NoOpAudio));
//!
//! register.start().await?;
//! register.scan("4901234567894").await?;
//! register.request_payment().await?;
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod scanner;

pub use audio::{AudioFeedback, NoOpAudio};
pub use config::RegisterConfig;
pub use engine::{RegisterEngine, RegisterHandle};
pub use error::{AudioError, ConfigError, EngineError, EngineResult, ScanError};
pub use executor::EffectExecutor;
pub use scanner::{
    Camera, Decoded, DuplicateSuppressor, ScanSource, ScanSourceHandle, ScanStatus,
};
