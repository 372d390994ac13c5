//! # Engine Error Types
//!
//! Error types for the runtime layer.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  EngineError    │  │   AudioError    │  │      ScanError          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  ChannelClosed  │  │  Unavailable    │  │  CameraUnavailable      │ │
//! │  │  ShuttingDown   │  │  PlaybackFailed │  │  PermissionDenied       │ │
//! │  │                 │  │                 │  │  Decode                 │ │
//! │  │                 │  │  → logged and   │  │  → ScanStatus for the   │ │
//! │  │  → returned to  │  │    dropped      │  │    presentation layer   │ │
//! │  │    the caller   │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  ConfigError    │  Load / Save / Invalid                            │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Refused transitions are not errors at this layer either: they come back
//! as `Outcome::Ignored` from register-core.

use thiserror::Error;

use register_core::ValidationError;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Engine Error
// =============================================================================

/// Failures talking to the engine actor.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The inbox or a reply channel is gone.
    #[error("Channel error: {0}")]
    ChannelClosed(String),

    /// The engine has been asked to stop.
    #[error("Register engine is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Audio Error
// =============================================================================

/// Failures reported by an audio backend. Never reach the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// No output device or speech engine.
    #[error("Audio output unavailable")]
    Unavailable,

    /// The backend tried and failed (autoplay blocked, synth busy, ...).
    #[error("Audio playback failed: {0}")]
    PlaybackFailed(String),
}

// =============================================================================
// Scan Error
// =============================================================================

/// Failures reported by the camera/decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Decode failed: {0}")]
    Decode(String),
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration load/save/validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    Load(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    Save(String),

    /// A value is present but unusable.
    #[error("Invalid register configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Load(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Load(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Save(err.to_string())
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

impl ScanError {
    /// True when retrying later might help (camera busy or momentarily
    /// missing), false when the user has to intervene.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::CameraUnavailable(_) | ScanError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_scan_errors() {
        assert!(ScanError::CameraUnavailable("busy".into()).is_retryable());
        assert!(ScanError::Decode("blurry".into()).is_retryable());
        assert!(!ScanError::PermissionDenied.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::ChannelClosed("Register inbox closed".into());
        assert_eq!(err.to_string(), "Channel error: Register inbox closed");

        let err = ConfigError::Invalid("unit_price must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid register configuration: unit_price must be positive"
        );
    }

    #[test]
    fn test_validation_converts_to_config_error() {
        let err: ConfigError = ValidationError::MustBePositive {
            field: "unit_price".into(),
        }
        .into();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
