//! # Register Errors
//!
//! Why the session refused an event, and why a value was rejected.
//!
//! ## Where Errors Live
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Register Error Map                              │
//! │                                                                         │
//! │  register-core errors (this file)                                      │
//! │  ├── CoreError        - Why an event was ignored                       │
//! │  └── ValidationError  - Bad code or bad configuration value            │
//! │                                                                         │
//! │  register-engine errors (separate crate)                               │
//! │  ├── EngineError      - Inbox / actor plumbing                         │
//! │  ├── AudioError       - Absorbed, logged                               │
//! │  └── ScanError        - Surfaced as scanner status                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → Outcome::Ignored → debug log      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `CoreError` never aborts anything. The state machine hands it back
//! inside [`Outcome::Ignored`](crate::Outcome::Ignored) so callers can log
//! it; the session itself is untouched.

use thiserror::Error;

use crate::types::RegisterState;

// =============================================================================
// Core Error
// =============================================================================

/// Reasons the state machine refused an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The event is not allowed in the current state.
    ///
    /// ## When This Occurs
    /// - `start` pressed twice (a stale button event)
    /// - A scan delivered just after the screen moved to payment
    /// - `reset` while still scanning
    #[error("{event} is not allowed while {state}")]
    InvalidTransition {
        event: &'static str,
        state: RegisterState,
    },

    /// Payment was requested with nothing in the cart.
    #[error("Cannot take payment for an empty cart")]
    EmptyCart,

    /// The scanned code (or a rule) failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A value the register cannot use: an empty or oversized barcode, a
/// non-positive price, a voice template without its placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Empty, or only whitespace.
    #[error("{field} is required")]
    Required { field: String },

    /// Longer than the field allows (in characters, not bytes).
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Outside an inclusive range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative where only a positive amount makes sense.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (a template missing its placeholder).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result of a core operation.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
