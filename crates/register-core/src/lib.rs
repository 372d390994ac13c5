//! # register-core: Pure Session Logic for the Play Register
//!
//! This crate is the **heart** of the register. The whole customer
//! interaction is a value (`Session`) and every user intent or scan is an
//! `Event` applied to it. Nothing in here sleeps, spawns, plays sound or
//! touches a camera.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Play Register Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (terminal / web)                   │   │
//! │  │      Start screen ──► Scanning screen ──► Payment screen        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ intents / snapshots                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             register-engine (inbox actor + executor)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Session::apply(event)                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ register-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  session  │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Money   │  │  Session  │  │   scan    │  │   │
//! │  │   │ Snapshot  │  │   (yen)   │  │  Effect   │  │   codes   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO CHANNELS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RegisterState, LineItem, SessionSnapshot)
//! - [`money`] - Money type with integer arithmetic
//! - [`session`] - The state machine, events and effect descriptions
//! - [`rules`] - Price, label and spoken phrases for one register
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use register_core::{Event, RegisterRules, RegisterState, ScanEvent, Session};
//!
//! let rules = RegisterRules::default();
//! let session = Session::new();
//!
//! let t = session.apply(Event::Start, &rules);
//! let t = t.session.apply(Event::Scan(ScanEvent::new("4901234567894")), &rules);
//!
//! assert_eq!(t.session.state(), RegisterState::Scanning);
//! assert_eq!(t.session.total_count(), 1);
//! assert_eq!(t.session.total_amount().yen(), 110);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod rules;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use rules::{Phrases, RegisterRules};
pub use session::{Effect, Event, Outcome, ScanEvent, Session, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Price of every scanned item, in yen.
///
/// There is no catalog: the toy register is a "100-yen shop" and every
/// barcode rings up at the tax-inclusive 110 yen.
pub const DEFAULT_UNIT_PRICE_YEN: i64 = 110;

/// Display label shared by every line item.
pub const DEFAULT_ITEM_NAME: &str = "100円ショップの商品";

/// Gap between the scan beep and the spoken price, in milliseconds.
pub const DEFAULT_SPEECH_DELAY_MS: u64 = 300;

/// Longest scan code accepted from a decoder.
pub const MAX_CODE_LENGTH: usize = 256;

/// Upper bound for the configurable beep-to-speech gap.
pub const MAX_SPEECH_DELAY_MS: u64 = 5_000;

/// Highest configurable unit price, in yen. Keeps any realistic cart total
/// far away from `i64` limits.
pub const MAX_UNIT_PRICE_YEN: i64 = 1_000_000;
