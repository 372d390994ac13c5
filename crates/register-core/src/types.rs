//! # Domain Types
//!
//! The data the register shows and counts.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │ RegisterState   │   │    LineItem     │   │  SessionSnapshot    │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  Idle           │   │  id (UUID)      │   │  state              │   │
//! │  │  Scanning       │   │  code (raw)     │   │  items              │   │
//! │  │  Payment        │   │  name           │   │  totalCount         │   │
//! │  └─────────────────┘   │  price          │   │  totalAmount        │   │
//! │                        │  timestamp      │   │  lastScanned        │   │
//! │                        └─────────────────┘   │  canPay             │   │
//! │                                              └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Register State
// =============================================================================

/// Which screen the register is on.
///
/// ## Screen Flow
/// ```text
///            start                 request_payment
///   Idle ───────────► Scanning ───────────────────► Payment
///                      ▲    │ scan (self)              │
///                      │    └──────┘                   │
///                      └───────────────────────────────┘
///                                   reset
/// ```
/// There is no terminal state: the register serves customers until the
/// process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegisterState {
    /// Start screen, camera off.
    #[default]
    Idle,
    /// Camera on, every scan rings up an item.
    Scanning,
    /// Total shown, waiting for the next customer.
    Payment,
}

impl RegisterState {
    /// True while the scan source should be decoding.
    #[inline]
    pub const fn is_scanning(&self) -> bool {
        matches!(self, RegisterState::Scanning)
    }
}

impl fmt::Display for RegisterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterState::Idle => write!(f, "idle"),
            RegisterState::Scanning => write!(f, "scanning"),
            RegisterState::Payment => write!(f, "payment"),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One accepted scan, rung up at the fixed unit price.
///
/// Two scans of the same barcode are two line items with different ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Unique identifier (UUID v4), fixed when the scan was received.
    pub id: String,

    /// Decoded barcode exactly as the scanner reported it.
    pub code: String,

    /// Display label.
    pub name: String,

    /// Unit price at the time of the scan.
    pub price: Money,

    /// When the scan was received. Informational only.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Session Snapshot
// =============================================================================

/// Read-only view of the session for the presentation layer.
///
/// ## Serialization
/// ```json
/// {
///   "state": "SCANNING",
///   "items": [ ... ],
///   "totalCount": 2,
///   "totalAmount": 220,
///   "lastScanned": "4901234567894",
///   "canPay": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: RegisterState,
    pub items: Vec<LineItem>,
    pub total_count: usize,
    pub total_amount: Money,
    pub last_scanned: Option<String>,
    /// Whether the pay control should be enabled.
    pub can_pay: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
