//! # Money Module
//!
//! Provides the `Money` type for the register's prices and totals.
//!
//! Yen has no minor unit, so the register counts in whole yen and every
//! total is an exact integer sum: twelve scans at ¥110 are ¥1,320, never
//! ¥1,319.9999.
//!
//! ## Usage
//! ```rust
//! use register_core::money::Money;
//!
//! let price = Money::from_yen(110);
//! let total: Money = [price, price, price].into_iter().sum();
//! assert_eq!(total.yen(), 330);
//! assert_eq!(total.to_string(), "¥330");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole yen.
///
/// ## Design Decisions
/// - **i64 (signed)**: same width the rest of the arithmetic uses
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as a bare number**: the presentation layer formats it
///
/// ## Where Money is Used
/// ```text
/// RegisterRules.unit_price ──► LineItem.price ──► Session.total_amount()
///                                                        │
///                              spoken "ごうけい、330えんです。" ◄──┤
///                              shown as "¥330"          ◄──┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole yen.
    #[inline]
    pub const fn from_yen(yen: i64) -> Self {
        Money(yen)
    }

    /// Returns the value in yen.
    #[inline]
    pub const fn yen(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount the way the register screen does: `¥1,320`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}¥{}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturates at the `i64` bounds instead of overflowing: a cart total is
/// computed inside the engine task and must never panic there.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
