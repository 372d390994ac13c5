//! # Validation Module
//!
//! Input validation for scan codes and register settings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Scan source                                                  │
//! │  └── Duplicate suppression (same code still in frame)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: State machine                                                │
//! │  └── THIS MODULE: validate_scan_code before ringing up                 │
//! │                                                                         │
//! │  Layer 3: Configuration load                                           │
//! │  └── THIS MODULE: price, delay, phrase template                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scan codes are not checked against any barcode symbology: a toy register
//! accepts whatever the decoder read, including the group separators GS1
//! symbols carry.

use crate::error::ValidationError;
use crate::money::Money;
use crate::rules::TOTAL_PLACEHOLDER;
use crate::{MAX_CODE_LENGTH, MAX_SPEECH_DELAY_MS, MAX_UNIT_PRICE_YEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Scan Codes
// =============================================================================

/// Validates a decoded scan code.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_CODE_LENGTH`] characters
///
/// Content is never inspected: whitespace, control characters (GS1 `\x1d`)
/// and non-ASCII text all ring up, and the line item keeps the code
/// verbatim.
///
/// ## Example
/// ```rust
/// use register_core::validation::validate_scan_code;
///
/// assert!(validate_scan_code("4901234567894").is_ok());
/// assert!(validate_scan_code("0104912345678904\u{1d}10ABC123").is_ok());
/// assert!(validate_scan_code("").is_err());
/// ```
pub fn validate_scan_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Register Settings
// =============================================================================

/// Validates the unit price. Free items would make the total meaningless,
/// and prices above [`MAX_UNIT_PRICE_YEN`] are not a toy shop.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }

    if price.yen() > MAX_UNIT_PRICE_YEN {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 1,
            max: MAX_UNIT_PRICE_YEN,
        });
    }

    Ok(())
}

/// Validates the beep-to-speech gap in milliseconds.
pub fn validate_speech_delay(delay_ms: u64) -> ValidationResult<()> {
    if delay_ms > MAX_SPEECH_DELAY_MS {
        return Err(ValidationError::OutOfRange {
            field: "speech_delay_ms".to_string(),
            min: 0,
            max: MAX_SPEECH_DELAY_MS as i64,
        });
    }

    Ok(())
}

/// Validates the payment announcement template.
pub fn validate_total_template(template: &str) -> ValidationResult<()> {
    if !template.contains(TOTAL_PLACEHOLDER) {
        return Err(ValidationError::InvalidFormat {
            field: "total_template".to_string(),
            reason: format!("must contain {}", TOTAL_PLACEHOLDER),
        });
    }

    Ok(())
}

/// Validates a label shown or spoken by the register.
pub fn validate_label(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_scan_code() {
        assert!(validate_scan_code("4901234567894").is_ok());
        assert!(validate_scan_code("A1").is_ok());
        assert!(validate_scan_code("https://example.com/qr").is_ok());
        assert!(validate_scan_code(" padded ").is_ok());
        assert!(validate_scan_code(" \t ").is_ok());
        assert!(validate_scan_code("りんご").is_ok());

        assert!(validate_scan_code("").is_err());
        assert!(validate_scan_code(&"9".repeat(MAX_CODE_LENGTH + 1)).is_err());
        assert!(validate_scan_code(&"9".repeat(MAX_CODE_LENGTH)).is_ok());
    }

    #[test]
    fn test_empty_code_reports_required() {
        assert_eq!(
            validate_scan_code(""),
            Err(ValidationError::Required {
                field: "code".to_string()
            })
        );
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Money::from_yen(110)).is_ok());
        assert!(validate_unit_price(Money::zero()).is_err());
        assert!(validate_unit_price(Money::from_yen(-1)).is_err());
        assert!(validate_unit_price(Money::from_yen(MAX_UNIT_PRICE_YEN)).is_ok());
    }

    #[test]
    fn test_unit_price_upper_bound() {
        assert_eq!(
            validate_unit_price(Money::from_yen(MAX_UNIT_PRICE_YEN + 1)),
            Err(ValidationError::OutOfRange {
                field: "unit_price".to_string(),
                min: 1,
                max: MAX_UNIT_PRICE_YEN,
            })
        );
        assert!(validate_unit_price(Money::from_yen(i64::MAX / 2 + 1)).is_err());
    }

    #[test]
    fn test_gs1_group_separator_is_accepted() {
        assert!(validate_scan_code("0104912345678904\u{1d}10ABC123").is_ok());
        assert!(validate_scan_code("\u{1d}").is_ok());
    }

    #[test]
    fn test_validate_speech_delay() {
        assert!(validate_speech_delay(0).is_ok());
        assert!(validate_speech_delay(300).is_ok());
        assert!(validate_speech_delay(MAX_SPEECH_DELAY_MS).is_ok());
        assert!(validate_speech_delay(MAX_SPEECH_DELAY_MS + 1).is_err());
    }

    #[test]
    fn test_validate_total_template() {
        assert!(validate_total_template("ごうけい、{total}えんです。").is_ok());
        assert!(validate_total_template("ごうけいです").is_err());
    }

    #[test]
    fn test_validate_label() {
        assert!(validate_label("item_name", "100円ショップの商品").is_ok());
        assert!(validate_label("item_name", "   ").is_err());
    }
}
