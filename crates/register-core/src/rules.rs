//! # Register Rules
//!
//! The handful of constants that make one register behave the way it does:
//! the label and price of every item, and what the register says out loud.
//!
//! The defaults reproduce the classroom "100-yen shop" register. The engine
//! crate builds a `RegisterRules` from its TOML configuration.

use std::time::Duration;

use crate::money::Money;
use crate::{DEFAULT_ITEM_NAME, DEFAULT_SPEECH_DELAY_MS, DEFAULT_UNIT_PRICE_YEN};

/// Placeholder replaced by the total in [`Phrases::total_template`].
pub const TOTAL_PLACEHOLDER: &str = "{total}";

/// Placeholder replaced by the unit price in [`Phrases::unit_price`].
pub const PRICE_PLACEHOLDER: &str = "{price}";

/// How the register says its default price of 110 yen.
pub const DEFAULT_UNIT_PRICE_PHRASE: &str = "ひゃくじゅうえん";

/// Everything the state machine needs besides the session itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRules {
    /// Label given to every line item.
    pub item_name: String,

    /// Price given to every line item.
    pub unit_price: Money,

    /// Gap between the scan tone and the spoken price.
    pub speech_delay: Duration,

    /// Spoken feedback.
    pub phrases: Phrases,
}

impl Default for RegisterRules {
    fn default() -> Self {
        RegisterRules {
            item_name: DEFAULT_ITEM_NAME.to_string(),
            unit_price: Money::from_yen(DEFAULT_UNIT_PRICE_YEN),
            speech_delay: Duration::from_millis(DEFAULT_SPEECH_DELAY_MS),
            phrases: Phrases::default(),
        }
    }
}

/// What the register says, written in kana so a speech engine reads it the
/// way a child would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrases {
    /// Spoken after each scan ("one hundred ten yen"). May contain
    /// `{price}`.
    pub unit_price: String,

    /// Spoken when payment starts; `{total}` is replaced by the amount.
    pub total_template: String,

    /// Spoken on reset, inviting the next customer.
    pub next_customer: String,
}

impl Default for Phrases {
    fn default() -> Self {
        Phrases {
            unit_price: DEFAULT_UNIT_PRICE_PHRASE.to_string(),
            total_template: "ごうけい、{total}えんです。".to_string(),
            next_customer: "つぎの、どうぞ！".to_string(),
        }
    }
}

impl Phrases {
    /// The per-scan phrase a register charging `price` speaks unless told
    /// otherwise: the kana reading for the default price, a `{price}えん`
    /// template for any other.
    pub fn unit_price_phrase_for(price: Money) -> String {
        if price.yen() == DEFAULT_UNIT_PRICE_YEN {
            DEFAULT_UNIT_PRICE_PHRASE.to_string()
        } else {
            format!("{}えん", PRICE_PLACEHOLDER)
        }
    }

    /// Fills the per-scan confirmation with the unit price.
    pub fn price_confirmation(&self, price: Money) -> String {
        self.unit_price
            .replace(PRICE_PLACEHOLDER, &price.yen().to_string())
    }

    /// Fills the total announcement with a plain number (`330`, not `¥330`),
    /// which speech engines pronounce correctly.
    pub fn total_announcement(&self, total: Money) -> String {
        self.total_template
            .replace(TOTAL_PLACEHOLDER, &total.yen().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = RegisterRules::default();
        assert_eq!(rules.unit_price.yen(), 110);
        assert_eq!(rules.item_name, "100円ショップの商品");
        assert_eq!(rules.speech_delay, Duration::from_millis(300));
    }

    #[test]
    fn test_total_announcement() {
        let phrases = Phrases::default();
        assert_eq!(
            phrases.total_announcement(Money::from_yen(1320)),
            "ごうけい、1320えんです。"
        );
    }

    #[test]
    fn test_price_confirmation_follows_price() {
        let default = Phrases::default();
        assert_eq!(
            default.price_confirmation(Money::from_yen(110)),
            "ひゃくじゅうえん"
        );

        let phrases = Phrases {
            unit_price: Phrases::unit_price_phrase_for(Money::from_yen(100)),
            ..Phrases::default()
        };
        assert_eq!(phrases.price_confirmation(Money::from_yen(100)), "100えん");
    }

    #[test]
    fn test_unit_price_phrase_for_default_price_is_kana() {
        assert_eq!(
            Phrases::unit_price_phrase_for(Money::from_yen(DEFAULT_UNIT_PRICE_YEN)),
            DEFAULT_UNIT_PRICE_PHRASE
        );
        assert_eq!(Phrases::unit_price_phrase_for(Money::from_yen(50)), "{price}えん");
    }

    #[test]
    fn test_custom_template() {
        let phrases = Phrases {
            total_template: "That will be {total} yen".to_string(),
            ..Phrases::default()
        };
        assert_eq!(
            phrases.total_announcement(Money::from_yen(220)),
            "That will be 220 yen"
        );
    }
}
