//! # Register Configuration
//!
//! Configuration management for the register engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PLAY_REGISTER_UNIT_PRICE=100                                       │
//! │     PLAY_REGISTER_SPEECH_DELAY_MS=400                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $PLAY_REGISTER_CONFIG, or                                          │
//! │     ~/.config/register/register.toml (Linux)                           │
//! │     ~/Library/Application Support/com.playregister.register/... (mac)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ¥110 per item, 300ms beep-to-speech gap                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # register.toml
//! [register]
//! item_name = "100円ショップの商品"
//! unit_price = 110
//!
//! [audio]
//! speech_delay_ms = 300
//!
//! [voice]
//! # Omit to derive from unit_price: "ひゃくじゅうえん" at 110, "{price}えん"
//! # otherwise.
//! unit_price_phrase = "{price}えん"
//! total_template = "ごうけい、{total}えんです。"
//! next_customer = "つぎの、どうぞ！"
//!
//! [scanner]
//! duplicate_cooldown_ms = 1500
//!
//! [engine]
//! inbox_capacity = 64
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use register_core::validation::{
    validate_label, validate_speech_delay, validate_total_template, validate_unit_price,
};
use register_core::rules::DEFAULT_UNIT_PRICE_PHRASE;
use register_core::{
    Money, Phrases, RegisterRules, DEFAULT_ITEM_NAME, DEFAULT_SPEECH_DELAY_MS,
    DEFAULT_UNIT_PRICE_YEN,
};

use crate::error::ConfigError;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PLAY_REGISTER_CONFIG";

// =============================================================================
// Register Settings
// =============================================================================

/// What every scan rings up as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSettings {
    #[serde(default = "default_item_name")]
    pub item_name: String,

    /// Unit price in yen.
    #[serde(default = "default_unit_price")]
    pub unit_price: i64,
}

fn default_item_name() -> String {
    DEFAULT_ITEM_NAME.to_string()
}

fn default_unit_price() -> i64 {
    DEFAULT_UNIT_PRICE_YEN
}

impl Default for RegisterSettings {
    fn default() -> Self {
        RegisterSettings {
            item_name: default_item_name(),
            unit_price: default_unit_price(),
        }
    }
}

// =============================================================================
// Audio Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Gap between the scan beep and the spoken price (milliseconds).
    #[serde(default = "default_speech_delay")]
    pub speech_delay_ms: u64,
}

fn default_speech_delay() -> u64 {
    DEFAULT_SPEECH_DELAY_MS
}

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings {
            speech_delay_ms: default_speech_delay(),
        }
    }
}

// =============================================================================
// Voice Settings
// =============================================================================

/// Spoken phrases. Defaults are the Japanese kana the register was built
/// with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Per-scan confirmation, may contain `{price}`. `None` derives it from
    /// the unit price so the voice never names a stale amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price_phrase: Option<String>,
    pub total_template: String,
    pub next_customer: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        let phrases = Phrases::default();
        VoiceSettings {
            unit_price_phrase: None,
            total_template: phrases.total_template,
            next_customer: phrases.next_customer,
        }
    }
}

// =============================================================================
// Scanner Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// How long the same code must be out of sight before it counts as a
    /// new scan (milliseconds).
    #[serde(default = "default_duplicate_cooldown")]
    pub duplicate_cooldown_ms: u64,

    /// Buffer between the decoder and the scan source driver.
    #[serde(default = "default_decode_buffer")]
    pub decode_buffer: usize,
}

fn default_duplicate_cooldown() -> u64 {
    1_500
}

fn default_decode_buffer() -> usize {
    32
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            duplicate_cooldown_ms: default_duplicate_cooldown(),
            decode_buffer: default_decode_buffer(),
        }
    }
}

impl ScannerSettings {
    pub fn duplicate_cooldown(&self) -> Duration {
        Duration::from_millis(self.duplicate_cooldown_ms)
    }
}

// =============================================================================
// Engine Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Capacity of the single event inbox.
    #[serde(default = "default_inbox_capacity")]
    pub inbox_capacity: usize,
}

fn default_inbox_capacity() -> usize {
    64
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            inbox_capacity: default_inbox_capacity(),
        }
    }
}

// =============================================================================
// Main Register Configuration
// =============================================================================

/// Complete register configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterConfig {
    #[serde(default)]
    pub register: RegisterSettings,

    #[serde(default)]
    pub audio: AudioSettings,

    #[serde(default)]
    pub voice: VoiceSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub engine: EngineSettings,
}

impl RegisterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (register.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading register config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load register config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<(), ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Save("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Save(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::Save(e.to_string()))?;

        info!(?path, "Register config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_label("item_name", &self.register.item_name)?;
        validate_unit_price(Money::from_yen(self.register.unit_price))?;
        validate_speech_delay(self.audio.speech_delay_ms)?;
        validate_total_template(&self.voice.total_template)?;
        validate_label("next_customer", &self.voice.next_customer)?;

        if let Some(phrase) = &self.voice.unit_price_phrase {
            validate_label("unit_price_phrase", phrase)?;

            if phrase == DEFAULT_UNIT_PRICE_PHRASE
                && self.register.unit_price != DEFAULT_UNIT_PRICE_YEN
            {
                return Err(ConfigError::Invalid(format!(
                    "unit_price_phrase says {} yen but unit_price is {}",
                    DEFAULT_UNIT_PRICE_YEN, self.register.unit_price
                )));
            }
        }

        if self.engine.inbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "inbox_capacity must be greater than 0".into(),
            ));
        }

        if self.scanner.decode_buffer == 0 {
            return Err(ConfigError::Invalid(
                "decode_buffer must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// [`load`](Self::load)).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("PLAY_REGISTER_ITEM_NAME") {
            self.register.item_name = name;
        }

        if let Some(price) = lookup("PLAY_REGISTER_UNIT_PRICE") {
            match price.parse::<i64>() {
                Ok(p) => {
                    debug!(unit_price = p, "Overriding unit price from environment");
                    self.register.unit_price = p;
                }
                Err(_) => warn!(value = %price, "Ignoring unparsable PLAY_REGISTER_UNIT_PRICE"),
            }
        }

        if let Some(delay) = lookup("PLAY_REGISTER_SPEECH_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => self.audio.speech_delay_ms = ms,
                Err(_) => {
                    warn!(value = %delay, "Ignoring unparsable PLAY_REGISTER_SPEECH_DELAY_MS")
                }
            }
        }

        if let Some(cooldown) = lookup("PLAY_REGISTER_SCAN_COOLDOWN_MS") {
            match cooldown.parse::<u64>() {
                Ok(ms) => self.scanner.duplicate_cooldown_ms = ms,
                Err(_) => {
                    warn!(value = %cooldown, "Ignoring unparsable PLAY_REGISTER_SCAN_COOLDOWN_MS")
                }
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "playregister", "register")
            .map(|dirs| dirs.config_dir().join("register.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Builds the pure rule set the state machine runs on.
    pub fn rules(&self) -> RegisterRules {
        let unit_price = Money::from_yen(self.register.unit_price);

        RegisterRules {
            item_name: self.register.item_name.clone(),
            unit_price,
            speech_delay: Duration::from_millis(self.audio.speech_delay_ms),
            phrases: Phrases {
                unit_price: self
                    .voice
                    .unit_price_phrase
                    .clone()
                    .unwrap_or_else(|| Phrases::unit_price_phrase_for(unit_price)),
                total_template: self.voice.total_template.clone(),
                next_customer: self.voice.next_customer.clone(),
            },
        }
    }
}
