//! Engine configuration.
//!
//! Defaults match the production client: a 20 second cancellation window, 10 seconds per
//! later stage, a one second countdown tick and a 2.00 delivery fee. Every field can be
//! given in JSON (missing fields take the default) and overridden with a `FOODGO_*`
//! environment variable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds after creation during which cancellation is accepted. Also the
    /// deadline of the first auto-advance.
    #[serde(default = "default_cancel_window_secs")]
    pub cancel_window_secs: u64,
    /// Seconds between each later auto-advance.
    #[serde(default = "default_stage_interval_secs")]
    pub stage_interval_secs: u64,
    /// Countdown refresh period while the cancellation window is open.
    #[serde(default = "default_countdown_tick_secs")]
    pub countdown_tick_secs: u64,
    /// Request queue capacity of each actor.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Fee used when the catalog has none for a restaurant.
    #[serde(default = "default_delivery_fee")]
    pub default_delivery_fee: Decimal,
}

fn default_cancel_window_secs() -> u64 {
    20
}

fn default_stage_interval_secs() -> u64 {
    10
}

fn default_countdown_tick_secs() -> u64 {
    1
}

fn default_channel_capacity() -> usize {
    32
}

fn default_delivery_fee() -> Decimal {
    Decimal::new(200, 2)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cancel_window_secs: default_cancel_window_secs(),
            stage_interval_secs: default_stage_interval_secs(),
            countdown_tick_secs: default_countdown_tick_secs(),
            channel_capacity: default_channel_capacity(),
            default_delivery_fee: default_delivery_fee(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `FOODGO_CANCEL_WINDOW_SECS`, `FOODGO_STAGE_INTERVAL_SECS`,
    /// `FOODGO_COUNTDOWN_TICK_SECS`, `FOODGO_CHANNEL_CAPACITY` and
    /// `FOODGO_DEFAULT_DELIVERY_FEE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Applies overrides from any key lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        override_field(&lookup, "FOODGO_CANCEL_WINDOW_SECS", &mut self.cancel_window_secs)?;
        override_field(&lookup, "FOODGO_STAGE_INTERVAL_SECS", &mut self.stage_interval_secs)?;
        override_field(&lookup, "FOODGO_COUNTDOWN_TICK_SECS", &mut self.countdown_tick_secs)?;
        override_field(&lookup, "FOODGO_CHANNEL_CAPACITY", &mut self.channel_capacity)?;
        override_field(&lookup, "FOODGO_DEFAULT_DELIVERY_FEE", &mut self.default_delivery_fee)?;

        if self.countdown_tick_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "FOODGO_COUNTDOWN_TICK_SECS",
                value: "0".into(),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "FOODGO_CHANNEL_CAPACITY",
                value: "0".into(),
            });
        }
        Ok(self)
    }

    pub fn cancel_window(&self) -> Duration {
        Duration::from_secs(self.cancel_window_secs)
    }

    pub fn stage_interval(&self) -> Duration {
        Duration::from_secs(self.stage_interval_secs)
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_secs(self.countdown_tick_secs.max(1))
    }
}

fn override_field<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    field: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(key) {
        *field = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw })?;
    }
    Ok(())
}
