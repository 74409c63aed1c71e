//! Game configuration.
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid config.

use crate::buyable::DEFAULT_MAX_BULK_PURCHASES;
use crate::error::FrameworkError;
use serde::{Deserialize, Serialize};

/// Settings for a `Game`.
///
/// # Examples
///
/// ```rust
/// use zzidle::GameConfig;
///
/// let config = GameConfig::from_json(r#"{ "starting_day": 5 }"#).unwrap();
/// assert_eq!(config.starting_day, 5);
/// assert_eq!(config.max_bulk_purchases, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Day the calendar starts on.
    pub starting_day: u32,
    /// Bound on purchases made by one buy-max call.
    pub max_bulk_purchases: u64,
    /// Seed for content randomness.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_day: 1,
            max_bulk_purchases: DEFAULT_MAX_BULK_PURCHASES,
            rng_seed: 0,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// `Config` for malformed JSON or a zero purchase bound.
    pub fn from_json(json: &str) -> Result<Self, FrameworkError> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| FrameworkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, FrameworkError> {
        serde_json::to_string_pretty(self).map_err(|e| FrameworkError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), FrameworkError> {
        if self.max_bulk_purchases == 0 {
            return Err(FrameworkError::Config(String::from(
                "max_bulk_purchases must be at least 1",
            )));
        }
        Ok(())
    }

    pub fn with_starting_day(mut self, day: u32) -> Self {
        self.starting_day = day;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(GameConfig::from_json("{}").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            GameConfig::from_json("{ starting_day: }"),
            Err(FrameworkError::Config(_))
        ));
    }

    #[test]
    fn test_zero_bulk_rejected() {
        let err = GameConfig::from_json(r#"{ "max_bulk_purchases": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("max_bulk_purchases"));
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::default().with_starting_day(12).with_seed(7);
        let back = GameConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
