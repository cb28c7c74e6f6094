//! Pipeline configuration
//!
//! Layered: defaults, then an optional TOML file, then environment
//! variables prefixed `CAREPAY_`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value is out of its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Payment pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Platform service charge as a percentage of the base price
    pub service_charge_percent: Decimal,

    /// Flat rapid assistance add-on fee
    pub rapid_assistance_fee: Decimal,

    /// Minimum patient age for rapid assistance eligibility
    pub rapid_assistance_min_age: f64,

    /// Rolling window for behavioral signals, in hours
    pub signal_window_hours: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            service_charge_percent: Decimal::from(25),
            rapid_assistance_fee: Decimal::from(200),
            rapid_assistance_min_age: 60.0,
            signal_window_hours: 24,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CAREPAY_`-prefixed environment overrides
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = std::env::var("CAREPAY_SERVICE_CHARGE_PERCENT") {
            self.service_charge_percent = Decimal::from_str(&v)
                .map_err(|e| ConfigError::Parse(format!("CAREPAY_SERVICE_CHARGE_PERCENT: {e}")))?;
        }
        if let Ok(v) = std::env::var("CAREPAY_RAPID_ASSISTANCE_FEE") {
            self.rapid_assistance_fee = Decimal::from_str(&v)
                .map_err(|e| ConfigError::Parse(format!("CAREPAY_RAPID_ASSISTANCE_FEE: {e}")))?;
        }
        if let Ok(v) = std::env::var("CAREPAY_RAPID_ASSISTANCE_MIN_AGE") {
            self.rapid_assistance_min_age = v
                .parse()
                .map_err(|e| ConfigError::Parse(format!("CAREPAY_RAPID_ASSISTANCE_MIN_AGE: {e}")))?;
        }
        if let Ok(v) = std::env::var("CAREPAY_SIGNAL_WINDOW_HOURS") {
            self.signal_window_hours = v
                .parse()
                .map_err(|e| ConfigError::Parse(format!("CAREPAY_SIGNAL_WINDOW_HOURS: {e}")))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_charge_percent < Decimal::ZERO
            || self.service_charge_percent > Decimal::from(100)
        {
            return Err(ConfigError::Invalid(
                "service_charge_percent must be within [0, 100]".into(),
            ));
        }
        if self.rapid_assistance_fee < Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "rapid_assistance_fee must not be negative".into(),
            ));
        }
        if !self.rapid_assistance_min_age.is_finite() || self.rapid_assistance_min_age < 0.0 {
            return Err(ConfigError::Invalid(
                "rapid_assistance_min_age must be a non-negative finite number".into(),
            ));
        }
        if self.signal_window_hours <= 0 {
            return Err(ConfigError::Invalid(
                "signal_window_hours must be positive".into(),
            ));
        }
        Ok(())
    }
}
