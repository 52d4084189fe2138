//! YAML-backed venue configuration: slider bounds, cost model and the static
//! tier table.

use crate::{default_tiers, validate_tiers, InvalidInputError, SeatTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Default location of the venue configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/venue.yaml";

/// Default generation-model identifier for advisory requests.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid tier table: {0}")]
    Tiers(#[from] InvalidInputError),
}

/// Venue configuration. Every field falls back to the stock value when
/// absent from the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    pub capacity_min: i64,
    pub capacity_max: i64,
    pub capacity_step: i64,
    pub default_capacity: i64,
    /// Factor converting ticket revenue into total matchday revenue.
    pub ancillary_multiplier: Decimal,
    pub per_seat_cost: Decimal,
    pub tiers: Vec<SeatTier>,
    /// Generation-model identifier passed to the text generator.
    pub model: String,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            capacity_min: 40_000,
            capacity_max: 80_000,
            capacity_step: 1_000,
            default_capacity: 65_000,
            ancillary_multiplier: Decimal::new(145, 2),
            per_seat_cost: Decimal::new(25, 0),
            tiers: default_tiers(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl VenueConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: VenueConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let cfg = Self::from_yaml_str(&text)?;
        info!(
            path = %path.display(),
            tiers = cfg.tiers.len(),
            "loaded venue config"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity_min <= 0 {
            return Err(ConfigError::Invalid(format!(
                "capacity_min must be > 0, got {}",
                self.capacity_min
            )));
        }
        if self.capacity_max < self.capacity_min {
            return Err(ConfigError::Invalid(format!(
                "capacity_max {} is below capacity_min {}",
                self.capacity_max, self.capacity_min
            )));
        }
        if self.capacity_step <= 0 {
            return Err(ConfigError::Invalid("capacity_step must be > 0".into()));
        }
        if !(self.capacity_min..=self.capacity_max).contains(&self.default_capacity) {
            return Err(ConfigError::Invalid(format!(
                "default_capacity {} outside [{}, {}]",
                self.default_capacity, self.capacity_min, self.capacity_max
            )));
        }
        if self.ancillary_multiplier < Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "ancillary_multiplier must be >= 0".into(),
            ));
        }
        if self.per_seat_cost < Decimal::ZERO {
            return Err(ConfigError::Invalid("per_seat_cost must be >= 0".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be blank".into()));
        }
        validate_tiers(&self.tiers)?;
        Ok(())
    }

    /// Clamp a requested capacity into the slider range and snap it to the
    /// nearest step above `capacity_min`. Computed in `i128` so any bounds
    /// that pass `validate` are safe.
    pub fn clamp_capacity(&self, requested: i64) -> i64 {
        let min = i128::from(self.capacity_min);
        let max = i128::from(self.capacity_max);
        let step = i128::from(self.capacity_step);
        let offset = i128::from(requested.clamp(self.capacity_min, self.capacity_max)) - min;
        let steps = (offset + step / 2) / step;
        let snapped = (min + steps * step).min(max);
        i64::try_from(snapped).unwrap_or(self.capacity_max)
    }
}
