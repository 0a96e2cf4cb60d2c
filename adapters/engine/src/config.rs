//! Engine configuration loaded from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use citysim_core::CityOptions;
use citysim_system_disasters::DisasterConfig;
use citysim_system_propagation::{PropagationConfig, TrafficConfig};
use citysim_system_zoning::{BudgetConfig, ZoningConfig};
use serde::Deserialize;

/// Largest map edge the save format can describe.
pub const MAX_EDGE: u32 = u16::MAX as u32;

/// Reasons a configuration is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid TOML or has fields of the wrong type.
    #[error("failed to parse engine configuration")]
    Toml(#[from] toml::de::Error),
    /// A map edge is zero or too large for the save format.
    #[error("map size {width}x{height} is outside 1..=65535")]
    BadDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Everything needed to found a new city and tune its systems.
///
/// Every field has a default, so an empty document is a valid configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed of the city's random stream.
    pub seed: u64,
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Treasury balance of a new city.
    pub starting_funds: i64,
    /// Gameplay options of a new city.
    pub options: CityOptions,
    /// Zone growth tunables.
    pub zoning: ZoningConfig,
    /// Traffic tunables.
    pub traffic: TrafficConfig,
    /// Tax and evaluation tunables.
    pub budget: BudgetConfig,
    /// Disaster tunables.
    pub disasters: DisasterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: 120,
            height: 100,
            starting_funds: 20_000,
            options: CityOptions::default(),
            zoning: ZoningConfig::default(),
            traffic: TrafficConfig::default(),
            budget: BudgetConfig::default(),
            disasters: DisasterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read engine configuration at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid engine configuration in {}", path.display()))
    }

    /// Checks the values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edge = 1..=MAX_EDGE;
        if edge.contains(&self.width) && edge.contains(&self.height) {
            Ok(())
        } else {
            Err(ConfigError::BadDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub(crate) fn propagation(&self) -> PropagationConfig {
        PropagationConfig {
            traffic: self.traffic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").expect("defaults");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn sections_override_single_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            seed = 7
            width = 64
            height = 48

            [options]
            disasters = true

            [zoning]
            max_growth_per_tick = 1

            [traffic]
            max_steps = 12
            "#,
        )
        .expect("valid configuration");
        assert_eq!(config.seed, 7);
        assert_eq!((config.width, config.height), (64, 48));
        assert!(config.options.disasters);
        assert!(config.options.auto_bulldoze);
        assert_eq!(config.zoning.max_growth_per_tick, 1);
        assert_eq!(config.zoning.grow_threshold, ZoningConfig::default().grow_threshold);
        assert_eq!(config.traffic.max_steps, 12);
        assert_eq!(config.budget, BudgetConfig::default());
    }

    #[test]
    fn zero_sized_maps_are_rejected() {
        let error = EngineConfig::from_toml_str("width = 0").expect_err("rejected");
        assert!(matches!(
            error,
            ConfigError::BadDimensions { width: 0, height: 100 }
        ));
    }

    #[test]
    fn wrong_types_are_toml_errors() {
        let error = EngineConfig::from_toml_str("seed = \"many\"").expect_err("rejected");
        assert!(matches!(error, ConfigError::Toml(_)));
    }
}
