//! Configuration file support for Larder.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/larder/config.toml`.

use crate::{Error, Result, UnitRegistry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub costing: CostingConfig,

    #[serde(default)]
    pub units: UnitsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Display options for cost output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CostingConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// A user-defined unit attached to a built-in family by label
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomUnit {
    pub name: String,
    /// Quantity of the family base unit equal to 1 of this unit
    pub ratio: f64,
    /// Label of the family to attach to, e.g. "1 Gram"
    pub family: String,
}

/// Custom unit definitions
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UnitsConfig {
    #[serde(default)]
    pub custom: Vec<CustomUnit>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("larder")
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("larder").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Merge configured custom units into a registry.
    ///
    /// Each custom unit names the family it extends by label; the
    /// family must already exist and the ratio must be positive.
    pub fn apply_custom_units(&self, registry: &mut UnitRegistry) -> Result<()> {
        for custom in &self.units.custom {
            let family_id = registry
                .unit_types
                .values()
                .find(|t| t.label == custom.family)
                .map(|t| t.id)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "Custom unit '{}' references unknown family '{}'",
                        custom.name, custom.family
                    ))
                })?;

            let ratio = Decimal::from_f64_retain(custom.ratio)
                .filter(|r| *r > Decimal::ZERO)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "Custom unit '{}' has invalid ratio {}",
                        custom.name, custom.ratio
                    ))
                })?;

            registry.add_unit(&custom.name, ratio, family_id);
            tracing::debug!("Registered custom unit '{}'", custom.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_default_units;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.costing.currency_symbol, "$");
        assert!(config.units.custom.is_empty());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.costing.currency_symbol = "€".into();
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.costing.currency_symbol, "€");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[[units.custom]]
name = "sack"
ratio = 25000.0
family = "1 Gram"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.costing.currency_symbol, "$"); // default
        assert_eq!(config.units.custom.len(), 1);
    }

    #[test]
    fn test_apply_custom_units() {
        let toml_str = r#"
[[units.custom]]
name = "sack"
ratio = 25000.0
family = "1 Gram"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let mut registry = build_default_units();
        config.apply_custom_units(&mut registry).unwrap();

        let sack = registry.unit_by_name("sack").unwrap();
        let family = registry.unit_type(sack.unit_type_id).unwrap();
        assert_eq!(family.label, "1 Gram");
        assert!(registry.validate().is_empty());
    }

    #[test]
    fn test_custom_unit_unknown_family_is_rejected() {
        let config = Config {
            units: UnitsConfig {
                custom: vec![CustomUnit {
                    name: "hogshead".into(),
                    ratio: 238.0,
                    family: "1 Barrel".into(),
                }],
            },
            ..Default::default()
        };
        let mut registry = build_default_units();
        assert!(matches!(
            config.apply_custom_units(&mut registry),
            Err(Error::Config(_))
        ));
    }
}
