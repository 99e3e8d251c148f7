//! Ledger configuration.
//!
//! Sources, later overriding earlier:
//!
//! 1. Defaults: no default tiers, nothing re-applied.
//! 2. A TOML file, passed with `--config` or `RESELLER_LEDGER_CONFIG`.
//! 3. Environment variables (`RESELLER_LEDGER_APPLY_TO_ALL`).
//!
//! ```toml
//! apply_defaults_to_all = true
//!
//! [[default_tiers]]
//! min = 0
//! max = 1000
//! percentage = 10
//!
//! [[default_tiers]]
//! min = 1000
//! percentage = 20
//! ```

use crate::domain::tier::CommissionTier;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

pub const ENV_CONFIG_PATH: &str = "RESELLER_LEDGER_CONFIG";
pub const ENV_APPLY_TO_ALL: &str = "RESELLER_LEDGER_APPLY_TO_ALL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Tier set copied to resellers on registration.
    pub default_tiers: Vec<CommissionTier>,
    /// Copy `default_tiers` onto every existing reseller at startup.
    pub apply_defaults_to_all: bool,
}

impl LedgerConfig {
    /// Loads the configuration from `path` (if any), applies environment
    /// overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                info!(?path, "Loading ledger config from file");
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    LedgerError::ConfigError(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml(&contents)?
            }
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| LedgerError::ConfigError(e.to_string()))
    }

    /// Applies overrides looked up by variable name.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_APPLY_TO_ALL) {
            match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => self.apply_defaults_to_all = true,
                "0" | "false" | "no" => self.apply_defaults_to_all = false,
                other => warn!(value = %other, "Ignoring unrecognized {ENV_APPLY_TO_ALL}"),
            }
            debug!(apply_to_all = self.apply_defaults_to_all, "Overriding apply_defaults_to_all from environment");
        }
    }

    /// Tier minimums must be non-negative and distinct, percentages within `[0, 100]`.
    pub fn validate(&self) -> Result<()> {
        let mut mins = HashSet::new();
        for tier in &self.default_tiers {
            if tier.min.is_negative() {
                return Err(LedgerError::ConfigError(format!(
                    "tier minimum {} is negative",
                    tier.min
                )));
            }
            if !mins.insert(tier.min) {
                return Err(LedgerError::ConfigError(format!(
                    "duplicate tier minimum {}",
                    tier.min
                )));
            }
            let pct = tier.percentage.value();
            if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                return Err(LedgerError::ConfigError(format!(
                    "tier percentage {} is outside 0..=100",
                    tier.percentage
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Money, Percent};
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = r#"
apply_defaults_to_all = true

[[default_tiers]]
min = 0
max = 1000
percentage = 10

[[default_tiers]]
min = 1000
percentage = 20.5
"#;

    #[test]
    fn test_parse_toml() {
        let config = LedgerConfig::from_toml(SAMPLE).unwrap();
        assert!(config.apply_defaults_to_all);
        assert_eq!(config.default_tiers.len(), 2);
        assert_eq!(config.default_tiers[0].max, Some(Money::new(dec!(1000))));
        assert_eq!(config.default_tiers[1].max, None);
        assert_eq!(config.default_tiers[1].percentage, Percent::new(dec!(20.5)));
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = LedgerConfig::from_toml("").unwrap();
        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = LedgerConfig::from_toml("default_tiers = 3").unwrap_err();
        assert!(matches!(err, LedgerError::ConfigError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let config = LedgerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.default_tiers.len(), 2);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = LedgerConfig::load(Some(Path::new("/nonexistent/ledger.toml"))).unwrap_err();
        assert!(matches!(err, LedgerError::ConfigError(_)));
    }

    #[test]
    fn test_env_override() {
        let mut config = LedgerConfig::default();
        config.apply_overrides(|key| (key == ENV_APPLY_TO_ALL).then(|| "true".to_string()));
        assert!(config.apply_defaults_to_all);

        config.apply_overrides(|_| Some("nonsense".to_string()));
        assert!(config.apply_defaults_to_all);

        config.apply_overrides(|_| Some("0".to_string()));
        assert!(!config.apply_defaults_to_all);
    }

    #[test]
    fn test_validate_rejects_bad_tiers() {
        let duplicate = LedgerConfig {
            default_tiers: vec![
                CommissionTier::new(Money::ZERO, None, Percent::new(dec!(10))),
                CommissionTier::new(Money::ZERO, None, Percent::new(dec!(20))),
            ],
            apply_defaults_to_all: false,
        };
        assert!(duplicate.validate().is_err());

        let negative = LedgerConfig {
            default_tiers: vec![CommissionTier::new(
                Money::new(dec!(-1)),
                None,
                Percent::new(dec!(10)),
            )],
            apply_defaults_to_all: false,
        };
        assert!(negative.validate().is_err());

        let over = LedgerConfig {
            default_tiers: vec![CommissionTier::new(Money::ZERO, None, Percent::new(dec!(101)))],
            apply_defaults_to_all: false,
        };
        assert!(over.validate().is_err());
    }
}
