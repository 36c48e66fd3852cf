//! Bank configuration
//!
//! Every policy parameter the engine does not derive on its own. Defaults
//! reproduce the reference economy: a 10% opening rate, a 25% reserve target
//! and a price level starting at 50.

use crate::bank::BankError;
use serde::{Deserialize, Serialize};

/// Bank policy configuration
///
/// # Example
/// ```
/// use bank_ledger_core_rs::BankConfig;
///
/// let config: BankConfig = serde_json::from_str(r#"{ "target_reserve_ratio": 0.1 }"#).unwrap();
/// assert_eq!(config.target_reserve_ratio, 0.1);
/// assert_eq!(config.initial_rate, 0.1); // unspecified fields keep their defaults
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Per-period nominal rate before the first policy update
    pub initial_rate: f64,

    /// Reserve ratio the rate controller steers toward, in (0, 1]
    pub target_reserve_ratio: f64,

    /// Smallest asset/liability gap that gets disbursed to depositors
    pub profit_tolerance: f64,

    /// Exponent damping the reserve-momentum term (`20^rate_smoothness`)
    pub rate_smoothness: f64,

    /// Price level the first inflation observation is measured against
    pub initial_price_level: f64,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            initial_rate: 0.1,
            target_reserve_ratio: 0.25,
            profit_tolerance: 0.01,
            rate_smoothness: 1.5,
            initial_price_level: 50.0,
        }
    }
}

impl BankConfig {
    /// Check every parameter is within its domain
    pub fn validate(&self) -> Result<(), BankError> {
        check_finite("initial_rate", self.initial_rate)?;
        validate_target_reserve_ratio(self.target_reserve_ratio)?;
        validate_profit_tolerance(self.profit_tolerance)?;
        check_finite("rate_smoothness", self.rate_smoothness)?;

        if !(self.initial_price_level.is_finite() && self.initial_price_level > 0.0) {
            return Err(BankError::InvalidParameter {
                name: "initial_price_level",
                value: self.initial_price_level,
                reason: "must be positive",
            });
        }

        Ok(())
    }
}

pub(crate) fn validate_target_reserve_ratio(value: f64) -> Result<(), BankError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(BankError::InvalidParameter {
            name: "target_reserve_ratio",
            value,
            reason: "must be in (0, 1]",
        })
    }
}

pub(crate) fn validate_profit_tolerance(value: f64) -> Result<(), BankError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BankError::InvalidParameter {
            name: "profit_tolerance",
            value,
            reason: "must be non-negative",
        })
    }
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<(), BankError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BankError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BankConfig::default().validate().is_ok());
    }

    #[test]
    fn test_target_reserve_ratio_bounds() {
        for bad in [0.0, -0.1, 1.01, f64::NAN] {
            let config = BankConfig {
                target_reserve_ratio: bad,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted ratio {}", bad);
        }

        let full_reserve = BankConfig {
            target_reserve_ratio: 1.0,
            ..Default::default()
        };
        assert!(full_reserve.validate().is_ok());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let config = BankConfig {
            profit_tolerance: -1.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("profit_tolerance"));
    }

    #[test]
    fn test_non_positive_price_level_rejected() {
        let config = BankConfig {
            initial_price_level: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
