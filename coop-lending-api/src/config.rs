//! Lending policy configuration.
//!
//! Defaults reproduce the cooperative's standing policy; each value may be
//! overridden from the environment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::service::surety_gate::SuretyPolicy;

pub const ENV_INTEREST_RATE_PERCENT: &str = "LENDING_INTEREST_RATE_PERCENT";
pub const ENV_DEFAULT_DUE_DAY: &str = "LENDING_DEFAULT_DUE_DAY";
pub const ENV_SURETY_POLICY: &str = "LENDING_SURETY_POLICY";
pub const ENV_GRACE_DAYS: &str = "LENDING_GRACE_DAYS";

/// Configuration errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Annual interest rate in percent applied to every new application
    pub interest_rate_percent: Decimal,

    /// Payment due day used when an application names none
    pub default_payment_due_day: u32,

    /// How surety responses decide approvability
    pub surety_policy: SuretyPolicy,

    /// Days past the next payment date before a loan may be marked defaulted
    pub default_grace_days: i64,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            interest_rate_percent: Decimal::from(5),
            default_payment_due_day: 15,
            surety_policy: SuretyPolicy::AllApproved,
            default_grace_days: 30,
        }
    }
}

impl LendingConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for unset variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let interest_rate_percent =
            parse_env(ENV_INTEREST_RATE_PERCENT)?.unwrap_or(defaults.interest_rate_percent);
        if interest_rate_percent.is_sign_negative() {
            return Err(ConfigError::InvalidValue {
                name: ENV_INTEREST_RATE_PERCENT,
                value: interest_rate_percent.to_string(),
            });
        }

        let default_payment_due_day =
            parse_env(ENV_DEFAULT_DUE_DAY)?.unwrap_or(defaults.default_payment_due_day);
        if !(1..=31).contains(&default_payment_due_day) {
            return Err(ConfigError::InvalidValue {
                name: ENV_DEFAULT_DUE_DAY,
                value: default_payment_due_day.to_string(),
            });
        }

        let default_grace_days =
            parse_env(ENV_GRACE_DAYS)?.unwrap_or(defaults.default_grace_days);
        if default_grace_days < 0 {
            return Err(ConfigError::InvalidValue {
                name: ENV_GRACE_DAYS,
                value: default_grace_days.to_string(),
            });
        }

        Ok(Self {
            interest_rate_percent,
            default_payment_due_day,
            surety_policy: parse_env(ENV_SURETY_POLICY)?.unwrap_or(defaults.surety_policy),
            default_grace_days,
        })
    }
}

fn parse_env<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(None),
    }
}
