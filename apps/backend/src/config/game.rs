//! Game and payment settings read from the environment.

use std::env;
use std::time::Duration;

use crate::domain::money::{CommissionRate, Money};
use crate::error::AppError;

pub const DEFAULT_STAKE_OPTIONS: &str = "20,50,100";
pub const DEFAULT_COMMISSION_RATE: &str = "0.10";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_MIN_DEPOSIT: &str = "10";
pub const DEFAULT_VERSION_RETRY_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Stakes a creator may choose from.
    pub stake_options: Vec<Money>,
    pub commission_rate: CommissionRate,
    /// Inactivity window after which the current player forfeits.
    pub game_timeout: Duration,
    pub min_deposit: Money,
    /// Attempts per intent when the game version moves underneath us.
    pub version_retry_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stake_options: vec![
                Money::from_minor(2000),
                Money::from_minor(5000),
                Money::from_minor(10000),
            ],
            commission_rate: CommissionRate::from_bps(1000).unwrap_or_default(),
            game_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            min_deposit: Money::from_minor(1000),
            version_retry_limit: DEFAULT_VERSION_RETRY_LIMIT,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let stake_options = parse_stake_options(&get("STAKE_OPTIONS", DEFAULT_STAKE_OPTIONS))?;

        let rate_raw = get("OWNER_COMMISSION_RATE", DEFAULT_COMMISSION_RATE);
        let commission_rate = rate_raw.parse::<CommissionRate>().map_err(|e| {
            AppError::config(format!("OWNER_COMMISSION_RATE '{rate_raw}' is invalid: {e}"))
        })?;

        let timeout_raw = get("GAME_TIMEOUT_SECONDS", &DEFAULT_TIMEOUT_SECONDS.to_string());
        let timeout_secs = timeout_raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| {
                AppError::config(format!(
                    "GAME_TIMEOUT_SECONDS must be a positive integer, got '{timeout_raw}'"
                ))
            })?;

        let min_raw = get("MIN_DEPOSIT_AMOUNT", DEFAULT_MIN_DEPOSIT);
        let min_deposit = min_raw
            .parse::<Money>()
            .ok()
            .filter(|m| m.is_positive())
            .ok_or_else(|| {
                AppError::config(format!(
                    "MIN_DEPOSIT_AMOUNT must be a positive amount, got '{min_raw}'"
                ))
            })?;

        let retry_raw = get(
            "VERSION_RETRY_LIMIT",
            &DEFAULT_VERSION_RETRY_LIMIT.to_string(),
        );
        let version_retry_limit = retry_raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                AppError::config(format!(
                    "VERSION_RETRY_LIMIT must be a positive integer, got '{retry_raw}'"
                ))
            })?;

        Ok(Self {
            stake_options,
            commission_rate,
            game_timeout: Duration::from_secs(timeout_secs),
            min_deposit,
            version_retry_limit,
        })
    }

    pub fn is_stake_option(&self, stake: Money) -> bool {
        self.stake_options.contains(&stake)
    }
}

fn parse_stake_options(raw: &str) -> Result<Vec<Money>, AppError> {
    let mut options = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let amount = part
            .parse::<Money>()
            .ok()
            .filter(|m| m.is_positive())
            .ok_or_else(|| {
                AppError::config(format!("STAKE_OPTIONS entry '{part}' is not a positive amount"))
            })?;
        if !options.contains(&amount) {
            options.push(amount);
        }
    }
    if options.is_empty() {
        return Err(AppError::config("STAKE_OPTIONS must list at least one amount"));
    }
    options.sort();
    Ok(options)
}
