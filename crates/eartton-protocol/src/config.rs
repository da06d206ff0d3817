//! # Protocol Configuration
//!
//! Defaults for outbound messages and the issuer's initial parameters.
//!
//! ## Environment Overrides
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `EARTTON_WORKCHAIN` | `workchain` | signed 8-bit integer |
//! | `EARTTON_MESSAGE_VALUE` | `message_value` | decimal tokens, e.g. `0.05` |
//! | `EARTTON_FORWARD_AMOUNT` | `forward_amount` | decimal tokens, e.g. `0.01` |
//!
//! Unset variables keep their defaults; set but unparsable ones are errors.

use crate::domain::cell::Cell;
use crate::domain::entities::SendMode;
use crate::domain::state::IssuerState;
use crate::domain::value_objects::{Address, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound of basis-point parameters (100%).
pub const MAX_BASIS_POINTS: u16 = 10_000;

/// Env var overriding [`ProtocolConfig::workchain`].
pub const ENV_WORKCHAIN: &str = "EARTTON_WORKCHAIN";
/// Env var overriding [`ProtocolConfig::message_value`].
pub const ENV_MESSAGE_VALUE: &str = "EARTTON_MESSAGE_VALUE";
/// Env var overriding [`ProtocolConfig::forward_amount`].
pub const ENV_FORWARD_AMOUNT: &str = "EARTTON_FORWARD_AMOUNT";

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for {name}: `{value}`")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// A basis-point parameter exceeds 10000.
    #[error("{field} is {value} basis points, maximum is 10000")]
    BasisPointsOutOfRange {
        /// Parameter name.
        field: &'static str,
        /// Rejected value.
        value: u16,
    },
}

// =============================================================================
// PROTOCOL CONFIG
// =============================================================================

/// Defaults applied by the contract proxies to every outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Workchain new programs are deployed to.
    pub workchain: i8,
    /// Value attached to each message to cover fees.
    pub message_value: Amount,
    /// Value forwarded with transfer notifications.
    pub forward_amount: Amount,
    /// Send mode of every message.
    pub send_mode: SendMode,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            workchain: 0,
            message_value: Amount::from_nano(50_000_000),
            forward_amount: Amount::from_nano(10_000_000),
            send_mode: SendMode::PayGasSeparately,
        }
    }
}

impl ProtocolConfig {
    /// Defaults overridden from the process environment.
    ///
    /// # Errors
    ///
    /// `InvalidEnv` if a set variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// `InvalidEnv` if a present value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_WORKCHAIN) {
            config.workchain = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_WORKCHAIN,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_MESSAGE_VALUE) {
            config.message_value = parse_tokens(ENV_MESSAGE_VALUE, value)?;
        }
        if let Some(value) = lookup(ENV_FORWARD_AMOUNT) {
            config.forward_amount = parse_tokens(ENV_FORWARD_AMOUNT, value)?;
        }

        Ok(config)
    }
}

/// Rejects a basis-point `value` above [`MAX_BASIS_POINTS`].
///
/// # Errors
///
/// `BasisPointsOutOfRange` naming `field`.
pub fn check_basis_points(field: &'static str, value: u16) -> Result<(), ConfigError> {
    if value > MAX_BASIS_POINTS {
        return Err(ConfigError::BasisPointsOutOfRange { field, value });
    }
    Ok(())
}

fn parse_tokens(name: &'static str, value: String) -> Result<Amount, ConfigError> {
    Amount::from_tokens(&value).map_err(|_| ConfigError::InvalidEnv { name, value })
}

// =============================================================================
// ISSUER CONFIG
// =============================================================================

/// Initial parameters of a new issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    /// Administrator.
    pub owner: Address,
    /// Token metadata cell.
    pub content: Cell,
    /// Code of the per-holder account program.
    pub account_code: Cell,
    /// Transfer burn rate in basis points.
    pub burn_rate: u16,
    /// Staking APR in basis points.
    pub staking_apr: u16,
    /// Tokens reserved for farming rewards.
    pub farming_pool_size: Amount,
    /// Start suspended.
    pub paused: bool,
    /// Initial blacklist dictionary root.
    pub blacklist: Cell,
}

impl IssuerConfig {
    /// Standard launch parameters: 1% burn, 10% APR, a farming pool of one
    /// million tokens, running, empty blacklist.
    #[must_use]
    pub fn new(owner: Address, content: Cell, account_code: Cell) -> Self {
        Self {
            owner,
            content,
            account_code,
            burn_rate: 100,
            staking_apr: 1000,
            farming_pool_size: Amount::from_whole_tokens(1_000_000),
            paused: false,
            blacklist: Cell::empty(),
        }
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    ///
    /// `BasisPointsOutOfRange` if the burn rate or APR exceeds 10000.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_basis_points("burn_rate", self.burn_rate)?;
        check_basis_points("staking_apr", self.staking_apr)
    }

    /// Initial issuer data with zero supply.
    #[must_use]
    pub fn initial_state(&self) -> IssuerState {
        IssuerState {
            total_supply: Amount::ZERO,
            owner: self.owner,
            content: self.content.clone(),
            account_code: self.account_code.clone(),
            burn_rate: self.burn_rate,
            staking_apr: self.staking_apr,
            farming_pool_size: self.farming_pool_size,
            paused: self.paused,
            blacklist: self.blacklist.clone(),
        }
    }
}
