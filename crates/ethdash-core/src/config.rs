//! Runtime configuration and shared constants.
//!
//! [`AppConfig`] is parsed from TOML; every field has a default so a
//! partial file is valid.

use alloy_primitives::Address;
use serde::Deserialize;

use crate::error::ConfigError;

/// localStorage key holding the last connected address.
pub const CACHED_ADDRESS_KEY: &str = "currentAddress";

/// Default connect countdown in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u32 = 30;

/// Default number of decimals shown for balances.
pub const DEFAULT_BALANCE_PRECISION: usize = 4;

/// Countdown tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u32 = 1000;

/// Which revision of the home screen to render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenMode {
    /// Connect, balance and network only.
    #[default]
    Balance,
    /// Balance plus the contract panel.
    Contract,
}

/// Contract interaction settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub address: Option<Address>,
    /// Delay between receipt polls in milliseconds.
    pub receipt_poll_ms: u32,
    /// Polls before a submitted transaction is reported as failed.
    pub receipt_max_polls: u32,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: None,
            receipt_poll_ms: 1500,
            receipt_max_polls: 40,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: ScreenMode,
    pub connect_timeout_secs: u32,
    pub balance_precision: usize,
    pub contract: ContractConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: ScreenMode::default(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            balance_precision: DEFAULT_BALANCE_PRECISION,
            contract: ContractConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Contract address to use, if contract mode is on and one is configured.
    pub fn contract_address(&self) -> Option<Address> {
        match self.mode {
            ScreenMode::Contract => self.contract.address,
            ScreenMode::Balance => None,
        }
    }
}
