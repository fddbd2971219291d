//! Wallet connection logic for the ethdash front-end.
//!
//! This crate provides:
//! - [`ConnectionMachine`] - the connect / countdown / account-change lifecycle
//! - [`WalletProvider`] - the provider seam, with [`Eip1193Provider`] for browsers
//! - [`BalanceReader`] and [`resolve_network_name`] - derived display state
//! - [`ContractFacade`] - calls against the one fixed contract
//! - [`AddressCache`] - the cached-address entry in localStorage
//! - [`AppConfig`] - runtime configuration

pub mod account;
pub mod balance;
pub mod config;
pub mod contract;
pub mod eip1193;
pub mod error;
pub mod machine;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod network;
pub mod provider;
pub mod session;
pub mod units;

pub use account::{AccountView, RefreshOutcome, RefreshSequence};
pub use balance::BalanceReader;
pub use config::{AppConfig, ScreenMode};
pub use contract::{ContractFacade, ContractOp, ReceiptPolling, TxStatus};
pub use eip1193::Eip1193Provider;
pub use error::{ConfigError, StorageError, WalletError};
pub use machine::{ConnectionMachine, ConnectionState, Effect, Event};
pub use network::{NetworkInfo, resolve_network_name};
pub use provider::{ProviderEvent, ProviderEventKind, Subscription, WalletProvider};
pub use session::{AddressCache, KeyValueStore, LocalStore};
