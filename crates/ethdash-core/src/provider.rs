//! Wallet provider abstraction and the gateway calls built on it.
//!
//! [`WalletProvider`] is the seam between the application and an
//! EIP-1193 provider: the browser implementation lives in
//! [`crate::eip1193`], tests use [`crate::mock`]. Everything else in this
//! module is written against the trait.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::account::parse_address;
use crate::error::WalletError;
use crate::network::parse_chain_id;
use crate::units::parse_quantity;

// =============================================================================
// Events and subscriptions
// =============================================================================

/// Provider events the screen reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
}

impl ProviderEventKind {
    /// EIP-1193 event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountsChanged => "accountsChanged",
            Self::ChainChanged => "chainChanged",
        }
    }
}

/// A decoded provider event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Raw account strings, first entry is the active account.
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            Self::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            Self::ChainChanged(_) => ProviderEventKind::ChainChanged,
        }
    }
}

pub type EventHandler = Box<dyn Fn(ProviderEvent)>;

/// A registered provider listener.
///
/// The listener is removed when the subscription is dropped or
/// [`unsubscribe`](Self::unsubscribe) is called, whichever comes first.
/// Removal runs at most once.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Provider trait
// =============================================================================

/// An EIP-1193 wallet provider.
///
/// Futures are not `Send`: the provider lives on the browser's single
/// event-loop thread.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Whether a wallet is present right now.
    fn is_available(&self) -> bool;

    /// `provider.request({ method, params })`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;

    /// Register `handler` for `kind` events.
    fn on(&self, kind: ProviderEventKind, handler: EventHandler)
    -> Result<Subscription, WalletError>;
}

// =============================================================================
// Gateway calls
// =============================================================================

/// Call parameters for `eth_call` / `eth_sendTransaction`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// The fields of a transaction receipt we care about.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    /// Post-Byzantium status flag; `0x1` means the transaction succeeded.
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("0x1")
    }
}

fn ensure_available<P: WalletProvider + ?Sized>(provider: &P) -> Result<(), WalletError> {
    if provider.is_available() {
        Ok(())
    } else {
        Err(WalletError::ProviderUnavailable)
    }
}

fn expect_str(value: &Value) -> Result<&str, WalletError> {
    value
        .as_str()
        .ok_or_else(|| WalletError::InvalidResponse(format!("expected a string, got {value}")))
}

/// Decode an account list response.
pub fn parse_accounts(value: &Value) -> Result<Vec<Address>, WalletError> {
    let list = value
        .as_array()
        .ok_or_else(|| WalletError::InvalidResponse(format!("expected an array, got {value}")))?;
    list.iter()
        .map(|entry| expect_str(entry).and_then(parse_address))
        .collect()
}

/// Request wallet connection (shows the wallet's permission prompt).
pub async fn request_accounts<P: WalletProvider + ?Sized>(
    provider: &P,
) -> Result<Vec<Address>, WalletError> {
    ensure_available(provider)?;
    let result = provider.request("eth_requestAccounts", json!([])).await?;
    parse_accounts(&result)
}

/// Currently authorized accounts (no prompt).
pub async fn accounts<P: WalletProvider + ?Sized>(
    provider: &P,
) -> Result<Vec<Address>, WalletError> {
    ensure_available(provider)?;
    let result = provider.request("eth_accounts", json!([])).await?;
    parse_accounts(&result)
}

/// Current chain ID.
pub async fn chain_id<P: WalletProvider + ?Sized>(provider: &P) -> Result<u64, WalletError> {
    ensure_available(provider)?;
    let result = provider.request("eth_chainId", json!([])).await?;
    let raw = expect_str(&result)?;
    parse_chain_id(raw).ok_or_else(|| WalletError::InvalidResponse(format!("bad chain id {raw}")))
}

/// Native balance of `address` in wei at the latest block.
pub async fn get_balance<P: WalletProvider + ?Sized>(
    provider: &P,
    address: Address,
) -> Result<U256, WalletError> {
    ensure_available(provider)?;
    let result = provider
        .request("eth_getBalance", json!([address, "latest"]))
        .await?;
    parse_quantity(expect_str(&result)?)
}

/// `eth_call` against the latest block, returning the raw hex result.
pub async fn call<P: WalletProvider + ?Sized>(
    provider: &P,
    tx: &TransactionRequest,
) -> Result<String, WalletError> {
    ensure_available(provider)?;
    let result = provider.request("eth_call", json!([tx, "latest"])).await?;
    expect_str(&result).map(str::to_string)
}

/// Hand a transaction to the wallet for signing; returns the transaction hash.
pub async fn send_transaction<P: WalletProvider + ?Sized>(
    provider: &P,
    tx: &TransactionRequest,
) -> Result<String, WalletError> {
    ensure_available(provider)?;
    let result = provider.request("eth_sendTransaction", json!([tx])).await?;
    expect_str(&result).map(str::to_string)
}

/// Receipt of a mined transaction, `None` while it is still pending.
pub async fn transaction_receipt<P: WalletProvider + ?Sized>(
    provider: &P,
    tx_hash: &str,
) -> Result<Option<TransactionReceipt>, WalletError> {
    ensure_available(provider)?;
    let result = provider
        .request("eth_getTransactionReceipt", json!([tx_hash]))
        .await?;
    if result.is_null() {
        return Ok(None);
    }
    serde_json::from_value(result)
        .map(Some)
        .map_err(|e| WalletError::InvalidResponse(e.to_string()))
}
