//! Error types for wallet, storage and configuration operations.
//!
//! - [`WalletError`] - provider, connection and contract failures
//! - [`StorageError`] - localStorage operations for the cached address
//! - [`ConfigError`] - application configuration parsing

use thiserror::Error;

/// EIP-1193 error code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Wallet-related errors for EIP-1193 provider integration.
///
/// Provider messages are carried verbatim so the screen can show exactly
/// what the wallet reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Browser window not available
    #[error("Browser window not available")]
    NoWindow,
    /// No injected wallet on the page
    #[error("Not connected to a Web3 wallet. Please install and enable MetaMask.")]
    ProviderUnavailable,
    /// Failed to build a request against the provider object
    #[error("Failed to create wallet request")]
    RequestCreationFailed,
    /// User declined the request in the wallet
    #[error("{0}")]
    UserRejected(String),
    /// Any other provider or RPC failure
    #[error("{message}")]
    ProviderError { code: Option<i64>, message: String },
    /// Provider resolved with an empty account list
    #[error("No account returned from wallet")]
    NoAccount,
    /// Countdown elapsed before the wallet answered
    #[error("Connect time expired. Please connect again.")]
    ConnectionExpired,
    /// Provider answered with something we could not decode
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    /// Contract transaction or call failed
    #[error("{0}")]
    ContractCallFailed(String),
    /// User-typed amount could not be used as a transaction value
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// Recipient is not a valid address
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
    /// Amount is larger than the connected account's balance
    #[error("Amount exceeds available balance")]
    InsufficientBalance,
}

impl WalletError {
    /// Build an error from a JSON-RPC style `{ code, message }` rejection.
    pub fn from_rpc(code: Option<i64>, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            Some(USER_REJECTED_CODE) => Self::UserRejected(message),
            _ => Self::ProviderError { code, message },
        }
    }

    /// The message a contract failure should surface: the provider's own text
    /// when there is one, otherwise this error's display form.
    pub fn provider_message(&self) -> String {
        match self {
            Self::UserRejected(message)
            | Self::ProviderError { message, .. }
            | Self::ContractCallFailed(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Storage errors for the cached-address entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("localStorage not available")]
    Unavailable,
    #[error("failed to save to localStorage")]
    WriteFailed,
    #[error("failed to remove from localStorage")]
    RemoveFailed,
}

/// Configuration parsing errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
