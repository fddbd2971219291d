//! Calls against the one fixed contract.
//!
//! The contract exposes a WETH-style interface, declared below with `sol!`:
//! `totalSupply()`, payable `deposit()`, `withdraw(uint256)` and
//! `transfer(address,uint256)`.
//!
//! Every write is reported through a status callback as
//! [`TxStatus::Submitted`] followed by either [`TxStatus::Confirmed`] or
//! [`TxStatus::Failed`]. Nothing is retried.

use std::fmt;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, sol};

use crate::account::parse_address;
use crate::config::ContractConfig;
use crate::error::WalletError;
use crate::provider::{
    TransactionReceipt, TransactionRequest, WalletProvider, call, send_transaction,
    transaction_receipt,
};
use crate::units::{ensure_affordable, parse_amount, to_quantity};

sol! {
    /// Interface of the configured contract.
    interface Weth {
        function totalSupply() external view returns (uint256);
        function deposit() external payable;
        function withdraw(uint256 wad) external;
        function transfer(address dst, uint256 wad) external returns (bool);
    }
}

/// Hex calldata for `call`.
fn calldata<C: SolCall>(call: &C) -> String {
    format!("0x{}", hex::encode(call.abi_encode()))
}

/// Decode a hex `eth_call` result as the return value of `C`.
fn decode_returns<C: SolCall>(raw: &str) -> Result<C::Return, WalletError> {
    let bytes = hex::decode(raw.trim_start_matches("0x"))
        .map_err(|e| WalletError::InvalidResponse(format!("bad call result: {e}")))?;
    C::abi_decode_returns(&bytes)
        .map_err(|e| WalletError::InvalidResponse(format!("bad call result: {e}")))
}

// =============================================================================
// Status reporting
// =============================================================================

/// Write operations offered by the facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractOp {
    Deposit,
    Withdraw,
    Transfer,
}

impl fmt::Display for ContractOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "Deposit"),
            Self::Withdraw => write!(f, "Withdraw"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

/// Progress of the latest write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TxStatus {
    #[default]
    Idle,
    Submitted {
        op: ContractOp,
    },
    Confirmed {
        op: ContractOp,
        tx_hash: String,
    },
    Failed {
        op: ContractOp,
        message: String,
    },
}

impl TxStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }

    /// Status line for the screen.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Submitted { op } => Some(format!("{op}: submitted, waiting for confirmation...")),
            Self::Confirmed { op, tx_hash } => Some(format!("{op}: confirmed ({tx_hash})")),
            Self::Failed { op, message } => Some(format!("{op}: failed. {message}")),
        }
    }
}

// =============================================================================
// Input validation
// =============================================================================

/// Validate a deposit amount against the known balance.
pub fn prepare_deposit(amount: &str, balance: Option<U256>) -> Result<U256, WalletError> {
    let wei = parse_amount(amount)?;
    ensure_affordable(wei, balance)?;
    Ok(wei)
}

/// Validate a withdraw amount.
pub fn prepare_withdraw(amount: &str) -> Result<U256, WalletError> {
    parse_amount(amount)
}

/// Validate a transfer's recipient and amount.
pub fn prepare_transfer(recipient: &str, amount: &str) -> Result<(Address, U256), WalletError> {
    let to = parse_address(recipient)
        .map_err(|_| WalletError::InvalidRecipient(recipient.trim().to_string()))?;
    if to == Address::ZERO {
        return Err(WalletError::InvalidRecipient(
            "the zero address cannot receive tokens".to_string(),
        ));
    }
    Ok((to, parse_amount(amount)?))
}

// =============================================================================
// Facade
// =============================================================================

/// How a submitted transaction is watched until it is mined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiptPolling {
    /// Delay between polls; zero polls back to back.
    pub interval_ms: u32,
    pub max_polls: u32,
}

impl From<&ContractConfig> for ReceiptPolling {
    fn from(config: &ContractConfig) -> Self {
        Self {
            interval_ms: config.receipt_poll_ms,
            max_polls: config.receipt_max_polls.max(1),
        }
    }
}

/// The fixed contract, bound to a provider.
pub struct ContractFacade<'a, P: ?Sized> {
    provider: &'a P,
    contract: Address,
    polling: ReceiptPolling,
}

impl<'a, P: WalletProvider + ?Sized> ContractFacade<'a, P> {
    pub fn new(provider: &'a P, contract: Address, polling: ReceiptPolling) -> Self {
        Self {
            provider,
            contract,
            polling,
        }
    }

    fn request(&self, from: Option<Address>, value: Option<U256>, data: String) -> TransactionRequest {
        TransactionRequest {
            from,
            to: self.contract,
            value: value.map(to_quantity),
            data: Some(data),
        }
    }

    /// `totalSupply()`.
    pub async fn total_supply(&self) -> Result<U256, WalletError> {
        let tx = self.request(None, None, calldata(&Weth::totalSupplyCall {}));
        let raw = call(self.provider, &tx)
            .await
            .map_err(|e| WalletError::ContractCallFailed(e.provider_message()))?;
        decode_returns::<Weth::totalSupplyCall>(&raw)
    }

    /// Dry-run `transfer(to, amount)` from `from` without sending it.
    pub async fn query_transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, WalletError> {
        let data = calldata(&Weth::transferCall { dst: to, wad: amount });
        let tx = self.request(Some(from), None, data);
        let raw = call(self.provider, &tx)
            .await
            .map_err(|e| WalletError::ContractCallFailed(e.provider_message()))?;
        decode_returns::<Weth::transferCall>(&raw)
    }

    /// Payable `deposit()` carrying `amount` wei.
    pub async fn deposit(
        &self,
        from: Address,
        amount: U256,
        on_status: impl Fn(TxStatus),
    ) -> Result<String, WalletError> {
        let tx = self.request(Some(from), Some(amount), calldata(&Weth::depositCall {}));
        self.submit(ContractOp::Deposit, tx, on_status).await
    }

    /// `withdraw(amount)`.
    pub async fn withdraw(
        &self,
        from: Address,
        amount: U256,
        on_status: impl Fn(TxStatus),
    ) -> Result<String, WalletError> {
        let data = calldata(&Weth::withdrawCall { wad: amount });
        let tx = self.request(Some(from), None, data);
        self.submit(ContractOp::Withdraw, tx, on_status).await
    }

    /// `transfer(to, amount)`.
    pub async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        on_status: impl Fn(TxStatus),
    ) -> Result<String, WalletError> {
        let data = calldata(&Weth::transferCall { dst: to, wad: amount });
        let tx = self.request(Some(from), None, data);
        self.submit(ContractOp::Transfer, tx, on_status).await
    }

    async fn submit(
        &self,
        op: ContractOp,
        tx: TransactionRequest,
        on_status: impl Fn(TxStatus),
    ) -> Result<String, WalletError> {
        on_status(TxStatus::Submitted { op });

        let outcome = match send_transaction(self.provider, &tx).await {
            Ok(tx_hash) => self.wait_for_receipt(&tx_hash).await.map(|_| tx_hash),
            Err(e) => Err(WalletError::ContractCallFailed(e.provider_message())),
        };

        match &outcome {
            Ok(tx_hash) => on_status(TxStatus::Confirmed {
                op,
                tx_hash: tx_hash.clone(),
            }),
            Err(e) => on_status(TxStatus::Failed {
                op,
                message: e.to_string(),
            }),
        }
        outcome
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, WalletError> {
        for _ in 0..self.polling.max_polls {
            let receipt = transaction_receipt(self.provider, tx_hash)
                .await
                .map_err(|e| WalletError::ContractCallFailed(e.provider_message()))?;
            match receipt {
                Some(receipt) if receipt.succeeded() => return Ok(receipt),
                Some(_) => {
                    return Err(WalletError::ContractCallFailed(format!(
                        "transaction {tx_hash} reverted"
                    )));
                }
                None if self.polling.interval_ms > 0 => {
                    gloo_timers::future::TimeoutFuture::new(self.polling.interval_ms).await;
                }
                None => {}
            }
        }
        Err(WalletError::ContractCallFailed(format!(
            "transaction {tx_hash} not confirmed after {} checks",
            self.polling.max_polls
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::{Value, json};

    use super::*;
    use crate::mock::MockProvider;

    const CONTRACT: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    fn facade(provider: &MockProvider) -> ContractFacade<'_, MockProvider> {
        ContractFacade::new(
            provider,
            parse_address(CONTRACT).unwrap(),
            ReceiptPolling {
                interval_ms: 0,
                max_polls: 3,
            },
        )
    }

    fn sender() -> Address {
        Address::repeat_byte(0x11)
    }

    fn word(value: u64) -> String {
        format!("0x{}", hex::encode(U256::from(value).to_be_bytes::<32>()))
    }

    fn mined(status: &str) -> Value {
        json!({ "transactionHash": TX_HASH, "status": status })
    }

    #[test]
    fn test_selectors() {
        assert_eq!(hex::encode(Weth::totalSupplyCall::SELECTOR), "18160ddd");
        assert_eq!(hex::encode(Weth::depositCall::SELECTOR), "d0e30db0");
        assert_eq!(hex::encode(Weth::withdrawCall::SELECTOR), "2e1a7d4d");
        assert_eq!(hex::encode(Weth::transferCall::SELECTOR), "a9059cbb");
    }

    #[test]
    fn test_encode_transfer() {
        let data = calldata(&Weth::transferCall {
            dst: Address::repeat_byte(0xab),
            wad: U256::from(1u8),
        });
        assert_eq!(data.len(), 2 + 2 * (4 + 64));
        assert!(data.starts_with("0xa9059cbb000000000000000000000000abab"));
        assert!(data.ends_with("01"));
    }

    #[test]
    fn test_decode_returns() {
        assert_eq!(
            decode_returns::<Weth::totalSupplyCall>(&word(42)).unwrap(),
            U256::from(42u8)
        );
        assert!(decode_returns::<Weth::transferCall>(&word(1)).unwrap());
        assert!(decode_returns::<Weth::totalSupplyCall>("0x01").is_err());
        assert!(decode_returns::<Weth::totalSupplyCall>("0xzz").is_err());
    }

    #[test]
    fn test_prepare_deposit() {
        let one = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(prepare_deposit("1", Some(one)).unwrap(), one);
        assert_eq!(
            prepare_deposit("2", Some(one)),
            Err(WalletError::InsufficientBalance)
        );
        assert!(matches!(
            prepare_deposit("12abc", None),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_prepare_transfer() {
        let (to, amount) = prepare_transfer(CONTRACT, "0.5").unwrap();
        assert_eq!(to, parse_address(CONTRACT).unwrap());
        assert_eq!(amount, U256::from(500_000_000_000_000_000u64));

        assert!(matches!(
            prepare_transfer("bob", "1"),
            Err(WalletError::InvalidRecipient(_))
        ));
        assert!(matches!(
            prepare_transfer("0x0000000000000000000000000000000000000000", "1"),
            Err(WalletError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(TxStatus::Idle.text(), None);
        assert_eq!(
            TxStatus::Failed {
                op: ContractOp::Withdraw,
                message: "execution reverted".to_string()
            }
            .text()
            .unwrap(),
            "Withdraw: failed. execution reverted"
        );
    }

    #[tokio::test]
    async fn test_total_supply() {
        let provider = MockProvider::new();
        provider.respond("eth_call", json!(word(1000)));

        let supply = facade(&provider).total_supply().await.unwrap();
        assert_eq!(supply, U256::from(1000u16));

        let (_, params) = provider.last_call("eth_call").unwrap();
        assert_eq!(params[0]["data"], "0x18160ddd");
        assert_eq!(params[1], "latest");
    }

    #[tokio::test]
    async fn test_query_transfer() {
        let provider = MockProvider::new();
        provider.respond("eth_call", json!(word(1)));

        let ok = facade(&provider)
            .query_transfer(sender(), Address::repeat_byte(0x22), U256::from(5u8))
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(provider.call_count("eth_sendTransaction"), 0);
    }

    #[tokio::test]
    async fn test_deposit_confirmed() {
        let provider = MockProvider::new();
        provider.respond("eth_sendTransaction", json!(TX_HASH));
        provider.respond_once("eth_getTransactionReceipt", Ok(Value::Null));
        provider.respond("eth_getTransactionReceipt", mined("0x1"));

        let statuses = RefCell::new(Vec::new());
        let amount = U256::from(1_500_000_000_000_000_000u64);
        let hash = facade(&provider)
            .deposit(sender(), amount, |s| statuses.borrow_mut().push(s))
            .await
            .unwrap();

        assert_eq!(hash, TX_HASH);
        assert_eq!(
            statuses.into_inner(),
            vec![
                TxStatus::Submitted {
                    op: ContractOp::Deposit
                },
                TxStatus::Confirmed {
                    op: ContractOp::Deposit,
                    tx_hash: TX_HASH.to_string()
                },
            ]
        );

        let (_, params) = provider.last_call("eth_sendTransaction").unwrap();
        assert_eq!(params[0]["value"], "0x14d1120d7b160000");
        assert_eq!(params[0]["data"], "0xd0e30db0");
        assert_eq!(provider.call_count("eth_getTransactionReceipt"), 2);
    }

    #[tokio::test]
    async fn test_rejected_transaction_surfaces_message() {
        let provider = MockProvider::new();
        provider.fail(
            "eth_sendTransaction",
            WalletError::from_rpc(
                Some(4001),
                "MetaMask Tx Signature: User denied transaction signature.",
            ),
        );

        let statuses = RefCell::new(Vec::new());
        let err = facade(&provider)
            .withdraw(sender(), U256::from(1u8), |s| statuses.borrow_mut().push(s))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "MetaMask Tx Signature: User denied transaction signature."
        );
        assert_eq!(
            statuses.into_inner().last(),
            Some(&TxStatus::Failed {
                op: ContractOp::Withdraw,
                message: "MetaMask Tx Signature: User denied transaction signature."
                    .to_string()
            })
        );
        assert_eq!(provider.call_count("eth_getTransactionReceipt"), 0);
    }

    #[tokio::test]
    async fn test_reverted_transfer() {
        let provider = MockProvider::new();
        provider.respond("eth_sendTransaction", json!(TX_HASH));
        provider.respond("eth_getTransactionReceipt", mined("0x0"));

        let result = facade(&provider)
            .transfer(sender(), Address::repeat_byte(0x22), U256::from(1u8), |_| {})
            .await;
        assert!(matches!(result, Err(WalletError::ContractCallFailed(_))));
    }

    #[tokio::test]
    async fn test_unconfirmed_after_max_polls() {
        let provider = MockProvider::new();
        provider.respond("eth_sendTransaction", json!(TX_HASH));
        provider.respond("eth_getTransactionReceipt", Value::Null);

        let result = facade(&provider)
            .deposit(sender(), U256::from(1u8), |_| {})
            .await;
        assert!(matches!(result, Err(WalletError::ContractCallFailed(_))));
        assert_eq!(provider.call_count("eth_getTransactionReceipt"), 3);
    }
}
