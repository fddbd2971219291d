//! Balance and network reads for the connected address.

use alloy_primitives::{Address, U256};

use crate::account::RefreshOutcome;
use crate::error::WalletError;
use crate::network::NetworkInfo;
use crate::provider::{WalletProvider, chain_id, get_balance};
use crate::units::format_ether;

/// Reads native balances through a provider.
pub struct BalanceReader<'a, P: ?Sized> {
    provider: &'a P,
    precision: usize,
}

impl<'a, P: WalletProvider + ?Sized> BalanceReader<'a, P> {
    pub fn new(provider: &'a P, precision: usize) -> Self {
        Self {
            provider,
            precision,
        }
    }

    pub async fn read_wei(&self, address: Address) -> Result<U256, WalletError> {
        get_balance(self.provider, address).await
    }

    /// Balance of `address` formatted in ether.
    pub async fn read(&self, address: Address) -> Result<String, WalletError> {
        let wei = self.read_wei(address).await?;
        Ok(format_ether(wei, self.precision))
    }

    pub async fn network(&self) -> Result<NetworkInfo, WalletError> {
        chain_id(self.provider).await.map(NetworkInfo::from_chain_id)
    }

    /// Fetch balance and network together; each half may fail on its own.
    pub async fn refresh(&self, address: Address) -> RefreshOutcome {
        let balance = self.read_wei(address).await;
        let network = self.network().await;
        RefreshOutcome { balance, network }
    }
}
