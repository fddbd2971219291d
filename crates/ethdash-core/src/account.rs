//! Connected-account helpers and the derived display state for an address.

use alloy_primitives::{Address, U256};

use crate::error::WalletError;
use crate::network::NetworkInfo;

/// Ethereum address display constants.
pub mod display {
    /// Full length of a 0x-prefixed address.
    pub const FULL_LEN: usize = 42;
    /// Characters kept at the front ("0x1234").
    pub const PREFIX_LEN: usize = 6;
    /// Start of the kept suffix ("5678").
    pub const SUFFIX_START: usize = 38;
}

/// Parse an address string reported by the provider.
pub fn parse_address(raw: &str) -> Result<Address, WalletError> {
    raw.trim()
        .parse()
        .map_err(|e| WalletError::InvalidResponse(format!("bad address {raw}: {e}")))
}

/// Parse every address in a provider account list, keeping order.
pub fn parse_addresses<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Address>, WalletError> {
    raw.iter().map(|s| parse_address(s.as_ref())).collect()
}

/// EIP-55 checksummed form of an address.
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}

/// Format an address for display (0x1234...5678).
pub fn short_address(address: &Address) -> String {
    let full = checksummed(address);
    if full.len() >= display::FULL_LEN {
        format!(
            "{}...{}",
            &full[..display::PREFIX_LEN],
            &full[display::SUFFIX_START..]
        )
    } else {
        full
    }
}

/// Result of one balance/network refresh for an address.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshOutcome {
    pub balance: Result<U256, WalletError>,
    pub network: Result<NetworkInfo, WalletError>,
}

/// Balance and network shown next to the connected address.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountView {
    pub address: Option<Address>,
    pub balance_wei: Option<U256>,
    pub balance: Option<String>,
    pub network: Option<NetworkInfo>,
}

impl AccountView {
    /// Merge a refresh into the view.
    ///
    /// A failed half of the refresh leaves the previous value in place. A
    /// balance belonging to a different address is dropped first. Returns
    /// the errors of the failed halves so the caller can log them.
    pub fn merge(
        &mut self,
        address: Address,
        outcome: RefreshOutcome,
        precision: usize,
    ) -> Vec<WalletError> {
        if self.address != Some(address) {
            self.address = Some(address);
            self.balance_wei = None;
            self.balance = None;
        }

        let mut errors = Vec::new();
        match outcome.balance {
            Ok(wei) => {
                self.balance_wei = Some(wei);
                self.balance = Some(crate::units::format_ether(wei, precision));
            }
            Err(e) => errors.push(e),
        }
        match outcome.network {
            Ok(network) => self.network = Some(network),
            Err(e) => errors.push(e),
        }
        errors
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Orders overlapping refreshes.
///
/// Each refresh takes a ticket when it starts; only the holder of the latest
/// ticket may merge its outcome into the [`AccountView`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSequence {
    latest: u64,
}

impl RefreshSequence {
    /// Start a refresh, superseding every one started before it.
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
    const OTHER: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

    fn ok_outcome(wei: u64, chain_id: u64) -> RefreshOutcome {
        RefreshOutcome {
            balance: Ok(U256::from(wei)),
            network: Ok(NetworkInfo::from_chain_id(chain_id)),
        }
    }

    #[test]
    fn test_parse_address() {
        let address = parse_address(ADDR).unwrap();
        assert_eq!(
            checksummed(&address),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn test_parse_addresses_keeps_order() {
        let parsed = parse_addresses(&[OTHER, ADDR]).unwrap();
        assert_eq!(parsed[0], parse_address(OTHER).unwrap());
        assert_eq!(parsed[1], parse_address(ADDR).unwrap());
    }

    #[test]
    fn test_short_address() {
        let address = parse_address(ADDR).unwrap();
        assert_eq!(short_address(&address), "0x5aAe...eAed");
    }

    #[test]
    fn test_merge_success() {
        let address = parse_address(ADDR).unwrap();
        let mut view = AccountView::default();
        let errors = view.merge(address, ok_outcome(1_500_000_000_000_000_000, 1), 4);
        assert!(errors.is_empty());
        assert_eq!(view.balance.as_deref(), Some("1.5"));
        assert_eq!(view.network.map(|n| n.name), Some("Mainnet"));
    }

    #[test]
    fn test_failed_refresh_keeps_previous_values() {
        let address = parse_address(ADDR).unwrap();
        let mut view = AccountView::default();
        view.merge(address, ok_outcome(2_000_000_000_000_000_000, 5), 4);

        let errors = view.merge(
            address,
            RefreshOutcome {
                balance: Err(WalletError::from_rpc(Some(-32603), "internal error")),
                network: Err(WalletError::from_rpc(Some(-32603), "internal error")),
            },
            4,
        );

        assert_eq!(errors.len(), 2);
        assert_eq!(view.balance.as_deref(), Some("2"));
        assert_eq!(view.network.map(|n| n.name), Some("Goerli"));
    }

    #[test]
    fn test_new_address_drops_old_balance() {
        let first = parse_address(ADDR).unwrap();
        let second = parse_address(OTHER).unwrap();
        let mut view = AccountView::default();
        view.merge(first, ok_outcome(1_000_000_000_000_000_000, 1), 4);

        view.merge(
            second,
            RefreshOutcome {
                balance: Err(WalletError::from_rpc(None, "timeout")),
                network: Ok(NetworkInfo::from_chain_id(1)),
            },
            4,
        );

        assert_eq!(view.address, Some(second));
        assert_eq!(view.balance, None);
        assert_eq!(view.balance_wei, None);
    }

    #[test]
    fn test_only_latest_refresh_is_current() {
        let mut sequence = RefreshSequence::default();
        let first = sequence.begin();
        let second = sequence.begin();

        assert!(!sequence.is_current(first));
        assert!(sequence.is_current(second));
        assert!(sequence.is_current(second));
    }
}
