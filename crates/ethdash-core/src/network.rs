//! Chain id to network name lookup.

/// Name shown for chain ids missing from the table.
pub const UNKNOWN_NETWORK: &str = "Unknown";

/// Convert chain ID to network name.
pub fn resolve_network_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "Mainnet",
        3 => "Ropsten",
        4 => "Rinkeby",
        5 => "Goerli",
        42 => "Kovan",
        17000 => "Holesky",
        11155111 => "Sepolia",
        _ => UNKNOWN_NETWORK,
    }
}

/// Parse a chain id as reported by a provider.
///
/// `eth_chainId` and `chainChanged` report hex quantities ("0x1"), while
/// `net_version` reports decimal strings ("1"). Both are accepted.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// A chain id together with its display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: &'static str,
}

impl NetworkInfo {
    pub fn from_chain_id(chain_id: u64) -> Self {
        Self {
            chain_id,
            name: resolve_network_name(chain_id),
        }
    }

    pub fn is_known(&self) -> bool {
        self.name != UNKNOWN_NETWORK
    }
}
