//! Fixed-point conversion between wei and ether display strings.

use alloy_primitives::U256;
use alloy_primitives::utils::parse_ether;

use crate::error::WalletError;

/// Decimal places of the native token.
pub const ETHER_DECIMALS: usize = 18;

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Format a wei amount as ether, rounded half-up to `precision` decimals
/// with trailing zeros trimmed.
///
/// `1_500_000_000_000_000_000` wei formats as `"1.5"`.
pub fn format_ether(wei: U256, precision: usize) -> String {
    let precision = precision.min(ETHER_DECIMALS);
    let base = U256::from(WEI_PER_ETHER);

    let mut whole = wei / base;
    let fraction = wei % base;

    let scale = U256::from(10u64.pow((ETHER_DECIMALS - precision) as u32));
    let mut kept = fraction / scale;
    let remainder = fraction % scale;
    if remainder * U256::from(2u8) >= scale && scale > U256::from(1u8) {
        kept += U256::from(1u8);
    }

    // Rounding may carry into the whole part (0.99999 -> 1.0000)
    let limit = U256::from(10u64.pow(precision as u32));
    if kept >= limit {
        whole += U256::from(1u8);
        kept -= limit;
    }

    if kept.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", kept.to_string(), width = precision);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse a JSON-RPC hex quantity ("0x1bc16d674ec80000") into a `U256`.
pub fn parse_quantity(raw: &str) -> Result<U256, WalletError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| WalletError::InvalidResponse(format!("not a hex quantity: {raw}")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| WalletError::InvalidResponse(format!("bad quantity {raw}: {e}")))
}

/// Encode a `U256` as a JSON-RPC hex quantity.
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

/// Parse a user-typed ether amount ("0.25") into wei.
///
/// Rejects empty, negative, malformed and zero amounts.
pub fn parse_amount(input: &str) -> Result<U256, WalletError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(WalletError::InvalidAmount("amount is required".to_string()));
    }
    if input.starts_with('-') {
        return Err(WalletError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }

    let wei = parse_ether(input).map_err(|e| WalletError::InvalidAmount(e.to_string()))?;
    if wei.is_zero() {
        return Err(WalletError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(wei)
}

/// Check that `amount` fits in a known balance.
///
/// An unknown balance is not treated as insufficient; the wallet will
/// reject an unaffordable transaction on its own.
pub fn ensure_affordable(amount: U256, balance: Option<U256>) -> Result<(), WalletError> {
    match balance {
        Some(balance) if amount > balance => Err(WalletError::InsufficientBalance),
        _ => Ok(()),
    }
}
