use ethers::types::U256;
use ethers::utils::format_ether;

const BALANCE_DECIMALS: usize = 5;

/// Truncates (never rounds) a decimal balance string to five fractional digits.
/// A value without a fractional part gets `.0000`.
pub fn format_balance(balance: &str) -> String {
    let mut parts = balance.split('.');
    let integer = parts.next().unwrap_or_default();
    let decimals: String = match parts.next() {
        Some(d) if !d.is_empty() => d.chars().take(BALANCE_DECIMALS).collect(),
        _ => "0000".to_string(),
    };
    format!("{integer}.{decimals}")
}

/// `0x1234...abcd` for a well-formed 20-byte hex address, otherwise empty.
pub fn truncate_address(address: Option<&str>) -> String {
    match address {
        Some(a) if is_hex_address(a) => format!("{}...{}", &a[..6], &a[a.len() - 4..]),
        _ => String::new(),
    }
}

fn is_hex_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Display form of a native balance given in wei, e.g. `1.23456`.
pub fn format_native_balance(wei: U256) -> String {
    format_balance(&format_ether(wei))
}
