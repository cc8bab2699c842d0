use serde::Serialize;

/// Static catalog entry for a token the dashboard can analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    /// CoinGecko's canonical id, e.g. `bitcoin`.
    pub provider_id: &'static str,
    pub symbol: &'static str,
    pub display_name: &'static str,
}

const SUPPORTED_TOKENS: [TokenInfo; 6] = [
    TokenInfo {
        provider_id: "bitcoin",
        symbol: "BTC",
        display_name: "Bitcoin",
    },
    TokenInfo {
        provider_id: "ethereum",
        symbol: "ETH",
        display_name: "Ethereum",
    },
    TokenInfo {
        provider_id: "binancecoin",
        symbol: "BNB",
        display_name: "BNB",
    },
    TokenInfo {
        provider_id: "uniswap",
        symbol: "UNI",
        display_name: "Uniswap",
    },
    TokenInfo {
        provider_id: "chainlink",
        symbol: "LINK",
        display_name: "Chainlink",
    },
    TokenInfo {
        provider_id: "cardano",
        symbol: "ADA",
        display_name: "Cardano",
    },
];

pub fn supported_tokens() -> &'static [TokenInfo] {
    &SUPPORTED_TOKENS
}

pub fn find_token(provider_id: &str) -> Option<&'static TokenInfo> {
    SUPPORTED_TOKENS.iter().find(|t| t.provider_id == provider_id)
}

pub fn is_supported(provider_id: &str) -> bool {
    find_token(provider_id).is_some()
}

pub fn supported_ids() -> Vec<String> {
    SUPPORTED_TOKENS
        .iter()
        .map(|t| t.provider_id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_unique_ids() {
        let ids = supported_ids();
        assert_eq!(ids.len(), 6);
        let mut dedup = ids.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 6);
    }

    #[test]
    fn lookup_is_by_provider_id_not_symbol() {
        assert_eq!(find_token("chainlink").map(|t| t.symbol), Some("LINK"));
        assert!(!is_supported("LINK"));
        assert!(!is_supported("dogecoin"));
    }
}
