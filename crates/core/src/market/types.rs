use crate::domain::market::MarketRecord;
use serde::Deserialize;

/// Subset of CoinGecko's `/coins/{id}` response that the dashboard reads.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinResponse {
    pub id: String,
    pub symbol: String,
    pub market_data: CoinMarketData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarketData {
    pub current_price: UsdQuote,
    pub price_change_percentage_24h: f64,
    #[serde(default)]
    pub price_change_percentage_7d: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_30d: Option<f64>,
    pub market_cap: UsdQuote,
    pub total_volume: UsdQuote,
    pub circulating_supply: f64,
}

/// Per-currency maps come back with every fiat; only USD is required.
#[derive(Debug, Clone, Deserialize)]
pub struct UsdQuote {
    pub usd: f64,
}

impl From<CoinResponse> for MarketRecord {
    fn from(coin: CoinResponse) -> Self {
        let md = coin.market_data;
        MarketRecord {
            id: coin.id,
            symbol: coin.symbol.to_uppercase(),
            current_price: md.current_price.usd,
            change_24h: md.price_change_percentage_24h,
            change_7d: md.price_change_percentage_7d,
            change_30d: md.price_change_percentage_30d,
            market_cap: md.market_cap.usd,
            total_volume: md.total_volume.usd,
            circulating_supply: md.circulating_supply,
        }
    }
}
