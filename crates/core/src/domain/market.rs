use serde::Serialize;

/// Normalized USD snapshot for one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRecord {
    pub id: String,
    pub symbol: String,
    pub current_price: f64,
    pub change_24h: f64,
    pub change_7d: Option<f64>,
    pub change_30d: Option<f64>,
    pub market_cap: f64,
    pub total_volume: f64,
    pub circulating_supply: f64,
}
