use crate::config::Settings;
use crate::domain::market::MarketRecord;
use crate::market::types::CoinResponse;
use crate::market::MarketDataSource;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const COIN_QUERY: [(&str, &str); 6] = [
    ("localization", "false"),
    ("tickers", "false"),
    ("market_data", "true"),
    ("community_data", "false"),
    ("developer_data", "false"),
    ("sparkline", "false"),
];

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .coingecko_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = settings.coingecko_api_key.clone();

        let timeout_secs = std::env::var("COINGECKO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build coingecko http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url(&self, id: &str) -> String {
        format!("{}/coins/{}", self.base_url.trim_end_matches('/'), id)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));
        if let Some(api_key) = &self.api_key {
            headers.insert("x-cg-demo-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl MarketDataSource for CoinGeckoClient {
    fn provider_name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch_token(&self, id: &str) -> Result<MarketRecord> {
        let res = self
            .http
            .get(self.url(id))
            .headers(self.headers()?)
            .query(&COIN_QUERY[..])
            .send()
            .await
            .with_context(|| format!("coingecko request failed for {id}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read coingecko response")?;

        if !status.is_success() {
            anyhow::bail!("coingecko HTTP {status} for {id}: {text}");
        }

        let coin = serde_json::from_str::<CoinResponse>(&text)
            .with_context(|| format!("coingecko response for {id} is missing market data"))?;
        Ok(coin.into())
    }
}
