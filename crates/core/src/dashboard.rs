use crate::domain::suggestion::Suggestion;
use crate::domain::token;
use crate::store::{MarketStore, SuggestionStore};
use crate::wallet::format::format_native_balance;
use crate::wallet::{UserInfo, WalletSession};
use serde::Serialize;
use std::sync::Arc;

/// What the dashboard learned about the connected wallet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalletOverview {
    pub address: Option<String>,
    pub balance: Option<String>,
    pub user_info: Option<UserInfo>,
}

/// Ties the wallet session to both stores the way the single-page dashboard does.
pub struct Dashboard {
    market: Arc<MarketStore>,
    suggestions: Arc<SuggestionStore>,
}

impl Dashboard {
    pub fn new(market: Arc<MarketStore>, suggestions: Arc<SuggestionStore>) -> Self {
        Self {
            market,
            suggestions,
        }
    }

    pub fn market(&self) -> &MarketStore {
        &self.market
    }

    pub fn suggestions(&self) -> &SuggestionStore {
        &self.suggestions
    }

    /// Loads balance, profile (when the connector has one) and market data for
    /// the whole catalog. Wallet lookups that fail are logged and left empty.
    pub async fn connect(&self, session: &dyn WalletSession) -> WalletOverview {
        let Some(address) = session.address().filter(|_| session.is_connected()) else {
            tracing::info!("wallet not connected; skipping dashboard load");
            return WalletOverview::default();
        };

        let balance = match session.balance_wei(address).await {
            Ok(wei) => Some(format_native_balance(wei)),
            Err(err) => {
                tracing::error!(%address, error = %format!("{err:#}"), "error fetching balance");
                None
            }
        };

        let user_info = if session.connector().supports_user_info() {
            match session.user_info().await {
                Ok(info) => info,
                Err(err) => {
                    tracing::error!(error = %format!("{err:#}"), "error fetching user info");
                    None
                }
            }
        } else {
            None
        };

        self.market.fetch_market_data(&token::supported_ids()).await;

        WalletOverview {
            address: Some(address.to_string()),
            balance,
            user_info,
        }
    }

    /// Analyzes the already-fetched record for `token_id`. Returns `None` when the
    /// market store has nothing for that token.
    pub async fn select_token(&self, token_id: &str) -> Option<Suggestion> {
        let Some(record) = self.market.record(token_id) else {
            tracing::warn!(token = %token_id, "no market data for selected token");
            return None;
        };
        self.suggestions
            .analyze_tokens(std::slice::from_ref(&record))
            .await
            .into_iter()
            .next()
    }
}
