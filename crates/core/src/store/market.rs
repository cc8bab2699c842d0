use crate::domain::market::MarketRecord;
use crate::market::{self, MarketDataSource};
use crate::store::{read, write};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketState {
    pub records_by_id: BTreeMap<String, MarketRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct MarketStore {
    source: Arc<dyn MarketDataSource>,
    state: RwLock<MarketState>,
}

impl MarketStore {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            state: RwLock::new(MarketState::default()),
        }
    }

    pub fn snapshot(&self) -> MarketState {
        read(&self.state).clone()
    }

    pub fn record(&self, id: &str) -> Option<MarketRecord> {
        read(&self.state).records_by_id.get(id).cloned()
    }

    /// Replaces the whole record map with a fresh fetch of `ids`. Failures end
    /// up in `error` with an empty map; nothing is returned to the caller.
    pub async fn fetch_market_data(&self, ids: &[String]) {
        {
            let mut state = write(&self.state);
            state.is_loading = true;
            state.error = None;
        }

        let res = market::fetch_many(Arc::clone(&self.source), ids).await;

        let mut state = write(&self.state);
        state.is_loading = false;
        match res {
            Ok(records) => {
                state.records_by_id = records
                    .into_iter()
                    .map(|r| (r.id.clone(), r))
                    .collect();
                state.updated_at = Some(Utc::now());
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "market data fetch failed");
                state.error = Some(format!("{err:#}"));
                state.records_by_id.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::testing::{FakeSource, Gate};

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn stores_records_keyed_by_id() {
        let source = Arc::new(FakeSource::with(&["bitcoin", "ethereum", "cardano"]));
        let store = MarketStore::new(source);

        store
            .fetch_market_data(&ids(&["bitcoin", "ethereum", "cardano"]))
            .await;

        let state = store.snapshot();
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(state.updated_at.is_some());
        let keys: Vec<_> = state.records_by_id.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["bitcoin", "cardano", "ethereum"]);
        assert_eq!(store.record("cardano").unwrap().symbol, "ADA");
    }

    #[tokio::test]
    async fn invalid_ids_set_error_and_empty_map() {
        let source = Arc::new(FakeSource::with(&["bitcoin"]));
        let store = MarketStore::new(source.clone());

        store.fetch_market_data(&ids(&["bitcoin"])).await;
        assert_eq!(store.snapshot().records_by_id.len(), 1);

        store.fetch_market_data(&ids(&["not-a-token"])).await;
        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some("No valid tokens provided"));
        assert!(state.records_by_id.is_empty());
        assert!(!state.is_loading);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn next_request_clears_previous_error() {
        let source = Arc::new(FakeSource::with(&["uniswap"]));
        let store = MarketStore::new(source);

        store.fetch_market_data(&[]).await;
        assert!(store.snapshot().error.is_some());

        store.fetch_market_data(&ids(&["uniswap"])).await;
        let state = store.snapshot();
        assert!(state.error.is_none());
        assert!(state.records_by_id.contains_key("uniswap"));
    }

    #[tokio::test]
    async fn loading_flag_covers_the_request_only() {
        let gate = Arc::new(Gate::default());
        let source = Arc::new(FakeSource::with(&["bitcoin"]).gated(gate.clone()));
        let store = Arc::new(MarketStore::new(source));
        store.fetch_market_data(&[]).await;
        assert!(store.snapshot().error.is_some());

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_market_data(&ids(&["bitcoin"])).await }
        });

        gate.started.notified().await;
        let state = store.snapshot();
        assert!(state.is_loading);
        assert!(state.error.is_none());

        gate.release.notify_one();
        task.await.unwrap();
        let state = store.snapshot();
        assert!(!state.is_loading);
        assert!(state.records_by_id.contains_key("bitcoin"));
    }

    #[tokio::test]
    async fn refetch_replaces_whole_map() {
        let source = Arc::new(FakeSource::with(&["bitcoin", "ethereum"]));
        let store = MarketStore::new(source);

        store.fetch_market_data(&ids(&["bitcoin", "ethereum"])).await;
        store.fetch_market_data(&ids(&["ethereum"])).await;

        let keys: Vec<_> = store.snapshot().records_by_id.into_keys().collect();
        assert_eq!(keys, ids(&["ethereum"]));
    }
}
