pub mod coingecko;
pub mod types;

use crate::domain::market::MarketRecord;
use crate::domain::token;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;

#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_token(&self, id: &str) -> anyhow::Result<MarketRecord>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Nothing left to request once the ids were checked against the catalog.
    NoValidTokens,
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::NoValidTokens => write!(f, "No valid tokens provided"),
        }
    }
}

impl std::error::Error for MarketError {}

/// Keeps catalog ids only, in first-seen order, without duplicates.
pub fn filter_supported(ids: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| token::is_supported(id))
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// Fetches every supported id concurrently. A failing id is logged and left out;
/// the batch only fails when no id survives the catalog filter.
pub async fn fetch_many(
    source: Arc<dyn MarketDataSource>,
    ids: &[String],
) -> anyhow::Result<Vec<MarketRecord>> {
    let valid = filter_supported(ids);
    if valid.is_empty() {
        return Err(MarketError::NoValidTokens.into());
    }

    tracing::info!(
        provider = source.provider_name(),
        tokens = ?valid,
        "fetching market data"
    );

    let mut tasks = JoinSet::new();
    for id in valid {
        let source = Arc::clone(&source);
        tasks.spawn(async move {
            let res = source.fetch_token(&id).await;
            (id, res)
        });
    }

    let mut out = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(record))) => out.push(record),
            Ok((id, Err(err))) => {
                tracing::warn!(token = %id, error = %format!("{err:#}"), "market fetch failed; skipping token");
            }
            Err(err) => {
                tracing::warn!(error = %err, "market fetch task aborted; skipping token");
            }
        }
    }

    tracing::info!(fetched = out.len(), "market data fetched");
    Ok(out)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use tokio::sync::{Barrier, Notify};

    /// Holds a fake call open: it signals `started`, then waits for `release`.
    #[derive(Default)]
    pub struct Gate {
        pub started: Notify,
        pub release: Notify,
    }

    impl Gate {
        pub async fn pass(&self) {
            self.started.notify_one();
            self.release.notified().await;
        }
    }

    /// In-memory source that serves canned records and records every request.
    #[derive(Default)]
    pub struct FakeSource {
        pub records: BTreeMap<String, MarketRecord>,
        pub calls: Mutex<Vec<String>>,
        gate: Option<Arc<Gate>>,
        barrier: Option<Arc<Barrier>>,
    }

    impl FakeSource {
        pub fn with(ids: &[&str]) -> Self {
            let records = ids
                .iter()
                .map(|id| (id.to_string(), record(id)))
                .collect();
            Self {
                records,
                ..Default::default()
            }
        }

        pub fn gated(mut self, gate: Arc<Gate>) -> Self {
            self.gate = Some(gate);
            self
        }

        /// Every request waits until `barrier` is full.
        pub fn rendezvous(mut self, barrier: Arc<Barrier>) -> Self {
            self.barrier = Some(barrier);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    pub fn record(id: &str) -> MarketRecord {
        let symbol = token::find_token(id).map(|t| t.symbol).unwrap_or("TST");
        MarketRecord {
            id: id.to_string(),
            symbol: symbol.to_string(),
            current_price: 100.0,
            change_24h: 1.5,
            change_7d: Some(-2.0),
            change_30d: None,
            market_cap: 1.0e9,
            total_volume: 5.0e7,
            circulating_supply: 1.0e7,
        }
    }

    #[async_trait::async_trait]
    impl MarketDataSource for FakeSource {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_token(&self, id: &str) -> anyhow::Result<MarketRecord> {
            self.calls.lock().unwrap().push(id.to_string());
            if let Some(gate) = &self.gate {
                gate.pass().await;
            }
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            self.records
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("HTTP 404 for {id}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeSource;
    use super::*;
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filter_drops_unknown_and_duplicate_ids() {
        let out = filter_supported(&ids(&["dogecoin", "bitcoin", "ethereum", "bitcoin"]));
        assert_eq!(out, ids(&["bitcoin", "ethereum"]));
    }

    #[tokio::test]
    async fn rejects_unsupported_ids_without_network_calls() {
        let source = Arc::new(FakeSource::with(&["bitcoin"]));
        let err = fetch_many(source.clone(), &ids(&["dogecoin", "pepe"]))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<MarketError>(),
            Some(&MarketError::NoValidTokens)
        );
        assert_eq!(source.call_count(), 0);

        assert!(fetch_many(source.clone(), &[]).await.is_err());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn requests_run_concurrently() {
        // Each fetch blocks until all three are in flight at once.
        let barrier = Arc::new(Barrier::new(3));
        let source = Arc::new(
            FakeSource::with(&["bitcoin", "ethereum", "cardano"]).rendezvous(barrier),
        );

        let out = tokio::time::timeout(
            Duration::from_secs(5),
            fetch_many(source.clone(), &ids(&["bitcoin", "ethereum", "cardano"])),
        )
        .await
        .expect("fetches were issued one after another")
        .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[tokio::test]
    async fn one_failing_token_does_not_abort_the_batch() {
        // "cardano" is in the catalog but the source has no data for it.
        let source = Arc::new(FakeSource::with(&["bitcoin", "ethereum"]));
        let mut out = fetch_many(source.clone(), &ids(&["bitcoin", "cardano", "ethereum"]))
            .await
            .unwrap();
        out.sort_by(|a, b| a.id.cmp(&b.id));

        let got: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["bitcoin", "ethereum"]);
        assert_eq!(source.call_count(), 3);
    }
}
