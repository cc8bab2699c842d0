//! Turns market records into trading suggestions.
//!
//! Every record gets exactly one [`Suggestion`]. Whenever the model cannot be
//! asked (no key) or its reply cannot be used, the record gets the neutral
//! [`Suggestion::fallback`] instead, so callers never see an analysis error.

use crate::domain::market::MarketRecord;
use crate::domain::suggestion::{Suggestion, BATCH_FALLBACK_REASON};
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{json, LlmClient};
use std::sync::Arc;
use tokio::task::JoinSet;

const MISSING_KEY_REASON: &str = "AI API key is not configured";

pub fn render_prompt(record: &MarketRecord) -> String {
    format!(
        r#"Analyze the following crypto market data and provide investment advice:

Token: {symbol}
Current Price: ${price}
24h Change: {change_24h}%
7d Change: {change_7d}
30d Change: {change_30d}
Market Cap: ${market_cap}
24h Volume: ${volume}
Circulating Supply: {supply}

Provide a JSON response in this exact format:
{{
  "action": "Buy|Sell|Hold|Stake",
  "confidence": <number between 0-100>,
  "reason": "<brief explanation>",
  "details": {{
    "riskLevel": "Low|Medium|High",
    "timeFrame": "Short|Medium|Long",
    "potentialReturn": "<percentage range>",
    "marketSentiment": "<brief market sentiment>"
  }}
}}

Consider these factors:
1. Price trends and momentum
2. Volume and market cap changes
3. Market sentiment and volatility
4. Supply metrics

Provide ONLY the JSON response, no additional text."#,
        symbol = record.symbol,
        price = record.current_price,
        change_24h = record.change_24h,
        change_7d = percent_or_na(record.change_7d),
        change_30d = percent_or_na(record.change_30d),
        market_cap = record.market_cap,
        volume = record.total_volume,
        supply = record.circulating_supply,
    )
}

fn percent_or_na(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v}%"),
        None => "n/a".to_string(),
    }
}

fn error_reason(err: &anyhow::Error) -> String {
    format!("Analysis error: {err:#}")
}

/// Raw provider body carried by an [`LlmDiagnosticsError`] anywhere in the chain.
fn raw_output(err: &anyhow::Error) -> Option<&str> {
    err.downcast_ref::<LlmDiagnosticsError>()
        .and_then(|diag| diag.raw_output.as_deref())
}

#[derive(Clone)]
pub struct SuggestionEngine {
    llm: Option<Arc<dyn LlmClient>>,
}

impl SuggestionEngine {
    /// `None` means no credential was configured; every analysis falls back.
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn analyze_one(&self, record: &MarketRecord) -> Suggestion {
        match &self.llm {
            Some(llm) => analyze_with(llm.as_ref(), record).await,
            None => Suggestion::fallback(
                &record.symbol,
                format!("Analysis error: {MISSING_KEY_REASON}"),
            ),
        }
    }

    /// Analyzes all records concurrently and returns one suggestion per record,
    /// in input order.
    pub async fn analyze_many(&self, records: &[MarketRecord]) -> Vec<Suggestion> {
        if records.is_empty() {
            tracing::warn!("no tokens provided for analysis");
            return Vec::new();
        }

        let Some(llm) = &self.llm else {
            tracing::warn!(
                tokens = records.len(),
                "AI credential missing; returning fallback suggestions"
            );
            return records
                .iter()
                .map(|r| {
                    Suggestion::fallback(&r.symbol, format!("Analysis error: {MISSING_KEY_REASON}"))
                })
                .collect();
        };

        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        tracing::info!(tokens = ?symbols, "analyzing tokens");

        let mut tasks = JoinSet::new();
        for (index, record) in records.iter().cloned().enumerate() {
            let llm = Arc::clone(llm);
            tasks.spawn(async move { (index, analyze_with(llm.as_ref(), &record).await) });
        }

        let mut slots: Vec<Option<Suggestion>> = vec![None; records.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, suggestion)) => slots[index] = Some(suggestion),
                Err(err) => {
                    // Dropping `tasks` aborts whatever is still running.
                    tracing::error!(error = %err, "analysis task failed; defaulting whole batch to hold");
                    return records
                        .iter()
                        .map(|r| Suggestion::fallback(&r.symbol, BATCH_FALLBACK_REASON))
                        .collect();
                }
            }
        }
        slots.into_iter().flatten().collect()
    }
}

async fn analyze_with(llm: &dyn LlmClient, record: &MarketRecord) -> Suggestion {
    let prompt = render_prompt(record);
    tracing::debug!(token = %record.symbol, provider = ?llm.provider(), "sending analysis prompt");

    let res = match llm.complete(&prompt).await {
        Ok(text) => {
            tracing::debug!(token = %record.symbol, reply = %text, "received analysis reply");
            json::parse_suggestion(&text, &record.symbol)
        }
        Err(err) => Err(err),
    };

    match res {
        Ok(suggestion) => suggestion,
        Err(err) => {
            match raw_output(&err) {
                Some(raw) => tracing::warn!(
                    token = %record.symbol,
                    error = %format!("{err:#}"),
                    raw_output = %raw,
                    "analysis failed; falling back to hold"
                ),
                None => tracing::warn!(
                    token = %record.symbol,
                    error = %format!("{err:#}"),
                    "analysis failed; falling back to hold"
                ),
            }
            Suggestion::fallback(&record.symbol, error_reason(&err))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::llm::Provider;
    use crate::market::testing::Gate;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted model: replies per token symbol found in the prompt.
    #[derive(Default)]
    pub struct ScriptedLlm {
        pub replies: BTreeMap<String, Reply>,
        pub calls: AtomicUsize,
        gate: Option<Arc<Gate>>,
    }

    pub enum Reply {
        Text(String),
        Fail(&'static str),
        /// Provider-level failure that carries the raw response body.
        Rejected { detail: &'static str, raw: &'static str },
        Panic,
        /// Never answers.
        Hang,
    }

    impl ScriptedLlm {
        pub fn reply(mut self, symbol: &str, reply: Reply) -> Self {
            self.replies.insert(symbol.to_string(), reply);
            self
        }

        pub fn gated(mut self, gate: Arc<Gate>) -> Self {
            self.gate = Some(gate);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    pub fn json_reply(action: &str, confidence: u8) -> Reply {
        Reply::Text(format!(
            r#"{{"action":"{action}","confidence":{confidence},"reason":"scripted","details":{{"riskLevel":"High","timeFrame":"Short","potentialReturn":"10%","marketSentiment":"Bullish"}}}}"#
        ))
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider(&self) -> Provider {
            Provider::Gemini
        }

        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.pass().await;
            }
            let symbol = prompt
                .lines()
                .find_map(|l| l.strip_prefix("Token: "))
                .unwrap_or_default();
            match self.replies.get(symbol) {
                Some(Reply::Text(t)) => Ok(t.clone()),
                Some(Reply::Fail(msg)) => anyhow::bail!("{msg}"),
                Some(Reply::Rejected { detail, raw }) => Err(LlmDiagnosticsError {
                    provider: Provider::Gemini,
                    stage: "http",
                    detail: detail.to_string(),
                    raw_output: Some(raw.to_string()),
                }
                .into()),
                Some(Reply::Panic) => panic!("scripted panic for {symbol}"),
                Some(Reply::Hang) => std::future::pending().await,
                None => anyhow::bail!("no scripted reply for {symbol}"),
            }
        }
    }
}
