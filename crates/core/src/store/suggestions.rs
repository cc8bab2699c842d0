use crate::advisor::SuggestionEngine;
use crate::domain::market::MarketRecord;
use crate::domain::suggestion::Suggestion;
use crate::store::{read, write};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::RwLock;

const EMPTY_INPUT_ERROR: &str = "No market data provided for analysis";

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestionState {
    pub suggestions: Vec<Suggestion>,
    pub is_analyzing: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct SuggestionStore {
    engine: SuggestionEngine,
    state: RwLock<SuggestionState>,
}

impl SuggestionStore {
    pub fn new(engine: SuggestionEngine) -> Self {
        Self {
            engine,
            state: RwLock::new(SuggestionState::default()),
        }
    }

    pub fn snapshot(&self) -> SuggestionState {
        read(&self.state).clone()
    }

    /// Analyzes `records` and replaces the stored suggestions. Returns the new
    /// suggestions, or an empty list when the request was rejected.
    pub async fn analyze_tokens(&self, records: &[MarketRecord]) -> Vec<Suggestion> {
        {
            let mut state = write(&self.state);
            state.is_analyzing = true;
            state.error = None;
        }

        if records.is_empty() {
            tracing::error!(error = EMPTY_INPUT_ERROR, "AI analysis rejected");
            let mut state = write(&self.state);
            state.is_analyzing = false;
            state.error = Some(EMPTY_INPUT_ERROR.to_string());
            state.suggestions.clear();
            return Vec::new();
        }

        let suggestions = self.engine.analyze_many(records).await;
        tracing::info!(count = suggestions.len(), "analysis completed");

        let mut state = write(&self.state);
        state.is_analyzing = false;
        state.suggestions = suggestions.clone();
        state.updated_at = Some(Utc::now());
        suggestions
    }
}
