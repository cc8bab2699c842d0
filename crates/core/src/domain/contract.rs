use crate::domain::suggestion::{Action, RiskLevel, Suggestion, SuggestionDetails, TimeFrame};
use anyhow::{ensure, Context};
use serde::Deserialize;

/// Shape the model is asked to reply with. Enum-like fields stay strings here so
/// that validation can report exactly which value was rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSuggestion {
    pub action: String,
    pub confidence: f64,
    pub reason: String,
    pub details: LlmSuggestionDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmSuggestionDetails {
    pub risk_level: String,
    pub time_frame: String,
    pub potential_return: Option<String>,
    pub market_sentiment: Option<String>,
}

impl LlmSuggestion {
    pub fn validate_and_into_suggestion(self, token: &str) -> anyhow::Result<Suggestion> {
        let action = self.action.parse::<Action>()?;

        ensure!(
            self.confidence.is_finite() && (0.0..=100.0).contains(&self.confidence),
            "confidence must be between 0 and 100 (got {})",
            self.confidence
        );

        let reason = self.reason.trim().to_string();
        ensure!(!reason.is_empty(), "reason must be non-empty");

        let details = self
            .details
            .validate_and_into_details()
            .context("invalid details")?;

        Ok(Suggestion {
            token: token.to_string(),
            action,
            confidence: self.confidence.round() as u8,
            reason,
            details,
        })
    }
}

impl LlmSuggestionDetails {
    fn validate_and_into_details(self) -> anyhow::Result<SuggestionDetails> {
        let potential_return = self
            .potential_return
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let market_sentiment = self
            .market_sentiment
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Uncertain".to_string());

        Ok(SuggestionDetails {
            risk_level: self.risk_level.parse::<RiskLevel>()?,
            time_frame: self.time_frame.parse::<TimeFrame>()?,
            potential_return,
            market_sentiment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract(confidence: f64, action: &str) -> LlmSuggestion {
        serde_json::from_value(json!({
            "action": action,
            "confidence": confidence,
            "reason": "  strong momentum  ",
            "details": {
                "riskLevel": "low",
                "timeFrame": "Long",
                "potentialReturn": "10-20%",
                "marketSentiment": "Bullish"
            }
        }))
        .unwrap()
    }

    #[test]
    fn converts_valid_contract() {
        let s = contract(72.6, "buy").validate_and_into_suggestion("BTC").unwrap();
        assert_eq!(s.token, "BTC");
        assert_eq!(s.action, Action::Buy);
        assert_eq!(s.confidence, 73);
        assert_eq!(s.reason, "strong momentum");
        assert_eq!(s.details.risk_level, RiskLevel::Low);
        assert_eq!(s.details.time_frame, TimeFrame::Long);
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        assert!(contract(101.0, "Buy").validate_and_into_suggestion("BTC").is_err());
        assert!(contract(-1.0, "Buy").validate_and_into_suggestion("BTC").is_err());
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(contract(50.0, "Yolo").validate_and_into_suggestion("BTC").is_err());
    }

    #[test]
    fn missing_free_text_details_use_neutral_defaults() {
        let parsed: LlmSuggestion = serde_json::from_value(json!({
            "action": "Hold",
            "confidence": 40,
            "reason": "flat",
            "details": {"riskLevel": "Medium", "timeFrame": "Short"}
        }))
        .unwrap();
        let s = parsed.validate_and_into_suggestion("ADA").unwrap();
        assert_eq!(s.details.potential_return, "Unknown");
        assert_eq!(s.details.market_sentiment, "Uncertain");
    }
}
