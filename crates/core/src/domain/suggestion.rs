use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const FALLBACK_CONFIDENCE: u8 = 50;
pub const BATCH_FALLBACK_REASON: &str = "Multiple analysis error - defaulting to hold position";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
    Stake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeFrame {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionDetails {
    pub risk_level: RiskLevel,
    pub time_frame: TimeFrame,
    pub potential_return: String,
    pub market_sentiment: String,
}

/// One AI recommendation for a token. Built once per analysis and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub token: String,
    pub action: Action,
    pub confidence: u8,
    pub reason: String,
    pub details: SuggestionDetails,
}

impl Suggestion {
    /// Neutral hold used whenever no real analysis is available.
    pub fn fallback(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            action: Action::Hold,
            confidence: FALLBACK_CONFIDENCE,
            reason: reason.into(),
            details: SuggestionDetails {
                risk_level: RiskLevel::Medium,
                time_frame: TimeFrame::Medium,
                potential_return: "Unknown".to_string(),
                market_sentiment: "Uncertain".to_string(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.action == Action::Hold
            && self.confidence == FALLBACK_CONFIDENCE
            && self.details.risk_level == RiskLevel::Medium
            && self.details.time_frame == TimeFrame::Medium
            && self.details.potential_return == "Unknown"
            && self.details.market_sentiment == "Uncertain"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

fn unknown(kind: &'static str, value: &str) -> UnknownVariant {
    UnknownVariant {
        kind,
        value: value.to_string(),
    }
}

impl FromStr for Action {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "hold" => Ok(Self::Hold),
            "stake" => Ok(Self::Stake),
            _ => Err(unknown("action", s)),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(unknown("riskLevel", s)),
        }
    }
}

impl FromStr for TimeFrame {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(unknown("timeFrame", s)),
        }
    }
}
