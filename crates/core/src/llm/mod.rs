pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod json;

use crate::config::Settings;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl Provider {
    pub fn from_name(name: Option<&str>) -> anyhow::Result<Self> {
        match name.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("gemini") => Ok(Provider::Gemini),
            Some("anthropic") => Ok(Provider::Anthropic),
            Some(other) => anyhow::bail!("unsupported LLM_PROVIDER: {other}"),
        }
    }
}

/// A single prompt in, the model's full text reply out.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Builds the configured client. `Ok(None)` means the provider's API key is
/// absent, which callers treat as "analysis unavailable" rather than an error.
pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Option<Arc<dyn LlmClient>>> {
    let provider = Provider::from_name(settings.llm_provider.as_deref())?;
    let client: Arc<dyn LlmClient> = match provider {
        Provider::Gemini => {
            if settings.gemini_api_key.is_none() {
                tracing::warn!("GEMINI_API_KEY is not set; suggestions will fall back to hold");
                return Ok(None);
            }
            Arc::new(gemini::GeminiClient::from_settings(settings)?)
        }
        Provider::Anthropic => {
            if settings.anthropic_api_key.is_none() {
                tracing::warn!("ANTHROPIC_API_KEY is not set; suggestions will fall back to hold");
                return Ok(None);
            }
            Arc::new(anthropic::AnthropicClient::from_settings(settings)?)
        }
    };
    Ok(Some(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_to_gemini() {
        assert_eq!(Provider::from_name(None).unwrap(), Provider::Gemini);
        assert_eq!(
            Provider::from_name(Some("Anthropic")).unwrap(),
            Provider::Anthropic
        );
        assert!(Provider::from_name(Some("openai")).is_err());
    }

    #[test]
    fn missing_key_yields_no_client() {
        let settings = Settings::default();
        assert!(client_from_settings(&settings).unwrap().is_none());

        let settings = Settings {
            llm_provider: Some("anthropic".to_string()),
            gemini_api_key: Some("g-key".to_string()),
            ..Default::default()
        };
        assert!(client_from_settings(&settings).unwrap().is_none());
    }

    #[test]
    fn configured_key_yields_matching_client() {
        let settings = Settings {
            gemini_api_key: Some("g-key".to_string()),
            ..Default::default()
        };
        let client = client_from_settings(&settings).unwrap().unwrap();
        assert_eq!(client.provider(), Provider::Gemini);
    }
}
