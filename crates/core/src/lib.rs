pub mod advisor;
pub mod dashboard;
pub mod domain;
pub mod llm;
pub mod market;
pub mod store;
pub mod wallet;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub llm_provider: Option<String>,
        pub gemini_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub coingecko_base_url: Option<String>,
        pub coingecko_api_key: Option<String>,
        pub eth_rpc_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                llm_provider: non_empty_var("LLM_PROVIDER"),
                // The dashboard used to read its key from the public Next.js variable.
                gemini_api_key: non_empty_var("GEMINI_API_KEY")
                    .or_else(|| non_empty_var("NEXT_PUBLIC_GEMINI_API_KEY")),
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                coingecko_base_url: non_empty_var("COINGECKO_BASE_URL"),
                coingecko_api_key: non_empty_var("COINGECKO_API_KEY"),
                eth_rpc_url: non_empty_var("ETH_RPC_URL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_eth_rpc_url(&self) -> anyhow::Result<&str> {
            self.eth_rpc_url
                .as_deref()
                .context("ETH_RPC_URL is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }
}
