use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinsight_core::advisor::SuggestionEngine;
use coinsight_core::config::Settings;
use coinsight_core::dashboard::Dashboard;
use coinsight_core::domain::token;
use coinsight_core::market::coingecko::CoinGeckoClient;
use coinsight_core::store::{MarketStore, SuggestionStore};
use coinsight_core::wallet::format::{format_native_balance, truncate_address};
use coinsight_core::wallet::rpc::RpcWallet;
use coinsight_core::wallet::WalletSession;

#[derive(Debug, Parser)]
#[command(name = "coinsight")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch market data and print the market store snapshot.
    Market {
        /// Comma-separated CoinGecko ids. Defaults to every supported token.
        #[arg(long, value_delimiter = ',')]
        tokens: Vec<String>,
    },

    /// Fetch market data, then ask the AI provider for suggestions.
    Analyze {
        #[arg(long, value_delimiter = ',')]
        tokens: Vec<String>,
    },

    /// Print the native balance of an address (requires ETH_RPC_URL).
    Balance {
        #[arg(long)]
        address: String,
    },

    /// Run the dashboard flow for a watch-only address, optionally selecting a token.
    Dashboard {
        #[arg(long)]
        address: String,

        /// CoinGecko id of the token to analyze after loading.
        #[arg(long)]
        select: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(&settings, args.command).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    res
}

async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Market { tokens } => {
            let market = market_store(settings)?;
            market.fetch_market_data(&token_ids(tokens)).await;
            print_json(&market.snapshot())
        }
        Command::Analyze { tokens } => {
            let market = market_store(settings)?;
            market.fetch_market_data(&token_ids(tokens)).await;

            let snapshot = market.snapshot();
            if let Some(err) = &snapshot.error {
                anyhow::bail!("market data unavailable: {err}");
            }

            let suggestions = suggestion_store(settings)?;
            let records: Vec<_> = snapshot.records_by_id.into_values().collect();
            suggestions.analyze_tokens(&records).await;
            print_json(&suggestions.snapshot())
        }
        Command::Balance { address } => {
            let wallet = RpcWallet::from_settings(settings, Some(address.clone()))?;
            let wei = wallet.balance_wei(&address).await?;
            print_json(&serde_json::json!({
                "address": truncate_address(Some(&address)),
                "balance": format_native_balance(wei),
            }))
        }
        Command::Dashboard { address, select } => {
            let wallet = RpcWallet::from_settings(settings, Some(address))?;
            let dashboard = Dashboard::new(
                Arc::new(market_store(settings)?),
                Arc::new(suggestion_store(settings)?),
            );

            let overview = dashboard.connect(&wallet).await;
            let suggestion = match select.as_deref() {
                Some(id) => {
                    anyhow::ensure!(token::is_supported(id), "unsupported token: {id}");
                    dashboard.select_token(id).await
                }
                None => None,
            };

            print_json(&serde_json::json!({
                "wallet": overview,
                "market": dashboard.market().snapshot(),
                "suggestion": suggestion,
            }))
        }
    }
}

fn token_ids(tokens: Vec<String>) -> Vec<String> {
    if tokens.is_empty() {
        token::supported_ids()
    } else {
        tokens
    }
}

fn market_store(settings: &Settings) -> anyhow::Result<MarketStore> {
    let source = CoinGeckoClient::from_settings(settings)?;
    Ok(MarketStore::new(Arc::new(source)))
}

fn suggestion_store(settings: &Settings) -> anyhow::Result<SuggestionStore> {
    let llm = coinsight_core::llm::client_from_settings(settings)
        .context("failed to configure AI provider")?;
    Ok(SuggestionStore::new(SuggestionEngine::new(llm)))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
