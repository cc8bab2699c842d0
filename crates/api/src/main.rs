use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinsight_core::advisor::SuggestionEngine;
use coinsight_core::config::Settings;
use coinsight_core::domain::token::{self, TokenInfo};
use coinsight_core::market::coingecko::CoinGeckoClient;
use coinsight_core::store::{MarketState, MarketStore, SuggestionState, SuggestionStore};
use coinsight_core::wallet::format::{format_native_balance, truncate_address};
use coinsight_core::wallet::rpc::RpcWallet;
use coinsight_core::wallet::WalletSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let source = Arc::new(CoinGeckoClient::from_settings(&settings)?);
    let llm = coinsight_core::llm::client_from_settings(&settings)?;
    let engine = SuggestionEngine::new(llm);
    if !engine.is_configured() {
        tracing::warn!("AI provider not configured; starting API with fallback suggestions only");
    }

    let state = AppState {
        market: Arc::new(MarketStore::new(source)),
        suggestions: Arc::new(SuggestionStore::new(engine)),
        settings: Arc::new(settings),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/tokens", get(list_tokens))
        .route("/market", get(get_market))
        .route("/market/refresh", post(refresh_market))
        .route("/suggestions", get(get_suggestions))
        .route("/suggestions/analyze", post(analyze_tokens))
        .route("/wallet/:address/balance", get(get_wallet_balance))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    market: Arc<MarketStore>,
    suggestions: Arc<SuggestionStore>,
    settings: Arc<Settings>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenSelection {
    token_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct WalletBalance {
    address: String,
    display_address: String,
    balance: String,
}

async fn list_tokens() -> Json<&'static [TokenInfo]> {
    Json(token::supported_tokens())
}

async fn get_market(State(state): State<AppState>) -> Json<MarketState> {
    Json(state.market.snapshot())
}

async fn refresh_market(
    State(state): State<AppState>,
    body: Option<Json<TokenSelection>>,
) -> Json<MarketState> {
    let ids = body
        .and_then(|Json(sel)| sel.token_ids)
        .unwrap_or_else(token::supported_ids);
    state.market.fetch_market_data(&ids).await;
    Json(state.market.snapshot())
}

async fn get_suggestions(State(state): State<AppState>) -> Json<SuggestionState> {
    Json(state.suggestions.snapshot())
}

async fn analyze_tokens(
    State(state): State<AppState>,
    Json(selection): Json<TokenSelection>,
) -> Result<Json<SuggestionState>, StatusCode> {
    let ids = selection.token_ids.unwrap_or_default();
    let records: Vec<_> = ids.iter().filter_map(|id| state.market.record(id)).collect();
    if records.is_empty() {
        tracing::warn!(tokens = ?ids, "no stored market data for requested tokens");
        return Err(StatusCode::NOT_FOUND);
    }

    state.suggestions.analyze_tokens(&records).await;
    Ok(Json(state.suggestions.snapshot()))
}

async fn get_wallet_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletBalance>, StatusCode> {
    let wallet = match RpcWallet::from_settings(&state.settings, Some(address.clone())) {
        Ok(w) => w,
        Err(e) if state.settings.eth_rpc_url.is_none() => {
            tracing::warn!(error = %e, "balance requested without ETH_RPC_URL");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };

    let wei = wallet.balance_wei(&address).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(%address, error = %format!("{e:#}"), "balance lookup failed");
        StatusCode::BAD_GATEWAY
    })?;

    Ok(Json(WalletBalance {
        display_address: truncate_address(Some(&address)),
        balance: format_native_balance(wei),
        address,
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
