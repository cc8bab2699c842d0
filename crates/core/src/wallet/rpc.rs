use crate::config::Settings;
use crate::wallet::{UserInfo, WalletConnector, WalletSession};
use anyhow::{Context, Result};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, U256};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Watch-only session: a fixed address whose balance is read over JSON-RPC.
#[derive(Debug, Clone)]
pub struct RpcWallet {
    provider: Provider<Http>,
    address: Option<String>,
    timeout: Duration,
}

impl RpcWallet {
    pub fn from_settings(settings: &Settings, address: Option<String>) -> Result<Self> {
        let rpc_url = settings.require_eth_rpc_url()?;
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("invalid ETH_RPC_URL: {rpc_url}"))?;
        if let Some(a) = &address {
            parse_address(a)?;
        }

        let timeout_secs = std::env::var("ETH_RPC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            provider,
            address,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address).with_context(|| format!("invalid wallet address: {address}"))
}

#[async_trait::async_trait]
impl WalletSession for RpcWallet {
    fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn connector(&self) -> WalletConnector {
        WalletConnector::ReadOnly
    }

    async fn balance_wei(&self, address: &str) -> Result<U256> {
        let addr = parse_address(address)?;
        tokio::time::timeout(self.timeout, self.provider.get_balance(addr, None))
            .await
            .with_context(|| format!("eth_getBalance timed out after {:?}", self.timeout))?
            .context("eth_getBalance request failed")
    }

    async fn user_info(&self) -> Result<Option<UserInfo>> {
        Ok(None)
    }
}
