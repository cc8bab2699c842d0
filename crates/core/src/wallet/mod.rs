//! The wallet is an external collaborator. This module only describes what the
//! dashboard consumes from it, plus the display helpers for balances and
//! addresses.

pub mod format;
pub mod rpc;

use ethers::types::U256;
use serde::Serialize;

/// Connector that produced the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletConnector {
    ParticleAuth,
    Injected,
    WalletConnect,
    Coinbase,
    /// Watch-only session over a plain address.
    ReadOnly,
}

impl WalletConnector {
    /// Only social-login wallets can report profile information.
    pub fn supports_user_info(self) -> bool {
        matches!(self, WalletConnector::ParticleAuth)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserInfo {
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[async_trait::async_trait]
pub trait WalletSession: Send + Sync {
    fn is_connected(&self) -> bool;

    fn address(&self) -> Option<&str>;

    fn connector(&self) -> WalletConnector;

    /// Native balance of `address` in wei.
    async fn balance_wei(&self, address: &str) -> anyhow::Result<U256>;

    async fn user_info(&self) -> anyhow::Result<Option<UserInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_particle_auth_reports_user_info() {
        assert!(WalletConnector::ParticleAuth.supports_user_info());
        for c in [
            WalletConnector::Injected,
            WalletConnector::WalletConnect,
            WalletConnector::Coinbase,
            WalletConnector::ReadOnly,
        ] {
            assert!(!c.supports_user_info(), "{c:?}");
        }
    }
}
