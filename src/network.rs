//! Network profiles for the Bundlr upload nodes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::Currency;

/// Mainnet Bundlr node.
pub const MAINNET_NODE_URL: &str = "https://node1.bundlr.network";

/// DevNet Bundlr node (free uploads).
pub const DEVNET_NODE_URL: &str = "https://devnet.bundlr.network";

/// Gateway used to build permanent URLs.
pub const ARWEAVE_GATEWAY_URL: &str = "https://arweave.net";

/// Network profile selected once per wallet session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkProfile {
    #[default]
    Testnet,
    Mainnet,
}

impl NetworkProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        }
    }

    /// Label shown in the wallet panel.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Testnet => "Testnet (free)",
            Self::Mainnet => "Mainnet",
        }
    }

    /// Whether uploads must be covered by the loaded bundler balance.
    ///
    /// DevNet uploads are free, so only mainnet is balance-checked.
    pub fn requires_balance_check(&self) -> bool {
        matches!(self, Self::Mainnet)
    }

    /// Parse a user-supplied network name, falling back to testnet for
    /// anything unrecognised.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// The built-in endpoint configuration for this profile.
    pub fn config(&self) -> NetworkConfig {
        match self {
            Self::Mainnet => NetworkConfig {
                name: "Bundlr Mainnet".to_string(),
                url: MAINNET_NODE_URL.to_string(),
                currency: Currency::arweave(),
                explorer: ARWEAVE_GATEWAY_URL.to_string(),
            },
            Self::Testnet => NetworkConfig {
                name: "Bundlr DevNet".to_string(),
                url: DEVNET_NODE_URL.to_string(),
                currency: Currency::arweave(),
                explorer: ARWEAVE_GATEWAY_URL.to_string(),
            },
        }
    }
}

impl std::fmt::Display for NetworkProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" | "devnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(format!("Unknown network: {}", other)),
        }
    }
}

/// Endpoint, currency and explorer for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Display name, e.g. `"Bundlr DevNet"`.
    pub name: String,
    /// Bundlr node base URL.
    pub url: String,
    pub currency: Currency,
    /// Base URL that transaction ids are appended to.
    pub explorer: String,
}

impl NetworkConfig {
    /// Permanent URL for an uploaded transaction.
    pub fn explorer_url(&self, tx_id: &str) -> String {
        format!("{}/{}", self.explorer.trim_end_matches('/'), tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_default_falls_back_to_testnet() {
        assert_eq!(NetworkProfile::parse_or_default("mainnet"), NetworkProfile::Mainnet);
        assert_eq!(NetworkProfile::parse_or_default("MAINNET "), NetworkProfile::Mainnet);
        assert_eq!(NetworkProfile::parse_or_default("testnet"), NetworkProfile::Testnet);
        assert_eq!(NetworkProfile::parse_or_default("goerli"), NetworkProfile::Testnet);
    }

    #[test]
    fn test_only_mainnet_is_balance_checked() {
        assert!(NetworkProfile::Mainnet.requires_balance_check());
        assert!(!NetworkProfile::Testnet.requires_balance_check());
    }

    #[test]
    fn test_profile_configs() {
        let test = NetworkProfile::Testnet.config();
        assert_eq!(test.name, "Bundlr DevNet");
        assert_eq!(test.url, DEVNET_NODE_URL);
        assert_eq!(test.currency.code, "arweave");

        let main = NetworkProfile::Mainnet.config();
        assert_eq!(main.name, "Bundlr Mainnet");
        assert_eq!(main.url, MAINNET_NODE_URL);
    }

    #[test]
    fn test_explorer_url_joins_with_single_slash() {
        let mut config = NetworkProfile::Testnet.config();
        assert_eq!(config.explorer_url("abc"), "https://arweave.net/abc");
        config.explorer = "https://arweave.net/".into();
        assert_eq!(config.explorer_url("abc"), "https://arweave.net/abc");
    }

    #[test]
    fn test_profile_serializes_lowercase() {
        let json = serde_json::to_string(&NetworkProfile::Mainnet).unwrap();
        assert_eq!(json, r#""mainnet""#);
    }
}
