//! App-owned view state: UI regions, banners, panels.
//!
//! The controller updates these containers; whatever renders the page
//! (DOM bindings, a TUI, a test) only reads them.

pub mod banner;

pub use banner::{Banner, BannerKind, Banners};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::network::NetworkProfile;
use crate::shared::short_address;
use crate::upload::{ConnectionInfo, UploadResult};

/// Which region of the page is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiState {
    #[default]
    Disconnected,
    ConnectedIdle,
    Busy,
    ResultShown,
}

impl UiState {
    /// Whether a wallet session is active and no step is running.
    pub fn is_connected_idle(&self) -> bool {
        matches!(self, Self::ConnectedIdle | Self::ResultShown)
    }
}

/// Whether a wallet extension was found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletStatus {
    Detected,
    NotDetected { install_url: String },
}

/// Wallet info shown after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletPanel {
    /// `first8...last8`.
    pub address: String,
    pub balance: String,
    pub network: String,
}

impl WalletPanel {
    pub fn new(info: &ConnectionInfo, profile: NetworkProfile) -> Self {
        Self {
            address: short_address(&info.address),
            balance: info.balance.clone(),
            network: profile.label().to_string(),
        }
    }
}

/// Result area for an issued certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultView {
    pub hash: String,
    pub transaction_id: String,
    pub url: String,
    /// Cost with ticker, e.g. `"0.000153 AR"`.
    pub cost: String,
    pub wallet: String,
    pub network: String,
    pub size: String,
    pub timestamp: String,
    #[serde(skip)]
    pub result: Option<UploadResult>,
}

impl ResultView {
    pub fn new(result: &UploadResult, hash: &str, ticker: &str) -> Self {
        Self {
            hash: hash.to_string(),
            transaction_id: result.transaction_id.to_string(),
            url: result.url.clone(),
            cost: format!("{} {}", result.cost, ticker),
            wallet: result.wallet.clone(),
            network: result.network.to_string(),
            size: format!("{} bytes", result.size),
            timestamp: format_timestamp(&result.timestamp),
            result: Some(result.clone()),
        }
    }
}

/// Human-readable timestamp for the result view.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
