//! Upload manager: a funded-upload client bound to one network profile and
//! one wallet session.
//!
//! ```text
//! Uninitialized ──initialize()──▶ Connected { session, bundler }
//!       ▲                               │
//!       └──────── disconnect() ─────────┘
//! ```
//!
//! The session and the bundler only exist inside the `Connected` state, so
//! "connected" and "holds a client" can never disagree.

pub mod metadata;

pub use metadata::UploadMetadata;

use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bundlr::{Bundler, BundlerFactory, Signer, TagSet};
use crate::error::{CertError, UploadError, WalletError};
use crate::network::{NetworkConfig, NetworkProfile};
use crate::shared::TxId;
use crate::wallet::{Permission, WalletProvider, WalletSession, WALLET_LABEL};

/// Content type of every certificate upload.
pub const CONTENT_TYPE_PDF: &str = "application/pdf";

/// Value of the `Type` tag.
pub const DOCUMENT_TYPE: &str = "certificate";

/// Static labels written into every upload's base tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLabels {
    pub app_name: String,
    pub app_version: String,
    pub wallet_label: String,
}

impl Default for UploadLabels {
    fn default() -> Self {
        Self {
            app_name: "Certificate-System".to_string(),
            app_version: "1.0.0".to_string(),
            wallet_label: WALLET_LABEL.to_string(),
        }
    }
}

/// Returned by [`UploadManager::initialize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub address: String,
    /// Loaded bundler balance in whole units.
    pub balance: String,
    /// Network display name, e.g. `"Bundlr DevNet"`.
    pub network: String,
}

/// Outcome of a successful upload. Produced once, only displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub transaction_id: TxId,
    /// Explorer base + transaction id.
    pub url: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Quoted price in whole units of the network currency.
    pub cost: String,
    pub network: NetworkProfile,
    pub wallet: String,
    pub timestamp: DateTime<Utc>,
}

struct Connection {
    session: WalletSession,
    bundler: Box<dyn Bundler>,
}

enum ManagerState {
    Uninitialized,
    Connected(Connection),
}

/// Owns the bundler client lifecycle for one network profile.
pub struct UploadManager {
    profile: NetworkProfile,
    config: NetworkConfig,
    labels: UploadLabels,
    wallet: Weak<dyn WalletProvider>,
    factory: Rc<dyn BundlerFactory>,
    state: ManagerState,
}

impl UploadManager {
    pub fn new(
        profile: NetworkProfile,
        wallet: &Rc<dyn WalletProvider>,
        factory: Rc<dyn BundlerFactory>,
    ) -> Self {
        Self {
            profile,
            config: profile.config(),
            labels: UploadLabels::default(),
            wallet: Rc::downgrade(wallet),
            factory,
            state: ManagerState::Uninitialized,
        }
    }

    /// Override the profile's built-in endpoint configuration.
    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_labels(mut self, labels: UploadLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn profile(&self) -> NetworkProfile {
        self.profile
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ManagerState::Connected(_))
    }

    /// Address of the connected session, if any.
    pub fn address(&self) -> Option<&str> {
        match &self.state {
            ManagerState::Connected(conn) => Some(conn.session.address()),
            ManagerState::Uninitialized => None,
        }
    }

    /// Connect the wallet and bring up a bundler client.
    ///
    /// Any previous connection is dropped first. On failure the manager is
    /// left uninitialized.
    pub async fn initialize(&mut self) -> Result<ConnectionInfo, CertError> {
        self.state = ManagerState::Uninitialized;
        tracing::info!(network = %self.profile, "Initializing Bundlr with Arweave.app...");

        match self.connect().await {
            Ok((conn, info)) => {
                tracing::info!(
                    address = %info.address,
                    balance = %info.balance,
                    network = %info.network,
                    "Bundlr initialized with Arweave.app"
                );
                self.state = ManagerState::Connected(conn);
                Ok(info)
            }
            Err(e) => {
                tracing::error!("Error initializing Bundlr with Arweave.app: {}", e);
                Err(e)
            }
        }
    }

    async fn connect(&self) -> Result<(Connection, ConnectionInfo), CertError> {
        let wallet = self.wallet.upgrade().ok_or_else(unavailable)?;

        let session = WalletSession::connect(&wallet, &Permission::WITH_SIGNATURE)
            .await
            .map_err(|e| match e {
                WalletError::Unavailable => unavailable(),
                other => other.into(),
            })?;

        let signer: Rc<dyn Signer> = Rc::new(session.clone());
        let mut bundler = self
            .factory
            .create(&self.config, signer)
            .map_err(|e| CertError::Initialization(Box::new(e)))?;
        bundler
            .ready()
            .await
            .map_err(|e| CertError::Initialization(Box::new(e)))?;

        let address = wallet.active_address().await?;
        let balance = bundler.loaded_balance().await?;
        let info = ConnectionInfo {
            address,
            balance: bundler.to_display(balance)?,
            network: self.config.name.clone(),
        };

        Ok((Connection { session, bundler }, info))
    }

    fn connection(&self) -> Result<&Connection, CertError> {
        match &self.state {
            ManagerState::Connected(conn) => Ok(conn),
            ManagerState::Uninitialized => Err(UploadError::NotReady.into()),
        }
    }

    /// Upload a certificate document with base tags plus `metadata`.
    ///
    /// Initializes first when not connected. On mainnet the loaded balance
    /// must cover the quoted price.
    pub async fn upload_pdf(
        &mut self,
        bytes: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<UploadResult, CertError> {
        if !self.is_connected() {
            self.initialize().await?;
        }

        match self.upload_with(self.connection()?, bytes, metadata).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::error!("Error uploading PDF with Arweave.app: {}", e);
                if e.is_user_rejection() {
                    Err(UploadError::UserRejectedTransaction.into())
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn upload_with(
        &self,
        conn: &Connection,
        bytes: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<UploadResult, CertError> {
        let tags = self.build_tags(metadata, Utc::now());
        let size = bytes.len() as u64;

        let price = conn.bundler.price(size).await?;
        let cost = conn.bundler.to_display(price)?;
        tracing::debug!(size, cost = %cost, "Quoted upload price");

        if self.profile.requires_balance_check() {
            let balance = conn.bundler.loaded_balance().await?;
            if balance.is_less_than(&price) {
                return Err(UploadError::InsufficientBalance {
                    required: cost,
                    ticker: conn.bundler.currency().ticker.clone(),
                }
                .into());
            }
        }

        tracing::info!("Uploading PDF, Arweave.app will ask for confirmation");
        let receipt = conn.bundler.upload(bytes, tags.as_slice()).await?;
        let url = self.config.explorer_url(receipt.id.as_str());

        tracing::info!(tx_id = %receipt.id, url = %url, "PDF uploaded");

        Ok(UploadResult {
            transaction_id: receipt.id,
            url,
            size,
            cost,
            network: self.profile,
            wallet: self.labels.wallet_label.clone(),
            timestamp: Utc::now(),
        })
    }

    /// Base tags followed by one tag per truthy metadata entry.
    pub fn build_tags(&self, metadata: &UploadMetadata, now: DateTime<Utc>) -> TagSet {
        let mut tags = TagSet::new();
        tags.push("Content-Type", CONTENT_TYPE_PDF);
        tags.push("App-Name", self.labels.app_name.as_str());
        tags.push("App-Version", self.labels.app_version.as_str());
        tags.push("Wallet", self.labels.wallet_label.as_str());
        tags.push("Network", self.profile.as_str());
        tags.push("Type", DOCUMENT_TYPE);
        tags.push("Timestamp", now.timestamp_millis().to_string());
        tags.extend(metadata.to_tags());
        tags
    }

    /// Loaded bundler balance in whole units. Initializes first when needed.
    pub async fn get_balance(&mut self) -> Result<String, CertError> {
        if !self.is_connected() {
            self.initialize().await?;
        }
        let conn = self.connection()?;
        let balance = conn.bundler.loaded_balance().await?;
        conn.bundler.to_display(balance)
    }

    /// Disconnect the wallet session and drop the bundler client.
    ///
    /// State is always cleared. Returns an error only when the wallet
    /// provider had already gone away.
    pub async fn disconnect(&mut self) -> Result<(), CertError> {
        let state = std::mem::replace(&mut self.state, ManagerState::Uninitialized);
        if let ManagerState::Connected(conn) = state {
            let alive = conn.session.is_alive();
            conn.session.disconnect().await;
            if !alive {
                return Err(WalletError::Unavailable.into());
            }
        }
        Ok(())
    }
}

fn unavailable() -> CertError {
    CertError::Initialization(Box::new(WalletError::Unavailable.into()))
}
