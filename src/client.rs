//! High-level client: `CertificateApp`, the workflow controller.
//!
//! Owns the single [`UploadManager`] and every piece of view state. All
//! steps take `&mut self`, so one workflow is in flight at a time; the
//! `Busy` region additionally rejects re-entry if a step's future was
//! dropped half-way.
//!
//! Steps never return errors. Failures are logged and turned into error
//! banners, and the UI state falls back to the last stable region.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::bundlr::BundlerFactory;
use crate::certificate::{CertificateDocument, CertificateForm, CertificateIds};
use crate::error::{CertError, UploadError, WALLET_INSTALL_URL};
use crate::network::{NetworkConfig, NetworkProfile};
use crate::notify::{CertificateRecord, LogNotifier, Notifier};
use crate::ui::banner::DEFAULT_BANNER_TTL;
use crate::ui::{Banners, ResultView, UiState, WalletPanel, WalletStatus};
use crate::upload::{UploadLabels, UploadManager, UploadMetadata};
use crate::wallet::WalletProvider;

pub const CONNECTING_MESSAGE: &str = "Connecting to Arweave.app...";
pub const DISCONNECTING_MESSAGE: &str = "Disconnecting from Arweave.app...";
pub const GENERATING_MESSAGE: &str =
    "Generating certificate... Arweave.app will ask for confirmation";
pub const NOT_CONNECTED_MESSAGE: &str = "Please connect Arweave.app first";
pub const INCOMPLETE_FORM_MESSAGE: &str = "Please complete all fields";

/// Static application settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub app_version: String,
    /// Written into the `issuer` metadata tag.
    pub issuer: String,
    pub wallet_label: String,
    pub banner_ttl: TimeDelta,
    /// Replaces a profile's built-in endpoints.
    pub networks: HashMap<NetworkProfile, NetworkConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let labels = UploadLabels::default();
        Self {
            issuer: labels.app_name.clone(),
            app_name: labels.app_name,
            app_version: labels.app_version,
            wallet_label: labels.wallet_label,
            banner_ttl: DEFAULT_BANNER_TTL,
            networks: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn network_config(&self, profile: NetworkProfile) -> NetworkConfig {
        self.networks
            .get(&profile)
            .cloned()
            .unwrap_or_else(|| profile.config())
    }

    pub fn upload_labels(&self) -> UploadLabels {
        UploadLabels {
            app_name: self.app_name.clone(),
            app_version: self.app_version.clone(),
            wallet_label: self.wallet_label.clone(),
        }
    }
}

/// The certificate issuing workflow.
pub struct CertificateApp {
    config: AppConfig,
    wallet: Rc<dyn WalletProvider>,
    bundlers: Rc<dyn BundlerFactory>,
    notifier: Rc<dyn Notifier>,
    manager: Option<UploadManager>,
    state: UiState,
    form: CertificateForm,
    wallet_panel: Option<WalletPanel>,
    result: Option<ResultView>,
    banners: Banners,
    loading: Option<&'static str>,
    ids: CertificateIds,
}

impl CertificateApp {
    pub fn builder() -> CertificateAppBuilder {
        CertificateAppBuilder::default()
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    /// Profile of the active connection, if any.
    pub fn profile(&self) -> Option<NetworkProfile> {
        self.manager.as_ref().map(|m| m.profile())
    }

    pub fn form(&self) -> &CertificateForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CertificateForm {
        &mut self.form
    }

    pub fn set_form(&mut self, form: CertificateForm) {
        self.form = form;
    }

    pub fn wallet_panel(&self) -> Option<&WalletPanel> {
        self.wallet_panel.as_ref()
    }

    pub fn result(&self) -> Option<&ResultView> {
        self.result.as_ref()
    }

    pub fn banners(&self) -> &Banners {
        &self.banners
    }

    pub fn prune_banners(&mut self, now: DateTime<Utc>) {
        self.banners.prune(now);
    }

    /// Message for the loading overlay while a step runs.
    pub fn loading_message(&self) -> Option<&str> {
        self.loading
    }

    pub fn wallet_status(&self) -> WalletStatus {
        if self.wallet.is_present() {
            WalletStatus::Detected
        } else {
            WalletStatus::NotDetected {
                install_url: WALLET_INSTALL_URL.to_string(),
            }
        }
    }

    // ── Workflow steps ───────────────────────────────────────────────────

    /// Connect the wallet on the named network (`"testnet"` / `"mainnet"`).
    ///
    /// Any previous upload manager is replaced. The profile stays fixed
    /// until the next connect.
    pub async fn connect_wallet(&mut self, network: &str) {
        if self.state == UiState::Busy {
            tracing::warn!("connect_wallet ignored, another step is running");
            return;
        }

        let profile = NetworkProfile::parse_or_default(network);
        self.begin(CONNECTING_MESSAGE);
        self.manager = None;
        self.result = None;

        let mut manager = UploadManager::new(profile, &self.wallet, self.bundlers.clone())
            .with_config(self.config.network_config(profile))
            .with_labels(self.config.upload_labels());

        let outcome = manager.initialize().await;
        self.loading = None;
        let now = Utc::now();

        match outcome {
            Ok(info) => {
                self.wallet_panel = Some(WalletPanel::new(&info, profile));
                self.manager = Some(manager);
                self.state = UiState::ConnectedIdle;
                self.banners
                    .success(format!("Connected to {}", self.config.wallet_label), now);
            }
            Err(e) => {
                tracing::error!(network = %profile, "Error connecting Arweave.app: {}", e);
                self.wallet_panel = None;
                self.state = UiState::Disconnected;
                self.banners.error(e.to_string(), now);
            }
        }
    }

    /// Drop the connection and clear every wallet-dependent region.
    ///
    /// Always ends `Disconnected`. A disconnect failure only raises a banner.
    pub async fn disconnect_wallet(&mut self) {
        self.begin(DISCONNECTING_MESSAGE);

        let outcome = match self.manager.take() {
            Some(mut manager) => manager.disconnect().await,
            None => Ok(()),
        };

        self.loading = None;
        self.wallet_panel = None;
        self.result = None;
        self.form.clear();
        self.state = UiState::Disconnected;

        let now = Utc::now();
        match outcome {
            Ok(()) => {
                tracing::info!("Disconnected from Arweave.app");
                self.banners
                    .success(format!("Disconnected from {}", self.config.wallet_label), now);
            }
            Err(e) => {
                tracing::warn!("Error disconnecting: {}", e);
                self.banners.error(format!("Error disconnecting: {e}"), now);
            }
        }
    }

    /// Render, hash, upload and show the certificate described by the form.
    ///
    /// The form is cleared only on success.
    pub async fn generate_certificate(&mut self) {
        let now = Utc::now();
        if self.state == UiState::Busy {
            tracing::warn!("generate_certificate ignored, another step is running");
            return;
        }
        if !self.state.is_connected_idle() || self.manager.is_none() {
            self.banners.error(NOT_CONNECTED_MESSAGE, now);
            return;
        }
        if !self.form.is_complete() {
            self.banners.error(INCOMPLETE_FORM_MESSAGE, now);
            return;
        }

        self.begin(GENERATING_MESSAGE);
        let outcome = self.issue(now).await;
        self.loading = None;

        match outcome {
            Ok(view) => {
                self.result = Some(view);
                self.form.clear();
                self.state = UiState::ResultShown;
            }
            Err(e) => {
                tracing::error!("Error generating certificate: {}", e);
                self.state = UiState::ConnectedIdle;
                self.banners.error(format!("Error: {e}"), Utc::now());
            }
        }
    }

    fn begin(&mut self, message: &'static str) {
        self.state = UiState::Busy;
        self.loading = Some(message);
    }

    async fn issue(&mut self, generated_at: DateTime<Utc>) -> Result<ResultView, CertError> {
        let form = self.form.clone();
        let id = self.ids.next(generated_at);
        let document = CertificateDocument::generate(&form, id, generated_at);
        tracing::debug!(id, hash = %document.hash, size = document.size(), "Certificate rendered");

        let metadata = UploadMetadata::new()
            .with("holder", form.holder.as_str())
            .with("course", form.course.as_str())
            .with("date", form.date.as_str())
            .with("hash", document.hash.as_str())
            .with("issuer", self.config.issuer.as_str())
            .with("version", self.config.app_version.as_str());

        let manager = self.manager.as_mut().ok_or(UploadError::NotReady)?;
        let result = manager.upload_pdf(&document.bytes, &metadata).await?;
        let ticker = manager.config().currency.ticker.clone();

        let record = CertificateRecord {
            hash: document.hash.clone(),
            transaction_id: result.transaction_id.clone(),
            holder: form.holder,
            course: form.course,
            issue_date: form.date,
            url: result.url.clone(),
            timestamp: Utc::now(),
            size: result.size,
            wallet: result.wallet.clone(),
            network: result.network,
        };
        if let Err(e) = self.notifier.notify(&record).await {
            tracing::warn!(tx_id = %record.transaction_id, "Could not deliver certificate record: {}", e);
        }

        Ok(ResultView::new(&result, &document.hash, &ticker))
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct CertificateAppBuilder {
    config: AppConfig,
    issuer: Option<String>,
    wallet: Option<Rc<dyn WalletProvider>>,
    bundlers: Option<Rc<dyn BundlerFactory>>,
    notifier: Option<Rc<dyn Notifier>>,
}

impl CertificateAppBuilder {
    pub fn app_name(mut self, name: &str) -> Self {
        self.config.app_name = name.to_string();
        self
    }

    pub fn app_version(mut self, version: &str) -> Self {
        self.config.app_version = version.to_string();
        self
    }

    /// Issuer label. Defaults to the app name.
    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = Some(issuer.to_string());
        self
    }

    pub fn wallet_label(mut self, label: &str) -> Self {
        self.config.wallet_label = label.to_string();
        self
    }

    pub fn banner_ttl(mut self, ttl: TimeDelta) -> Self {
        self.config.banner_ttl = ttl;
        self
    }

    /// Point a profile at different endpoints.
    pub fn network(mut self, profile: NetworkProfile, config: NetworkConfig) -> Self {
        self.config.networks.insert(profile, config);
        self
    }

    pub fn wallet(mut self, wallet: Rc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn bundler_factory(mut self, factory: Rc<dyn BundlerFactory>) -> Self {
        self.bundlers = Some(factory);
        self
    }

    pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<CertificateApp, CertError> {
        let mut config = self.config;
        config.issuer = self.issuer.unwrap_or_else(|| config.app_name.clone());

        let wallet = match self.wallet {
            Some(wallet) => wallet,
            None => default_wallet()?,
        };
        let bundlers = match self.bundlers {
            Some(factory) => factory,
            None => default_bundler_factory()?,
        };
        let notifier = self.notifier.unwrap_or_else(|| Rc::new(LogNotifier));

        Ok(CertificateApp {
            banners: Banners::new(config.banner_ttl),
            config,
            wallet,
            bundlers,
            notifier,
            manager: None,
            state: UiState::Disconnected,
            form: CertificateForm::default(),
            wallet_panel: None,
            result: None,
            loading: None,
            ids: CertificateIds::new(),
        })
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn default_wallet() -> Result<Rc<dyn WalletProvider>, CertError> {
    Ok(Rc::new(crate::wallet::wasm::InjectedWallet::new()))
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn default_wallet() -> Result<Rc<dyn WalletProvider>, CertError> {
    Err(CertError::Validation(
        "a wallet provider is required outside the browser".to_string(),
    ))
}

#[cfg(feature = "http")]
fn default_bundler_factory() -> Result<Rc<dyn BundlerFactory>, CertError> {
    Ok(Rc::new(crate::bundlr::HttpBundlerFactory))
}

#[cfg(not(feature = "http"))]
fn default_bundler_factory() -> Result<Rc<dyn BundlerFactory>, CertError> {
    Err(CertError::Validation(
        "a bundler factory is required without the `http` feature".to_string(),
    ))
}
