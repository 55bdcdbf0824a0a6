//! # certweave
//!
//! Issue certificates and store them permanently on Arweave through a Bundlr
//! node, paid for and signed by the Arweave.app browser wallet.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Hashing, amounts, network profiles, errors, certificate rendering
//! 2. **Wallet**: Capability trait, session adapter, `window.arweaveWallet` binding (WASM)
//! 3. **Bundler**: ANS-104 data items and `BundlrHttp`, the Bundlr node client
//! 4. **Upload Manager**: `UploadManager`, one funded-upload client per session
//! 5. **Notification**: Best-effort delivery of issued-certificate records
//! 6. **Workflow**: `CertificateApp` plus the app-owned view state it drives
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use certweave::prelude::*;
//!
//! let mut app = CertificateApp::builder()
//!     .wallet(wallet)
//!     .build()?;
//!
//! app.connect_wallet("testnet").await;
//! app.set_form(CertificateForm::new("Ana", "Intro", "2024-01-01"));
//! app.generate_certificate().await;
//!
//! if let Some(view) = app.result() {
//!     println!("{} -> {}", view.hash, view.url);
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Hashing, amounts, and shared newtypes.
pub mod shared;

/// Unified error types.
pub mod error;

/// Network profiles and endpoint constants.
pub mod network;

/// Certificate form input and document rendering.
pub mod certificate;

// ── Layer 2: Wallet ──────────────────────────────────────────────────────────

/// Wallet capability boundary and session adapter.
pub mod wallet;

// ── Layer 3: Bundler ─────────────────────────────────────────────────────────

/// Upload/funding client boundary, data items, HTTP node client.
pub mod bundlr;

// ── Layer 4: Upload Manager ──────────────────────────────────────────────────

/// `UploadManager`: connect, quote, balance check, upload.
pub mod upload;

// ── Layer 5: Notification ────────────────────────────────────────────────────

/// Best-effort external notification.
pub mod notify;

// ── Layer 6: Workflow ────────────────────────────────────────────────────────

/// App-owned view state: UI regions, banners, panels.
pub mod ui;

/// `CertificateApp`: the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared
    pub use crate::shared::{sha256_hex, Amount, Currency, TxId};

    // Errors
    pub use crate::error::{CertError, HttpError, UploadError, WalletError};

    // Network
    pub use crate::network::{NetworkConfig, NetworkProfile};

    // Certificate
    pub use crate::certificate::{CertificateDocument, CertificateForm};

    // Wallet
    pub use crate::wallet::{Permission, WalletDetails, WalletProvider, WalletSession};

    // Bundler
    pub use crate::bundlr::{Bundler, BundlerFactory, Signer, Tag, TagSet, UploadReceipt};
    #[cfg(feature = "http")]
    pub use crate::bundlr::{BundlrHttp, HttpBundlerFactory};

    // Upload
    pub use crate::upload::{ConnectionInfo, UploadManager, UploadMetadata, UploadResult};

    // Notification
    #[cfg(feature = "http")]
    pub use crate::notify::HttpNotifier;
    pub use crate::notify::{CertificateRecord, LogNotifier, Notifier};

    // Workflow
    pub use crate::client::{AppConfig, CertificateApp, CertificateAppBuilder};
    pub use crate::ui::{Banner, BannerKind, ResultView, UiState, WalletPanel, WalletStatus};
}
