//! Wallet session adapter: connect, details, disconnect, signing.

use std::rc::{Rc, Weak};

use async_trait::async_trait;

use crate::bundlr::Signer;
use crate::error::{CertError, WalletError};
use crate::shared::b64url_decode;
use crate::wallet::{Permission, WalletDetails, WalletProvider};

/// A connected wallet session.
///
/// The provider is owned by the application; the session keeps a weak
/// handle so that dropping the provider ends every session bound to it.
#[derive(Clone)]
pub struct WalletSession {
    wallet: Weak<dyn WalletProvider>,
    address: String,
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.address)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl WalletSession {
    /// Request `permissions` from the wallet and open a session.
    ///
    /// Fails with [`WalletError::Unavailable`] when no wallet is injected and
    /// [`WalletError::UserRejected`] when the user declines the prompt.
    pub async fn connect(
        wallet: &Rc<dyn WalletProvider>,
        permissions: &[Permission],
    ) -> Result<Self, WalletError> {
        if !wallet.is_present() {
            return Err(WalletError::Unavailable);
        }

        wallet.connect(permissions).await.map_err(|e| {
            let e = classify(e);
            tracing::error!("Error connecting to Arweave.app: {}", e);
            e
        })?;

        let address = wallet.active_address().await.map_err(classify)?;
        tracing::info!(address = %address, "Connected to Arweave.app");

        Ok(Self {
            wallet: Rc::downgrade(wallet),
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether the provider behind this session still exists.
    pub fn is_alive(&self) -> bool {
        self.wallet.strong_count() > 0
    }

    pub(crate) fn provider(&self) -> Result<Rc<dyn WalletProvider>, WalletError> {
        self.wallet.upgrade().ok_or(WalletError::Unavailable)
    }

    /// Fetch address, balance and public key. All three must succeed.
    pub async fn details(&self) -> Result<WalletDetails, WalletError> {
        let wallet = self.provider()?;

        let address = wallet
            .active_address()
            .await
            .map_err(|e| query_error("address", e))?;
        let balance = wallet
            .balance(&address)
            .await
            .map_err(|e| query_error("balance", e))?;
        let public_key = wallet
            .active_public_key()
            .await
            .map_err(|e| query_error("public key", e))?;

        Ok(WalletDetails {
            address,
            balance,
            public_key,
        })
    }

    /// Best-effort disconnect. Failures are logged, never returned.
    pub async fn disconnect(&self) {
        let wallet = match self.provider() {
            Ok(w) => w,
            Err(_) => {
                tracing::warn!("Wallet already gone, nothing to disconnect");
                return;
            }
        };
        match wallet.disconnect().await {
            Ok(()) => tracing::info!("Disconnected from Arweave.app"),
            Err(e) => tracing::warn!("Error disconnecting from Arweave.app: {}", e),
        }
    }
}

/// Turn raw provider text into a typed rejection where it is one.
fn classify(err: WalletError) -> WalletError {
    match err {
        WalletError::Provider(reason) => WalletError::from_reason(reason),
        other => other,
    }
}

fn query_error(what: &'static str, err: WalletError) -> WalletError {
    tracing::error!("Error querying Arweave.app {}: {}", what, err);
    let reason = match err {
        WalletError::Provider(reason) => reason,
        other => other.to_string(),
    };
    WalletError::Query { what, reason }
}

#[async_trait(?Send)]
impl Signer for WalletSession {
    async fn public_key(&self) -> Result<Vec<u8>, CertError> {
        let wallet = self.provider()?;
        let owner = wallet.active_public_key().await.map_err(classify)?;
        b64url_decode(&owner).map_err(|e| {
            CertError::Wallet(WalletError::Provider(format!("Malformed public key: {}", e)))
        })
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CertError> {
        let wallet = self.provider()?;
        Ok(wallet.sign_message(message).await.map_err(classify)?)
    }
}
