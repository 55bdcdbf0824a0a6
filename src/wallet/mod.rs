//! Wallet capability boundary.
//!
//! The wallet extension (Arweave.app on the web) owns the keys and the
//! session. This crate only talks to it through [`WalletProvider`], a narrow
//! capability contract:
//!
//! - `connect(permissions)` / `disconnect()`
//! - `active_address()`, `balance(address)`, `active_public_key()`
//! - `sign_message(data)` (RSA-PSS, used to sign bundler data items)
//!
//! [`WalletSession`] is the adapter the rest of the SDK uses. It classifies
//! provider failures (rejections vs. everything else) and holds only a weak
//! handle to the provider.

pub mod session;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use session::WalletSession;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Display label for the supported wallet.
pub const WALLET_LABEL: &str = "Arweave.app";

/// A capability requested from the wallet on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    AccessAddress,
    SignTransaction,
    AccessPublicKey,
    Signature,
}

impl Permission {
    /// Capabilities every session needs.
    pub const REQUIRED: [Permission; 3] = [
        Permission::AccessAddress,
        Permission::SignTransaction,
        Permission::AccessPublicKey,
    ];

    /// Required capabilities plus arbitrary message signing.
    pub const WITH_SIGNATURE: [Permission; 4] = [
        Permission::AccessAddress,
        Permission::SignTransaction,
        Permission::AccessPublicKey,
        Permission::Signature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessAddress => "ACCESS_ADDRESS",
            Self::SignTransaction => "SIGN_TRANSACTION",
            Self::AccessPublicKey => "ACCESS_PUBLIC_KEY",
            Self::Signature => "SIGNATURE",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Address, balance and public key of the active wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDetails {
    pub address: String,
    /// Balance as reported by the wallet (winston string).
    pub balance: String,
    /// Base64url-encoded RSA modulus.
    pub public_key: String,
}

/// Winston string for a balance the wallet reported as a JS number.
///
/// Only finite, non-negative whole numbers are accepted.
pub fn balance_from_number(n: f64) -> Result<String, WalletError> {
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return Err(WalletError::Provider(format!(
            "getBalance returned an invalid amount: {n}"
        )));
    }
    Ok(format!("{n:.0}"))
}

/// Capabilities exposed by an injected wallet.
///
/// Implementations return raw provider failures as
/// [`WalletError::Provider`]; classification into rejections happens in
/// [`WalletSession`]. Futures are `?Send`: the browser wallet lives on the
/// single UI thread.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Whether the extension is installed and injected.
    fn is_present(&self) -> bool;

    async fn connect(&self, permissions: &[Permission]) -> Result<(), WalletError>;

    async fn active_address(&self) -> Result<String, WalletError>;

    async fn balance(&self, address: &str) -> Result<String, WalletError>;

    async fn active_public_key(&self) -> Result<String, WalletError>;

    /// Sign arbitrary bytes with RSA-PSS (salt length 32).
    async fn sign_message(&self, data: &[u8]) -> Result<Vec<u8>, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;
}
