//! Unified SDK error types.

use thiserror::Error;

/// Where users are sent when no wallet extension is injected.
pub const WALLET_INSTALL_URL: &str = "https://arweave.app";

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum CertError {
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Upload client setup failed; wraps the underlying cause.
    #[error("Failed to initialize uploader: {0}")]
    Initialization(#[source] Box<CertError>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl CertError {
    /// Whether this error (or the error it wraps) means the user declined a
    /// wallet prompt.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            CertError::Wallet(WalletError::UserRejected) => true,
            CertError::Upload(UploadError::UserRejectedTransaction) => true,
            CertError::Initialization(inner) => inner.is_user_rejection(),
            _ => false,
        }
    }

    /// Whether this error means no wallet extension is present.
    pub fn is_wallet_unavailable(&self) -> bool {
        match self {
            CertError::Wallet(WalletError::Unavailable) => true,
            CertError::Initialization(inner) => inner.is_wallet_unavailable(),
            _ => false,
        }
    }
}

/// Errors at the wallet capability boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Arweave.app not detected. Please install it from: {}", WALLET_INSTALL_URL)]
    Unavailable,

    #[error("User rejected the request in Arweave.app")]
    UserRejected,

    #[error("Failed to query wallet {what}: {reason}")]
    Query { what: &'static str, reason: String },

    #[error("Wallet provider error: {0}")]
    Provider(String),
}

impl WalletError {
    /// Classify a raw failure reason reported by the wallet extension.
    ///
    /// Wallets report rejections as free text; this is the single place that
    /// inspects it.
    pub fn from_reason(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if is_rejection_reason(&reason) {
            WalletError::UserRejected
        } else {
            WalletError::Provider(reason)
        }
    }
}

fn is_rejection_reason(reason: &str) -> bool {
    reason.to_ascii_lowercase().contains("reject")
}

/// Upload manager errors.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Insufficient balance. Required: {required} {ticker}")]
    InsufficientBalance { required: String, ticker: String },

    #[error("User rejected the transaction in Arweave.app")]
    UserRejectedTransaction,

    #[error("Bundler client is not ready")]
    NotReady,

    #[error("Invalid bundler response: {0}")]
    InvalidResponse(String),

    #[error("Amount does not fit the display range")]
    AmountOverflow,
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

impl HttpError {
    /// Map a non-success status and its body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => HttpError::Unauthorized,
            402 => HttpError::PaymentRequired(body),
            404 => HttpError::NotFound(body),
            429 => HttpError::RateLimited,
            400..=499 => HttpError::BadRequest(body),
            _ => HttpError::ServerError { status, body },
        }
    }
}
