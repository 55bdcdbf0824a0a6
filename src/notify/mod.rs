//! Best-effort notification of issued certificates to an external index.
//!
//! The workflow never fails because of a notifier: callers log and discard
//! any error returned here.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpNotifier;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CertError;
use crate::network::NetworkProfile;
use crate::shared::TxId;

/// Record sent after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub hash: String,
    pub transaction_id: TxId,
    pub holder: String,
    pub course: String,
    pub issue_date: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub size: u64,
    pub wallet: String,
    pub network: NetworkProfile,
}

/// Sink for [`CertificateRecord`]s.
#[async_trait(?Send)]
pub trait Notifier {
    async fn notify(&self, record: &CertificateRecord) -> Result<(), CertError>;
}

/// Logs the record and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait(?Send)]
impl Notifier for LogNotifier {
    async fn notify(&self, record: &CertificateRecord) -> Result<(), CertError> {
        tracing::info!(
            hash = %record.hash,
            tx_id = %record.transaction_id,
            network = %record.network,
            "Certificate record ready for indexing"
        );
        Ok(())
    }
}
