//! JSON-over-HTTP notifier.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CertError, HttpError};
use crate::notify::{CertificateRecord, Notifier};

/// POSTs each record as JSON to a fixed endpoint.
pub struct HttpNotifier {
    endpoint: String,
    client: Client,
    /// Bearer token. NEVER logged.
    api_key: Option<String>,
}

impl HttpNotifier {
    pub fn new(endpoint: &str) -> Result<Self, CertError> {
        #[allow(unused_mut)]
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(Duration::from_secs(10));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            client: builder.build().map_err(HttpError::from)?,
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl Notifier for HttpNotifier {
    async fn notify(&self, record: &CertificateRecord) -> Result<(), CertError> {
        let mut req = self.client.post(&self.endpoint).json(record);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(HttpError::from)?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(endpoint = %self.endpoint, "Certificate record delivered");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(HttpError::from_status(status.as_u16(), body).into())
    }
}
