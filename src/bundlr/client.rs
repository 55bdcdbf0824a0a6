//! HTTP client for a Bundlr node: `BundlrHttp`.
//!
//! One method per node endpoint:
//!
//! - `GET  /price/{currency}/{bytes}` → atomic price (bare integer body)
//! - `GET  /account/balance/{currency}?address=…` → `{"balance": "…"}`
//! - `POST /tx/{currency}` with a signed ANS-104 data item → `{"id": …}`

use std::rc::Rc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::bundlr::data_item::DataItem;
use crate::bundlr::{Bundler, BundlerFactory, Signer, Tag, UploadReceipt};
use crate::error::{CertError, HttpError, UploadError};
use crate::network::NetworkConfig;
use crate::shared::{b64url_encode, Amount, Currency};

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(with = "crate::shared::serde_util::u128_string")]
    balance: u128,
}

/// Bundlr node client bound to one currency and one signer.
pub struct BundlrHttp {
    base_url: String,
    currency: Currency,
    client: Client,
    signer: Rc<dyn Signer>,
    /// Owner bytes and derived address, set by `ready()`.
    account: Option<(Vec<u8>, String)>,
}

impl BundlrHttp {
    pub fn new(
        base_url: &str,
        currency: Currency,
        signer: Rc<dyn Signer>,
    ) -> Result<Self, CertError> {
        #[allow(unused_mut)]
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder
                .timeout(Duration::from_secs(30))
                .pool_max_idle_per_host(10);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            currency,
            client: builder.build().map_err(HttpError::from)?,
            signer,
            account: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Account address derived from the signer's key, once ready.
    pub fn address(&self) -> Option<&str> {
        self.account.as_ref().map(|(_, address)| address.as_str())
    }

    fn account(&self) -> Result<&(Vec<u8>, String), CertError> {
        self.account
            .as_ref()
            .ok_or_else(|| UploadError::NotReady.into())
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn get_amount(&self, url: &str) -> Result<Amount, HttpError> {
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let text = check_status(resp).await?.text().await?;
        parse_amount(&text)
    }

    async fn post_bytes<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> Result<T, HttpError> {
        tracing::debug!(bytes = body.len(), "POST {}", url);
        let resp = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait(?Send)]
impl Bundler for BundlrHttp {
    fn currency(&self) -> &Currency {
        &self.currency
    }

    async fn ready(&mut self) -> Result<(), CertError> {
        let owner = self.signer.public_key().await?;
        let address = address_from_owner(&owner);
        tracing::debug!(address = %address, node = %self.base_url, "Bundlr client ready");
        self.account = Some((owner, address));
        Ok(())
    }

    async fn loaded_balance(&self) -> Result<Amount, CertError> {
        let (_, address) = self.account()?;
        let url = format!(
            "{}/account/balance/{}?address={}",
            self.base_url,
            self.currency.code,
            urlencoding::encode(address)
        );
        let resp: BalanceResponse = self.get_json(&url).await?;
        Ok(Amount(resp.balance))
    }

    async fn price(&self, byte_len: u64) -> Result<Amount, CertError> {
        let url = format!(
            "{}/price/{}/{}",
            self.base_url, self.currency.code, byte_len
        );
        Ok(self.get_amount(&url).await?)
    }

    async fn upload(&self, data: &[u8], tags: &[Tag]) -> Result<UploadReceipt, CertError> {
        let (owner, _) = self.account()?;
        let item = DataItem::create(self.signer.as_ref(), owner.clone(), tags, data).await?;
        let local_id = item.id().clone();

        let url = format!("{}/tx/{}", self.base_url, self.currency.code);
        let receipt: UploadReceipt = self.post_bytes(&url, item.into_bytes()).await?;
        if receipt.id != local_id {
            tracing::warn!(
                local = %local_id,
                remote = %receipt.id,
                "Bundler reported a different data item id"
            );
        }
        Ok(receipt)
    }
}

/// Arweave address: base64url(SHA-256(owner)).
pub fn address_from_owner(owner: &[u8]) -> String {
    b64url_encode(&Sha256::digest(owner))
}

fn parse_amount(body: &str) -> Result<Amount, HttpError> {
    body.trim()
        .trim_matches('"')
        .parse::<u128>()
        .map(Amount)
        .map_err(|_| HttpError::InvalidBody(format!("expected an integer amount, got {:?}", body)))
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, HttpError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(HttpError::from_status(status.as_u16(), body))
}

/// Builds [`BundlrHttp`] clients against the profile's node URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpBundlerFactory;

impl BundlerFactory for HttpBundlerFactory {
    fn create(
        &self,
        config: &NetworkConfig,
        signer: Rc<dyn Signer>,
    ) -> Result<Box<dyn Bundler>, CertError> {
        Ok(Box::new(BundlrHttp::new(
            &config.url,
            config.currency.clone(),
            signer,
        )?))
    }
}
