//! Bundlr upload/funding client boundary.
//!
//! The upload manager only needs a handful of operations from a bundler:
//! readiness, the loaded balance, a price quote per byte length, and the
//! upload itself. [`Bundler`] captures exactly that, so the HTTP client in
//! [`client`] can be swapped for a test double.

pub mod data_item;

#[cfg(feature = "http")]
pub mod client;

#[cfg(feature = "http")]
pub use client::{BundlrHttp, HttpBundlerFactory};

use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CertError;
use crate::network::NetworkConfig;
use crate::shared::{Amount, Currency, TxId};

/// A name/value tag attached to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered tag list with unique names.
///
/// Pushing a name that already exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let tag = Tag::new(name, value);
        match self.tags.iter_mut().find(|t| t.name == tag.name) {
            Some(existing) => existing.value = tag.value,
            None => self.tags.push(tag),
        }
    }

    pub fn extend(&mut self, tags: impl IntoIterator<Item = Tag>) {
        for tag in tags {
            self.push(tag.name, tag.value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }

    pub fn into_vec(self) -> Vec<Tag> {
        self.tags
    }
}

/// Bundler acknowledgement of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: TxId,
    /// Node-side acceptance time in Unix millis, when reported.
    #[serde(default)]
    pub timestamp: Option<u64>,
}

/// Signs bundler data items on behalf of the connected wallet.
#[async_trait(?Send)]
pub trait Signer {
    /// Raw owner bytes (RSA modulus for Arweave keys).
    async fn public_key(&self) -> Result<Vec<u8>, CertError>;

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CertError>;
}

/// Operations the upload manager needs from a funded-upload client.
#[async_trait(?Send)]
pub trait Bundler {
    fn currency(&self) -> &Currency;

    /// Prepare the client (fetch the signer's key, derive the account).
    async fn ready(&mut self) -> Result<(), CertError>;

    /// Balance funded on the bundler for the connected account.
    async fn loaded_balance(&self) -> Result<Amount, CertError>;

    /// Price to store `byte_len` bytes.
    async fn price(&self, byte_len: u64) -> Result<Amount, CertError>;

    async fn upload(&self, data: &[u8], tags: &[Tag]) -> Result<UploadReceipt, CertError>;

    /// Atomic amount to a display string in whole units.
    fn to_display(&self, amount: Amount) -> Result<String, CertError> {
        Ok(self.currency().to_display(amount)?)
    }
}

/// Builds a bundler bound to one network and one signer.
pub trait BundlerFactory {
    fn create(
        &self,
        config: &NetworkConfig,
        signer: Rc<dyn Signer>,
    ) -> Result<Box<dyn Bundler>, CertError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_keeps_first_position_and_last_value() {
        let mut tags = TagSet::new();
        tags.push("Type", "certificate");
        tags.push("hash", "aa");
        tags.push("Type", "diploma");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.as_slice()[0], Tag::new("Type", "diploma"));
        assert_eq!(tags.get("hash"), Some("aa"));
        assert_eq!(tags.get("missing"), None);
    }

    #[test]
    fn test_receipt_timestamp_is_optional() {
        let receipt: UploadReceipt = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(receipt.id.as_str(), "abc");
        assert!(receipt.timestamp.is_none());
    }
}
