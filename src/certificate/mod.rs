//! Certificate form input and document rendering.
//!
//! The "PDF" is a plain-text rendering of the certificate; only its bytes
//! and their hash matter downstream.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::sha256_hex;

/// The three fields the user fills in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateForm {
    pub holder: String,
    pub course: String,
    /// Issue date as entered (e.g. `"2024-01-01"`).
    pub date: String,
}

impl CertificateForm {
    pub fn new(
        holder: impl Into<String>,
        course: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            holder: holder.into(),
            course: course.into(),
            date: date.into(),
        }
    }

    /// All three fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.holder.is_empty() && !self.course.is_empty() && !self.date.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Hands out strictly increasing certificate ids seeded from the wall clock
/// in milliseconds.
#[derive(Debug, Default)]
pub struct CertificateIds {
    last: AtomicU64,
}

impl CertificateIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now: DateTime<Utc>) -> u64 {
        let candidate = now.timestamp_millis().max(0) as u64;
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let id = candidate.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, id, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return id,
                Err(current) => last = current,
            }
        }
    }
}

/// A rendered certificate and its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    pub id: u64,
    pub generated_at: DateTime<Utc>,
    pub bytes: Vec<u8>,
    /// SHA-256 of `bytes`, lowercase hex.
    pub hash: String,
}

impl CertificateDocument {
    /// Render and hash. Same inputs always give the same bytes.
    pub fn generate(form: &CertificateForm, id: u64, generated_at: DateTime<Utc>) -> Self {
        let bytes = render(form, id, generated_at);
        let hash = sha256_hex(&bytes);
        Self {
            id,
            generated_at,
            bytes,
            hash,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Plain-text certificate body.
pub fn render(form: &CertificateForm, id: u64, generated_at: DateTime<Utc>) -> Vec<u8> {
    format!(
        "CERTIFICATE OF PARTICIPATION\n\
         ============================\n\
         \n\
         Awarded to: {holder}\n\
         \n\
         For successfully completing the course:\n\
         \"{course}\"\n\
         \n\
         Issue date: {date}\n\
         \n\
         This certificate has been stored permanently\n\
         on the Arweave blockchain using Arweave.app.\n\
         \n\
         ID: {id}\n\
         Timestamp: {timestamp}\n",
        holder = form.holder,
        course = form.course,
        date = form.date,
        id = id,
        timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
    .into_bytes()
}
