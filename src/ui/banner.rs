//! Transient success/error banners.

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How long a banner stays visible.
pub const DEFAULT_BANNER_TTL: TimeDelta = TimeDelta::seconds(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Banner {
    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}

/// Newest-first banner stack with automatic expiry.
#[derive(Debug, Clone)]
pub struct Banners {
    ttl: TimeDelta,
    items: VecDeque<Banner>,
}

impl Default for Banners {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_TTL)
    }
}

impl Banners {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            items: VecDeque::new(),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn success(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.push(BannerKind::Success, message.into(), now);
    }

    pub fn error(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.push(BannerKind::Error, message.into(), now);
    }

    fn push(&mut self, kind: BannerKind, message: String, now: DateTime<Utc>) {
        self.prune(now);
        self.items.push_front(Banner {
            kind,
            message,
            raised_at: now,
        });
    }

    /// Drop banners older than the TTL.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.items.retain(|b| now - b.raised_at < ttl);
    }

    /// Banners still visible at `now`, newest first.
    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Banner> {
        let ttl = self.ttl;
        self.items.iter().filter(move |b| now - b.raised_at < ttl)
    }

    /// Most recent banner regardless of expiry.
    pub fn latest(&self) -> Option<&Banner> {
        self.items.front()
    }

    pub fn dismiss_all(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
