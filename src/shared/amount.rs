//! Atomic currency amounts and conversion to display units.
//!
//! Bundlr quotes prices and balances in the currency's smallest unit
//! (winston for Arweave, 10^12 per AR). [`Currency::to_display`] converts them
//! to the decimal string shown to users.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// An amount in atomic units. Ordered, so balances compare against prices
/// directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(#[serde(with = "crate::shared::serde_util::u128_string")] pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn new(atomic: u128) -> Self {
        Self(atomic)
    }

    pub fn atomic(&self) -> u128 {
        self.0
    }

    pub fn is_less_than(&self, other: &Amount) -> bool {
        self < other
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(v as u128)
    }
}

/// A bundler currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Identifier used in Bundlr URLs, e.g. `"arweave"`.
    pub code: String,
    /// Display ticker, e.g. `"AR"`.
    pub ticker: String,
    /// Atomic units per whole unit, as a power of ten.
    pub decimals: u32,
}

impl Currency {
    pub fn arweave() -> Self {
        Self {
            code: "arweave".to_string(),
            ticker: "AR".to_string(),
            decimals: 12,
        }
    }

    /// Convert an atomic amount to whole units.
    pub fn to_decimal(&self, amount: Amount) -> Result<Decimal, UploadError> {
        let atomic = i128::try_from(amount.0).map_err(|_| UploadError::AmountOverflow)?;
        Decimal::try_from_i128_with_scale(atomic, self.decimals)
            .map(|d| d.normalize())
            .map_err(|_| UploadError::AmountOverflow)
    }

    /// Human-readable amount without the ticker, e.g. `"0.000153"`.
    pub fn to_display(&self, amount: Amount) -> Result<String, UploadError> {
        Ok(self.to_decimal(amount)?.to_string())
    }
}
