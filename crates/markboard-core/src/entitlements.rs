//! Subscription-derived capacity limits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A count ceiling. Serialized as a signed integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Limit {
    Unlimited,
    AtMost(usize),
}

impl Limit {
    /// Whether a total of `count` stays within the ceiling.
    pub fn allows(&self, count: usize) -> bool {
        match self {
            Limit::Unlimited => true,
            Limit::AtMost(max) => count <= *max,
        }
    }
}

impl From<i64> for Limit {
    fn from(value: i64) -> Self {
        match usize::try_from(value) {
            Ok(max) => Limit::AtMost(max),
            // Any negative value is treated as unlimited
            Err(_) => Limit::Unlimited,
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Unlimited => -1,
            Limit::AtMost(max) => i64::try_from(max).unwrap_or(i64::MAX),
        }
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limit::Unlimited => f.write_str("unlimited"),
            Limit::AtMost(max) => write!(f, "{max}"),
        }
    }
}

/// Capacity errors. The rejected operation leaves all state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("Page limit reached ({limit} pages)")]
    PageLimit { limit: Limit },
    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: usize, limit: Limit },
}

/// Limits supplied by the entitlements collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entitlements {
    pub max_pages: Limit,
    pub max_upload_bytes: Limit,
}

impl Default for Entitlements {
    fn default() -> Self {
        Self {
            max_pages: Limit::Unlimited,
            max_upload_bytes: Limit::Unlimited,
        }
    }
}

impl Entitlements {
    /// Fail if an upload of `size` bytes exceeds the ceiling.
    pub fn check_upload(&self, size: usize) -> Result<(), CapacityError> {
        if self.max_upload_bytes.allows(size) {
            Ok(())
        } else {
            Err(CapacityError::UploadTooLarge {
                size,
                limit: self.max_upload_bytes,
            })
        }
    }
}
