//! Lease record
//!
//! A lease is an exclusive, TTL-bound claim on one machine, proven by its
//! nonce. The server enforces single-writer semantics; this record only
//! carries what the server granted.

use serde::{Deserialize, Serialize};

/// An exclusive, time-bounded claim on one machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// Opaque bearer token proving lease possession; attached as a header on
    /// every mutating call made under this lease
    pub nonce: String,
    /// Holder metadata reported by the server
    #[serde(default)]
    pub owner: Option<String>,
    /// Unix timestamp at which the lease expires on the server
    #[serde(default)]
    pub expires_at: Option<u64>,
    /// Granted TTL in seconds; absent means the server default was applied
    #[serde(default)]
    pub ttl: Option<u64>,
}
