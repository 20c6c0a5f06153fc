//! Armada-Core: Data Model and Retry Machinery
//!
//! This crate provides the shared foundation for the Armada fleet client:
//!
//! - The [`Machine`] and [`Lease`] records cached from the control plane
//! - The classified [`ArmadaError`] taxonomy every operation propagates
//! - The bounded exponential backoff combinator in [`retry`]
//!
//! The control plane owns the authoritative machine state; types here are
//! snapshots of the last fetch, never locally transitioned.

#![deny(missing_docs)]

pub mod errors;
pub mod lease;
pub mod machine;
pub mod retry;

pub use errors::{ArmadaError, Result};
pub use lease::Lease;
pub use machine::{Machine, MachineState};
pub use retry::{retry_with_backoff, BackoffPolicy, RetryClass, RetryError};
