//! Armada-Fleet: Lease-Bound Fleet Handles
//!
//! Builds on `armada-client` to hold a working set of machines for bulk
//! operations. A [`LeasedMachine`] couples a machine snapshot with the lease
//! nonce that gates mutations against it; a [`MachineSet`] is the caller's
//! ordered collection of such handles.
//!
//! A `MachineSet` is single-writer: it is mutated by its owning caller only
//! and adds no internal locking. Leases, enforced server-side, are the
//! serialization primitive across callers.

#![deny(missing_docs)]

pub mod leased;
pub mod set;

pub use leased::{LeasableMachine, LeasedMachine};
pub use set::MachineSet;
