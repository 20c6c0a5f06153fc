//! Ordered machine set and its membership algebra
//!
//! Removal matches on the underlying machine's id, not on handle identity or
//! lease state. The backing vector always exists: full removal leaves an
//! empty set, indistinguishable from a set that never held machines.

use crate::leased::LeasableMachine;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Caller-owned ordered collection of lease-bound machine handles
///
/// Not safe for unsynchronized concurrent mutation; the owning caller (or
/// external synchronization) is the single writer.
#[derive(Default)]
pub struct MachineSet {
    machines: Vec<Arc<dyn LeasableMachine>>,
}

impl MachineSet {
    /// Create a set over the given handles, preserving their order
    pub fn new(machines: Vec<Arc<dyn LeasableMachine>>) -> Self {
        Self { machines }
    }

    /// Current members in order
    pub fn machines(&self) -> &[Arc<dyn LeasableMachine>] {
        &self.machines
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether the set currently holds no machines
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Append handles, keeping existing members and their order
    pub fn add_machines(&mut self, machines: impl IntoIterator<Item = Arc<dyn LeasableMachine>>) {
        self.machines.extend(machines);
    }

    /// Remove every member whose machine id appears in `remove`, releasing
    /// each removed member's lease.
    ///
    /// Survivors keep their relative order. Ids in `remove` that match no
    /// member are ignored; an empty `remove` leaves the set untouched; the
    /// result of removing everything is an empty set, never an absent one.
    /// Lease release is best-effort: a failure is logged and the removal
    /// still succeeds, so this operation cannot fail once matching is done.
    pub async fn remove_machines(&mut self, remove: &[Arc<dyn LeasableMachine>]) {
        let remove_ids: HashSet<&str> = remove
            .iter()
            .map(|handle| handle.machine().id.as_str())
            .collect();

        let mut retained = Vec::with_capacity(self.machines.len());
        let mut removed = Vec::new();
        for handle in self.machines.drain(..) {
            if remove_ids.contains(handle.machine().id.as_str()) {
                removed.push(handle);
            } else {
                retained.push(handle);
            }
        }
        self.machines = retained;

        for handle in removed {
            if let Err(err) = handle.release_lease().await {
                warn!(
                    machine = %handle.machine().id,
                    error = %err,
                    "failed to release lease on removed machine"
                );
            }
        }
    }
}
