//! Lease-bound machine handles

use armada_client::MachinesClient;
use armada_core::{Lease, Machine, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// A machine plus the capability to release the lease held on it
///
/// The set algebra in [`crate::MachineSet`] works against this trait so
/// tests can substitute handles that never touch the network.
#[async_trait]
pub trait LeasableMachine: Send + Sync {
    /// The machine snapshot this handle is bound to
    fn machine(&self) -> &Machine;

    /// Release the held lease. Best-effort: callers treat failures as
    /// non-fatal in teardown paths.
    async fn release_lease(&self) -> Result<()>;
}

/// Production handle: a machine with a live lease on the control plane
///
/// The nonce is fixed at acquisition; refreshing extends the TTL under the
/// same nonce, so the handle never mutates.
pub struct LeasedMachine {
    client: Arc<MachinesClient>,
    machine: Machine,
    nonce: String,
}

impl LeasedMachine {
    /// Acquire a lease on `machine` and wrap it into a handle
    pub async fn acquire(
        client: Arc<MachinesClient>,
        machine: Machine,
        ttl: Option<u64>,
    ) -> Result<Self> {
        let lease = client.acquire_lease(&machine.id, ttl).await?;
        debug!(machine = %machine.id, "bound machine to lease");
        Ok(Self {
            client,
            machine,
            nonce: lease.nonce,
        })
    }

    /// Wrap a machine with a lease nonce obtained elsewhere
    pub fn from_lease(client: Arc<MachinesClient>, machine: Machine, lease: &Lease) -> Self {
        Self {
            client,
            machine,
            nonce: lease.nonce.clone(),
        }
    }

    /// The nonce proving lease possession; attach it to mutating calls
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Extend the lease before its TTL expires. Long-running mutation
    /// sequences must schedule this themselves; there is no refresh loop.
    pub async fn refresh(&self, ttl: Option<u64>) -> Result<Lease> {
        self.client
            .refresh_lease(&self.machine.id, ttl, &self.nonce)
            .await
    }
}

#[async_trait]
impl LeasableMachine for LeasedMachine {
    fn machine(&self) -> &Machine {
        &self.machine
    }

    async fn release_lease(&self) -> Result<()> {
        self.client
            .release_lease(&self.machine.id, Some(&self.nonce))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armada_client::Action;
    use armada_testkit::{lease_json, machine, MockDispatch};
    use armada_core::MachineState;

    #[tokio::test]
    async fn acquire_binds_the_granted_nonce() {
        let dispatch = Arc::new(MockDispatch::new());
        dispatch.script_ok(Action::AcquireLease, lease_json("nonce-1", Some(30)));
        let client = Arc::new(MachinesClient::new(dispatch.clone()));

        let leased = LeasedMachine::acquire(client, machine("m1", MachineState::Started), Some(30))
            .await
            .unwrap();
        assert_eq!(leased.nonce(), "nonce-1");
        assert_eq!(leased.machine().id, "m1");

        let acquire_calls = dispatch.calls_for(Action::AcquireLease);
        assert_eq!(acquire_calls.len(), 1);
        assert_eq!(acquire_calls[0].query_value("ttl"), Some("30"));
    }

    #[tokio::test]
    async fn release_sends_the_bound_nonce() {
        let dispatch = Arc::new(MockDispatch::new());
        dispatch.script_ok(Action::AcquireLease, lease_json("nonce-2", None));
        let client = Arc::new(MachinesClient::new(dispatch.clone()));

        let leased = LeasedMachine::acquire(client, machine("m2", MachineState::Started), None)
            .await
            .unwrap();
        leased.release_lease().await.unwrap();

        let release_calls = dispatch.calls_for(Action::ReleaseLease);
        assert_eq!(release_calls.len(), 1);
        assert_eq!(release_calls[0].nonce.as_deref(), Some("nonce-2"));
        assert_eq!(release_calls[0].machine_id.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn refresh_reuses_the_nonce() {
        let dispatch = Arc::new(MockDispatch::new());
        dispatch.script_ok(Action::AcquireLease, lease_json("nonce-3", None));
        dispatch.script_ok(Action::RefreshLease, lease_json("nonce-3", Some(60)));
        let client = Arc::new(MachinesClient::new(dispatch.clone()));

        let leased = LeasedMachine::acquire(client, machine("m3", MachineState::Started), None)
            .await
            .unwrap();
        let lease = leased.refresh(Some(60)).await.unwrap();
        assert_eq!(lease.nonce, "nonce-3");

        let refresh_calls = dispatch.calls_for(Action::RefreshLease);
        assert_eq!(refresh_calls[0].nonce.as_deref(), Some("nonce-3"));
        assert_eq!(refresh_calls[0].query_value("ttl"), Some("60"));
    }
}
