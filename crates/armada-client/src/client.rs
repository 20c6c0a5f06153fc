//! Machines client
//!
//! One verb per control-plane operation. Every public operation wraps the
//! dispatcher's classified error with a message naming the operation and the
//! machine id; the classification survives wrapping, so callers can still
//! branch on `is_not_found` and friends.
//!
//! Mutating verbs take an optional lease nonce. A present nonce is attached
//! as a request header so the server can enforce single-writer semantics; an
//! absent or empty nonce sends an unauthenticated-for-lease mutation. The
//! client never adds local locking: lease possession is the serialization
//! primitive.

use crate::action::Action;
use crate::dispatch::{ApiCall, Dispatch};
use crate::observe::{Observe, TracingObserver};
use crate::requests::{
    ExecRequest, ExecResponse, LaunchSpec, ProcessInfo, RestartRequest, StartResponse,
    StopRequest,
};
use armada_core::{ArmadaError, Lease, Machine, MachineState, Result};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Lower clamp for the wait-for-state server-side timeout; protects against
/// degenerate zero waits
pub const WAIT_TIMEOUT_MIN: Duration = Duration::from_secs(1);

/// Upper clamp for the wait-for-state server-side timeout; keeps the request
/// under a fronting proxy's own timeout
pub const WAIT_TIMEOUT_MAX: Duration = Duration::from_secs(60);

/// Client for one app scope's machines on the control plane
///
/// All operations are synchronous from the caller's perspective: each call
/// blocks the task for one round trip. The client is `Send + Sync` and cheap
/// to share; ordering across distinct machines is not coordinated here.
pub struct MachinesClient {
    dispatch: Arc<dyn Dispatch>,
    observer: Arc<dyn Observe>,
}

impl MachinesClient {
    /// Create a client over a dispatcher, observing via `tracing`
    pub fn new(dispatch: Arc<dyn Dispatch>) -> Self {
        Self {
            dispatch,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observability sink
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observe>) -> Self {
        self.observer = observer;
        self
    }

    async fn send_decoded<T: DeserializeOwned>(&self, call: ApiCall) -> Result<T> {
        let action = call.action;
        let value = self.dispatch.send(call).await?;
        serde_json::from_value(value).map_err(|err| {
            ArmadaError::internal(format!("failed to decode {action} response: {err}"))
        })
    }

    async fn send_unit(&self, call: ApiCall) -> Result<()> {
        self.dispatch.send(call).await.map(|_| ())
    }

    /// Create a new machine
    pub async fn launch(&self, spec: &LaunchSpec) -> Result<Machine> {
        let started = Instant::now();
        let result = self.launch_inner(spec).await;
        self.observer
            .observe("machine_launch", result.is_ok(), started.elapsed());
        result
    }

    async fn launch_inner(&self, spec: &LaunchSpec) -> Result<Machine> {
        let body = serde_json::to_value(spec)
            .map_err(|err| ArmadaError::invalid_request(format!("bad launch spec: {err}")))?;
        self.send_decoded(ApiCall::new(Action::Launch).body(body))
            .await
            .map_err(|err| err.context("failed to launch VM"))
    }

    /// Replace a machine's configuration
    pub async fn update(
        &self,
        machine_id: &str,
        spec: &LaunchSpec,
        nonce: Option<&str>,
    ) -> Result<Machine> {
        let started = Instant::now();
        let result = self.update_inner(machine_id, spec, nonce).await;
        self.observer
            .observe("machine_update", result.is_ok(), started.elapsed());
        result
    }

    async fn update_inner(
        &self,
        machine_id: &str,
        spec: &LaunchSpec,
        nonce: Option<&str>,
    ) -> Result<Machine> {
        let body = serde_json::to_value(spec)
            .map_err(|err| ArmadaError::invalid_request(format!("bad update spec: {err}")))?;
        self.send_decoded(
            ApiCall::new(Action::Update)
                .machine(machine_id)
                .nonce(nonce)
                .body(body),
        )
        .await
        .map_err(|err| err.context(format!("failed to update VM {machine_id}")))
    }

    /// Boot a stopped machine
    pub async fn start(&self, machine_id: &str, nonce: Option<&str>) -> Result<StartResponse> {
        let started = Instant::now();
        let result = self
            .send_decoded(ApiCall::new(Action::Start).machine(machine_id).nonce(nonce))
            .await
            .map_err(|err| err.context(format!("failed to start VM {machine_id}")));
        self.observer
            .observe("machine_start", result.is_ok(), started.elapsed());
        result
    }

    /// Halt a running machine
    pub async fn stop(
        &self,
        machine_id: &str,
        request: &StopRequest,
        nonce: Option<&str>,
    ) -> Result<()> {
        let body = serde_json::to_value(request)
            .map_err(|err| ArmadaError::invalid_request(format!("bad stop request: {err}")))?;
        self.send_unit(
            ApiCall::new(Action::Stop)
                .machine(machine_id)
                .nonce(nonce)
                .body(body),
        )
        .await
        .map_err(|err| err.context(format!("failed to stop VM {machine_id}")))
    }

    /// Stop-then-start a machine; options travel as query parameters
    pub async fn restart(
        &self,
        machine_id: &str,
        request: &RestartRequest,
        nonce: Option<&str>,
    ) -> Result<()> {
        let mut call = ApiCall::new(Action::Restart)
            .machine(machine_id)
            .nonce(nonce)
            .query("force_stop", request.force_stop.to_string());
        if let Some(timeout) = request.timeout {
            call = call.query("timeout", timeout.to_string());
        }
        if let Some(signal) = &request.signal {
            call = call.query("signal", signal.clone());
        }
        self.send_unit(call)
            .await
            .map_err(|err| err.context(format!("failed to restart VM {machine_id}")))
    }

    /// Block server-side until the machine reaches `target_state`
    ///
    /// Defaults the target to `started`. Prefers the machine's `version` over
    /// its `instance_id` as the disambiguating identifier so the wait pins to
    /// a specific boot generation even if the machine is replaced in place.
    /// The timeout is clamped into `[1s, 60s]` regardless of caller input;
    /// one dispatcher call, no local polling.
    pub async fn wait(
        &self,
        machine: &Machine,
        target_state: Option<MachineState>,
        timeout: Duration,
    ) -> Result<()> {
        let state = target_state.unwrap_or(MachineState::Started);
        let instance = match &machine.version {
            Some(version) if !version.is_empty() => version.clone(),
            _ => machine.instance_id.clone(),
        };
        let timeout = timeout.clamp(WAIT_TIMEOUT_MIN, WAIT_TIMEOUT_MAX);

        self.send_unit(
            ApiCall::new(Action::Wait)
                .machine(&machine.id)
                .query("instance_id", instance)
                .query("timeout", timeout.as_secs().to_string())
                .query("state", state.as_str()),
        )
        .await
        .map_err(|err| {
            err.context(format!(
                "failed to wait for VM {} in {} state",
                machine.id, state
            ))
        })
    }

    /// Fetch one machine
    pub async fn get(&self, machine_id: &str) -> Result<Machine> {
        self.send_decoded(ApiCall::new(Action::Get).machine(machine_id))
            .await
            .map_err(|err| err.context(format!("failed to get VM {machine_id}")))
    }

    /// Fetch several machines sequentially, stopping at the first failure
    pub async fn get_many(&self, machine_ids: &[String]) -> Result<Vec<Machine>> {
        let mut machines = Vec::with_capacity(machine_ids.len());
        for id in machine_ids {
            machines.push(self.get(id).await?);
        }
        Ok(machines)
    }

    /// Fetch all machines, optionally filtered by state. Single attempt; the
    /// retrying variant is [`list_platform_machines`](Self::list_platform_machines).
    pub async fn list(&self, state: Option<MachineState>) -> Result<Vec<Machine>> {
        let mut call = ApiCall::new(Action::List);
        if let Some(state) = state {
            call = call.query("state", state.as_str());
        }
        self.send_decoded(call)
            .await
            .map_err(|err| err.context("failed to list VMs"))
    }

    /// Destroy a machine; `kill` forces teardown of a running machine
    pub async fn destroy(&self, machine_id: &str, kill: bool, nonce: Option<&str>) -> Result<()> {
        self.send_unit(
            ApiCall::new(Action::Destroy)
                .machine(machine_id)
                .nonce(nonce)
                .query("kill", kill.to_string()),
        )
        .await
        .map_err(|err| err.context(format!("failed to destroy VM {machine_id}")))
    }

    /// Deliver SIGKILL to a machine
    pub async fn kill(&self, machine_id: &str) -> Result<()> {
        self.send_unit(
            ApiCall::new(Action::Kill)
                .machine(machine_id)
                .body(json!({ "signal": 9 })),
        )
        .await
        .map_err(|err| err.context(format!("failed to kill VM {machine_id}")))
    }

    /// Read the current lease without acquiring it
    pub async fn find_lease(&self, machine_id: &str) -> Result<Lease> {
        self.send_decoded(ApiCall::new(Action::FindLease).machine(machine_id))
            .await
            .map_err(|err| err.context(format!("failed to get lease on VM {machine_id}")))
    }

    /// Acquire an exclusive lease; an absent `ttl` lets the server pick its
    /// default. Fails with `Conflict` while another holder's lease is active.
    pub async fn acquire_lease(&self, machine_id: &str, ttl: Option<u64>) -> Result<Lease> {
        let mut call = ApiCall::new(Action::AcquireLease).machine(machine_id);
        if let Some(ttl) = ttl {
            call = call.query("ttl", ttl.to_string());
        }
        let lease: Lease = self
            .send_decoded(call)
            .await
            .map_err(|err| err.context(format!("failed to get lease on VM {machine_id}")))?;
        debug!(machine = machine_id, owner = ?lease.owner, "got lease on machine");
        Ok(lease)
    }

    /// Extend a held lease; the caller must present the nonce it was granted.
    /// Fails with `Forbidden` once the nonce no longer matches the holder.
    pub async fn refresh_lease(
        &self,
        machine_id: &str,
        ttl: Option<u64>,
        nonce: &str,
    ) -> Result<Lease> {
        let mut call = ApiCall::new(Action::RefreshLease)
            .machine(machine_id)
            .nonce(Some(nonce));
        if let Some(ttl) = ttl {
            call = call.query("ttl", ttl.to_string());
        }
        let lease: Lease = self
            .send_decoded(call)
            .await
            .map_err(|err| err.context(format!("failed to get lease on VM {machine_id}")))?;
        debug!(machine = machine_id, owner = ?lease.owner, "refreshed lease on machine");
        Ok(lease)
    }

    /// Best-effort lease release, safe to call unconditionally in teardown
    /// paths: a missing or invalid nonce is treated as already-released.
    pub async fn release_lease(&self, machine_id: &str, nonce: Option<&str>) -> Result<()> {
        match self
            .send_unit(
                ApiCall::new(Action::ReleaseLease)
                    .machine(machine_id)
                    .nonce(nonce),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() || err.is_forbidden() => {
                debug!(machine = machine_id, error = %err, "lease already released");
                Ok(())
            }
            Err(err) => Err(err.context(format!("failed to release lease on VM {machine_id}"))),
        }
    }

    /// Take the machine out of the routing pool
    pub async fn cordon(&self, machine_id: &str, nonce: Option<&str>) -> Result<()> {
        let started = Instant::now();
        let result = self
            .send_unit(
                ApiCall::new(Action::Cordon)
                    .machine(machine_id)
                    .nonce(nonce),
            )
            .await
            .map_err(|err| err.context(format!("failed to cordon VM {machine_id}")));
        self.observer
            .observe("machine_cordon", result.is_ok(), started.elapsed());
        result
    }

    /// Put the machine back into the routing pool
    pub async fn uncordon(&self, machine_id: &str, nonce: Option<&str>) -> Result<()> {
        let started = Instant::now();
        let result = self
            .send_unit(
                ApiCall::new(Action::Uncordon)
                    .machine(machine_id)
                    .nonce(nonce),
            )
            .await
            .map_err(|err| err.context(format!("failed to uncordon VM {machine_id}")));
        self.observer
            .observe("machine_uncordon", result.is_ok(), started.elapsed());
        result
    }

    /// Run a command inside the machine
    pub async fn exec(&self, machine_id: &str, request: &ExecRequest) -> Result<ExecResponse> {
        let body = serde_json::to_value(request)
            .map_err(|err| ArmadaError::invalid_request(format!("bad exec request: {err}")))?;
        self.send_decoded(ApiCall::new(Action::Exec).machine(machine_id).body(body))
            .await
            .map_err(|err| err.context(format!("failed to exec on VM {machine_id}")))
    }

    /// List processes inside the machine
    pub async fn processes(&self, machine_id: &str) -> Result<Vec<ProcessInfo>> {
        self.send_decoded(ApiCall::new(Action::Processes).machine(machine_id))
            .await
            .map_err(|err| err.context(format!("failed to get processes from VM {machine_id}")))
    }
}
