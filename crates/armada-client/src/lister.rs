//! Fleet listing and role classification
//!
//! Machines carry their platform membership and process group as metadata
//! tags; classification is a set of pure predicates over those tags rather
//! than behavior on the machine record. The platform lister is the one place
//! in the client with built-in recovery: a `NotFound` from the list endpoint
//! can be an eventual-consistency window right after app creation, so it is
//! retried under a bounded backoff. Every other error class aborts at once.

use crate::client::MachinesClient;
use armada_core::{
    retry_with_backoff, ArmadaError, BackoffPolicy, Machine, Result, RetryClass, RetryError,
};
use std::time::Duration;
use tracing::debug;

/// Metadata key marking a machine as managed by the application platform
pub const PLATFORM_VERSION_TAG: &str = "armada_platform_version";

/// Metadata key carrying the machine's process group
pub const PROCESS_GROUP_TAG: &str = "armada_process_group";

/// Process group reserved for a deployment's release hook
pub const RELEASE_COMMAND_GROUP: &str = "release_command";

/// Process group reserved for interactive consoles
pub const CONSOLE_GROUP: &str = "console";

/// Whether the machine is managed by the application platform
pub fn is_platform_machine(machine: &Machine) -> bool {
    machine.metadata.contains_key(PLATFORM_VERSION_TAG)
}

/// Whether the machine runs a deployment's release hook
pub fn is_release_command_machine(machine: &Machine) -> bool {
    machine
        .metadata
        .get(PROCESS_GROUP_TAG)
        .is_some_and(|group| group == RELEASE_COMMAND_GROUP)
}

/// Whether the machine is a platform-reserved interactive console
pub fn is_console_machine(machine: &Machine) -> bool {
    machine
        .metadata
        .get(PROCESS_GROUP_TAG)
        .is_some_and(|group| group == CONSOLE_GROUP)
}

impl MachinesClient {
    /// List machines that can take workload right now: active and not in a
    /// reserved process group. Single attempt, no platform restriction.
    pub async fn list_active(&self) -> Result<Vec<Machine>> {
        let machines = self
            .list(None)
            .await
            .map_err(|err| err.context("failed to list active VMs"))?;

        Ok(machines
            .into_iter()
            .filter(|m| !is_release_command_machine(m) && !is_console_machine(m) && m.is_active())
            .collect())
    }

    /// List the platform-managed fleet, separating the at-most-one
    /// release-command machine from the workload machines.
    ///
    /// Workload machines are platform-managed, active, and in no reserved
    /// process group. Consoles and inactive machines are dropped from both
    /// outputs. Unlike the other list operations this retries `NotFound`
    /// responses (500ms initial interval, 5s cumulative budget) to ride out
    /// the index lag right after app creation; exhausting the budget returns
    /// a `RetriesExhausted`-marked error, any other class aborts immediately.
    pub async fn list_platform_machines(&self) -> Result<(Vec<Machine>, Option<Machine>)> {
        let policy = BackoffPolicy {
            initial_interval: Duration::from_millis(500),
            max_elapsed: Duration::from_secs(5),
            ..BackoffPolicy::default()
        };

        let client = self;
        let all = retry_with_backoff(&policy, move || async move {
            match client.list(None).await {
                Ok(machines) => Ok(machines),
                Err(err) if err.is_not_found() => {
                    debug!(error = %err, "machine index not ready, will retry");
                    Err(RetryClass::Transient(err))
                }
                Err(err) => Err(RetryClass::Permanent(err)),
            }
        })
        .await
        .map_err(|err| match err {
            RetryError::Permanent(err) => err,
            RetryError::Exhausted(err) => {
                ArmadaError::retries_exhausted("failed to list VMs", err)
            }
        })?;

        let mut workload = Vec::new();
        let mut release_command = None;
        for machine in all {
            if !machine.is_active() || is_console_machine(&machine) {
                continue;
            }
            if is_release_command_machine(&machine) {
                release_command = Some(machine);
            } else if is_platform_machine(&machine) {
                workload.push(machine);
            }
        }
        Ok((workload, release_command))
    }
}
