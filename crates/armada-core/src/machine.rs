//! Machine snapshot record
//!
//! A [`Machine`] is the last-fetched view of a remote compute resource. The
//! control plane owns the state machine; nothing here transitions locally.
//! Role classification (release-command, console, platform membership) is
//! derived from `metadata` by the lister in `armada-client`, keeping this a
//! plain data record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Control-plane-owned lifecycle state of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    /// Created but never booted
    Created,
    /// Boot in progress
    Starting,
    /// Running
    Started,
    /// Shutdown in progress
    Stopping,
    /// Halted but still provisioned
    Stopped,
    /// Being replaced in place with a new boot generation
    Replacing,
    /// Teardown in progress
    Destroying,
    /// Gone
    Destroyed,
}

impl MachineState {
    /// Wire representation of the state
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Starting => "starting",
            Self::Started => "started",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Replacing => "replacing",
            Self::Destroying => "destroying",
            Self::Destroyed => "destroyed",
        }
    }
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a remote machine as last fetched from the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// Opaque machine identifier
    pub id: String,
    /// Human-readable name, if the control plane assigned one
    #[serde(default)]
    pub name: Option<String>,
    /// Current lifecycle state
    pub state: MachineState,
    /// Identifier of the current boot instance
    #[serde(default)]
    pub instance_id: String,
    /// Boot generation version; preferred over `instance_id` when waiting for
    /// a state change on a machine that may be replaced in place
    #[serde(default)]
    pub version: Option<String>,
    /// Control-plane metadata tags (platform membership, process group, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Machine {
    /// Whether the machine is still part of the working fleet, i.e. not
    /// destroyed and not on its way out
    pub const fn is_active(&self) -> bool {
        !matches!(
            self.state,
            MachineState::Destroying | MachineState::Destroyed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(state: MachineState) -> Machine {
        Machine {
            id: "m1".to_string(),
            name: None,
            state,
            instance_id: "inst-1".to_string(),
            version: None,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn active_excludes_destroyed_and_destroying() {
        assert!(machine(MachineState::Started).is_active());
        assert!(machine(MachineState::Stopped).is_active());
        assert!(!machine(MachineState::Destroying).is_active());
        assert!(!machine(MachineState::Destroyed).is_active());
    }

    #[test]
    fn state_roundtrips_through_wire_form() {
        let json = serde_json::to_string(&MachineState::Replacing).unwrap();
        assert_eq!(json, "\"replacing\"");
        let state: MachineState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, MachineState::Replacing);
    }

    #[test]
    fn machine_decodes_with_missing_optional_fields() {
        let m: Machine =
            serde_json::from_str(r#"{"id":"m2","state":"started"}"#).unwrap();
        assert_eq!(m.id, "m2");
        assert_eq!(m.instance_id, "");
        assert!(m.version.is_none());
        assert!(m.metadata.is_empty());
    }
}
