//! Typed request and response payloads
//!
//! Thin records over the wire schema. The machine configuration itself is an
//! opaque `serde_json::Value` passthrough; this core only inspects the
//! fields named in the data model.

use armada_core::MachineState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input for launching a new machine or updating an existing one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Requested machine name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Placement region hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Opaque machine configuration forwarded to the control plane
    #[serde(default)]
    pub config: Value,
}

/// Response to a start request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartResponse {
    /// State the machine was in before the start was accepted
    #[serde(default)]
    pub previous_state: Option<MachineState>,
}

/// Body for a stop request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopRequest {
    /// Signal to deliver instead of the default shutdown signal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    /// Seconds to wait for a clean shutdown before hard-stopping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Options for a restart request; all travel as query parameters
#[derive(Debug, Clone, Default)]
pub struct RestartRequest {
    /// Hard-stop the machine instead of waiting for a clean shutdown
    pub force_stop: bool,
    /// Seconds to wait for the stop phase
    pub timeout: Option<u64>,
    /// Signal to deliver for the stop phase
    pub signal: Option<String>,
}

/// Command execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecRequest {
    /// Command line to run inside the machine
    pub cmd: String,
    /// Seconds before the command is abandoned server-side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Command execution result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecResponse {
    /// Process exit code, when the command ran to completion
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// Captured standard output
    #[serde(default)]
    pub stdout: String,
    /// Captured standard error
    #[serde(default)]
    pub stderr: String,
}

/// One process inside a machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Process id
    #[serde(default)]
    pub pid: i64,
    /// Command line
    #[serde(default)]
    pub command: String,
    /// Resident set size in bytes
    #[serde(default)]
    pub rss: u64,
    /// Cumulative CPU time in ticks
    #[serde(default)]
    pub cpu: u64,
}
