//! Armada-Testkit: Test Utilities
//!
//! Mocks and factories shared by the workspace test suites:
//!
//! - [`MockDispatch`]: a scripted, call-recording [`Dispatch`] implementation
//! - [`RecordingObserver`]: an [`Observe`] sink that keeps events for
//!   assertions
//! - Machine factories for the role/metadata combinations the lister
//!   classifies
//! - [`init_tracing`]: per-test-binary subscriber install so `RUST_LOG`
//!   surfaces client tracing when rerunning a failing test
//!
//! Nothing here is production code; the crate is `publish = false`.

#![deny(missing_docs)]

use armada_client::{Action, ApiCall, Dispatch, Observe};
use armada_core::{Machine, MachineState, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, Once};
use std::time::Duration;

static TRACING: Once = Once::new();

/// Install the `fmt` subscriber once per test binary, filtered by `RUST_LOG`
///
/// Output goes through the test writer so it interleaves with captured test
/// output instead of fighting the harness for stderr.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

type ResultFactory = Box<dyn Fn() -> Result<Value> + Send>;

#[derive(Default)]
struct MockState {
    scripted: HashMap<Action, VecDeque<Result<Value>>>,
    fallbacks: HashMap<Action, ResultFactory>,
    calls: Vec<ApiCall>,
}

/// Scripted dispatcher for driving the client in tests
///
/// Results are queued per action and consumed in FIFO order; once a queue is
/// drained the per-action fallback (if any) answers, otherwise the call
/// succeeds with `Value::Null`. Every call is recorded verbatim.
#[derive(Default)]
pub struct MockDispatch {
    state: Mutex<MockState>,
}

impl MockDispatch {
    /// Create an empty mock: every call succeeds with `Value::Null`
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue one result for an action
    pub fn script(&self, action: Action, result: Result<Value>) {
        self.lock().scripted.entry(action).or_default().push_back(result);
    }

    /// Queue a successful response for an action
    pub fn script_ok(&self, action: Action, value: Value) {
        self.script(action, Ok(value));
    }

    /// Queue a failure for an action
    pub fn script_err(&self, action: Action, err: armada_core::ArmadaError) {
        self.script(action, Err(err));
    }

    /// Answer every call for `action` (after queued results are drained)
    /// with a freshly produced result; used for open-ended retry loops
    pub fn respond_with(
        &self,
        action: Action,
        factory: impl Fn() -> Result<Value> + Send + 'static,
    ) {
        self.lock().fallbacks.insert(action, Box::new(factory));
    }

    /// Every call the mock has received, in order
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Calls received for one action, in order
    pub fn calls_for(&self, action: Action) -> Vec<ApiCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.action == action)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Dispatch for MockDispatch {
    async fn send(&self, call: ApiCall) -> Result<Value> {
        let mut state = self.lock();
        let action = call.action;
        state.calls.push(call);

        if let Some(result) = state
            .scripted
            .get_mut(&action)
            .and_then(VecDeque::pop_front)
        {
            return result;
        }
        if let Some(factory) = state.fallbacks.get(&action) {
            return factory();
        }
        Ok(Value::Null)
    }
}

/// Observer that records `(event, success)` pairs for assertions
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(String, bool)>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Events observed so far, in order
    pub fn events(&self) -> Vec<(String, bool)> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Observe for RecordingObserver {
    fn observe(&self, event: &str, success: bool, _elapsed: Duration) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((event.to_string(), success));
    }
}

/// A bare machine with the given id and state
pub fn machine(id: &str, state: MachineState) -> Machine {
    Machine {
        id: id.to_string(),
        name: None,
        state,
        instance_id: uuid::Uuid::new_v4().to_string(),
        version: None,
        metadata: BTreeMap::new(),
    }
}

/// A platform-managed workload machine
pub fn platform_machine(id: &str, state: MachineState) -> Machine {
    let mut m = machine(id, state);
    m.metadata
        .insert(armada_client::lister::PLATFORM_VERSION_TAG.to_string(), "v2".to_string());
    m.metadata
        .insert(armada_client::lister::PROCESS_GROUP_TAG.to_string(), "app".to_string());
    m
}

/// A platform release-command machine
pub fn release_command_machine(id: &str, state: MachineState) -> Machine {
    let mut m = machine(id, state);
    m.metadata
        .insert(armada_client::lister::PLATFORM_VERSION_TAG.to_string(), "v2".to_string());
    m.metadata.insert(
        armada_client::lister::PROCESS_GROUP_TAG.to_string(),
        armada_client::lister::RELEASE_COMMAND_GROUP.to_string(),
    );
    m
}

/// A platform console machine
pub fn console_machine(id: &str, state: MachineState) -> Machine {
    let mut m = machine(id, state);
    m.metadata
        .insert(armada_client::lister::PLATFORM_VERSION_TAG.to_string(), "v2".to_string());
    m.metadata.insert(
        armada_client::lister::PROCESS_GROUP_TAG.to_string(),
        armada_client::lister::CONSOLE_GROUP.to_string(),
    );
    m
}

/// Serialize machines the way the list endpoint returns them
pub fn machines_json(machines: &[Machine]) -> Value {
    serde_json::to_value(machines).unwrap_or(Value::Null)
}

/// Serialize one machine the way single-machine endpoints return it
pub fn machine_json(machine: &Machine) -> Value {
    serde_json::to_value(machine).unwrap_or(Value::Null)
}

/// A lease grant body with the given nonce
pub fn lease_json(nonce: &str, ttl: Option<u64>) -> Value {
    let mut body = serde_json::json!({ "nonce": nonce, "owner": "testkit" });
    if let Some(ttl) = ttl {
        body["ttl"] = ttl.into();
    }
    body
}
