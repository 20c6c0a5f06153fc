//! Dispatcher collaborator seam
//!
//! The client never talks HTTP. It hands the dispatcher an immutable
//! [`ApiCall`] value; the dispatcher builds the endpoint from the action
//! route and machine id, executes the request, decodes the response body,
//! and classifies failures into [`ArmadaError`] variants. Implementations
//! must distinguish at least `NotFound`, `Forbidden`, `Conflict`, and
//! `Unavailable`, since the lister and lease manager branch on those.

use crate::action::Action;
use armada_core::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Well-known request header carrying the lease nonce on mutating calls.
/// Absent header means an unauthenticated-for-lease mutation.
pub const NONCE_HEADER: &str = "armada-machine-lease-nonce";

/// One control-plane request, built fresh per call
///
/// Query parameters and the nonce are plain values on this record rather
/// than shared mutable maps, so nothing aliases across call sites.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    /// What to do
    pub action: Action,
    /// Target machine; `None` for collection-level actions such as list and
    /// launch
    pub machine_id: Option<String>,
    /// Query parameters in insertion order
    pub query: Vec<(String, String)>,
    /// Lease nonce to send under [`NONCE_HEADER`]; `None` omits the header
    pub nonce: Option<String>,
    /// JSON request body, if the action carries one
    pub body: Option<Value>,
}

impl ApiCall {
    /// Start a call for an action
    pub fn new(action: Action) -> Self {
        Self {
            action,
            machine_id: None,
            query: Vec::new(),
            nonce: None,
            body: None,
        }
    }

    /// Target a specific machine
    #[must_use]
    pub fn machine(mut self, id: impl Into<String>) -> Self {
        self.machine_id = Some(id.into());
        self
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Attach a lease nonce. An empty or absent nonce leaves the call
    /// unauthenticated for lease purposes, which the server may reject for
    /// leased machines.
    #[must_use]
    pub fn nonce(mut self, nonce: Option<&str>) -> Self {
        self.nonce = nonce.filter(|n| !n.is_empty()).map(str::to_string);
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a query parameter by key (first match)
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends one classified control-plane request
///
/// Implementations own endpoint construction, transport, authentication,
/// decoding, and error classification. The returned value is the decoded
/// response body (`Value::Null` for empty responses).
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Execute the call and return the decoded response body
    async fn send(&self, call: ApiCall) -> Result<Value>;
}
