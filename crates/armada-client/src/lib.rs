//! Armada-Client: Control-Plane Machines Client
//!
//! This crate drives a fleet of remotely hosted machines through a
//! control-plane API. It provides:
//!
//! - The [`Dispatch`] collaborator seam: transport, endpoint construction,
//!   authentication, and response decoding live behind it, never here
//! - The lease protocol (`find`/`acquire`/`refresh`/`release`) that
//!   serializes mutations against a single machine
//! - Per-verb operations (`launch`, `start`, `stop`, `restart`, `destroy`,
//!   `cordon`, ...) that attach a lease nonce when the caller holds one
//! - The retrying lister that tolerates eventual-consistency 404 windows
//! - The wait-for-state protocol with its clamped server-side timeout
//!
//! Concurrency model: every operation is a plain `async fn` that blocks the
//! calling task for one round trip (or, for the retrying lister, several
//! backoff-spaced ones). No background tasks are spawned; cancellation is
//! dropping the future.

#![deny(missing_docs)]

pub mod action;
pub mod client;
pub mod dispatch;
pub mod lister;
pub mod observe;
pub mod requests;

pub use action::{Action, Method, Route};
pub use client::{MachinesClient, WAIT_TIMEOUT_MAX, WAIT_TIMEOUT_MIN};
pub use dispatch::{ApiCall, Dispatch, NONCE_HEADER};
pub use observe::{Observe, TracingObserver};
pub use requests::{
    ExecRequest, ExecResponse, LaunchSpec, ProcessInfo, RestartRequest, StartResponse,
    StopRequest,
};
