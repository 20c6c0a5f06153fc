//! Fire-and-forget operation observation
//!
//! Notable verbs (launch, update, start, cordon, uncordon) report their name,
//! outcome, and duration to an [`Observe`] collaborator. Observation never
//! affects control flow or error propagation.

use std::time::Duration;
use tracing::debug;

/// Sink for per-operation outcome events
pub trait Observe: Send + Sync {
    /// Record one completed operation. Must not block or fail.
    fn observe(&self, event: &str, success: bool, elapsed: Duration);
}

/// Default observer that emits a structured `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observe for TracingObserver {
    fn observe(&self, event: &str, success: bool, elapsed: Duration) {
        debug!(
            event = event,
            success = success,
            elapsed_ms = elapsed.as_millis() as u64,
            "machine operation observed"
        );
    }
}
