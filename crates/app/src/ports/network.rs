//! Network availability port.
//!
//! Deferred jobs are gated on connectivity: a job whose fire time has come
//! waits (suspended, not polling) until the device network is reachable
//! before attempting its body.

use std::future::Future;

/// Reports when the device network is reachable.
pub trait NetworkMonitor: Send + Sync {
    /// Resolve once connectivity is available. Resolves immediately when
    /// already online.
    fn wait_until_online(&self) -> impl Future<Output = ()> + Send;
}

/// Trivial monitor for deployments where the unit is always reachable on the
/// local network.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl NetworkMonitor for AlwaysOnline {
    async fn wait_until_online(&self) {}
}
