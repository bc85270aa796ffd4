//! Device control port — request/response operations against the aircon.
//!
//! Implementations own the wire format and transport; the core only sees
//! domain types. Every operation may fail with
//! [`AirschedError::Connectivity`], which the scheduler treats as transient.

use std::future::Future;

use airsched_domain::control::{ControlState, Zone};
use airsched_domain::error::AirschedError;

/// Synchronous request/response interface to the physical (or simulated) unit.
///
/// Calls are expected to carry a bounded timeout inside the adapter; expiry
/// surfaces as a connectivity error and feeds the retry path.
pub trait DeviceControl: Send + Sync {
    /// Read the unit's current control parameters.
    fn read_control_state(
        &self,
    ) -> impl Future<Output = Result<ControlState, AirschedError>> + Send;

    /// Push a full set of control parameters to the unit.
    fn apply_control_state(
        &self,
        state: ControlState,
    ) -> impl Future<Output = Result<(), AirschedError>> + Send;

    /// Read the current per-zone on/off state, in the unit's own order.
    fn read_zone_state(&self) -> impl Future<Output = Result<Vec<Zone>, AirschedError>> + Send;

    /// Push a full zone list to the unit.
    fn apply_zone_state(
        &self,
        zones: Vec<Zone>,
    ) -> impl Future<Output = Result<(), AirschedError>> + Send;
}
