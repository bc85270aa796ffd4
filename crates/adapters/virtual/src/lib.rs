//! # airsched-adapter-virtual
//!
//! Simulated air-conditioner for running the scheduler without hardware.
//! Implements the [`DeviceControl`](airsched_app::ports::DeviceControl) port
//! against in-memory state seeded with a typical home zone layout.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airsched_app::ports::DeviceControl;
use airsched_domain::control::{ControlState, FanDirection, FanRate, Mode, Power, Zone};
use airsched_domain::error::AirschedError;

struct State {
    control: ControlState,
    zones: Vec<Zone>,
}

/// A simulated unit holding control and zone state in memory.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SimulatedAircon {
    state: Arc<Mutex<State>>,
}

impl Default for SimulatedAircon {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                control: ControlState {
                    power: Power::On,
                    mode: Mode::Cool,
                    target_temp: 23.0,
                    fan_rate: FanRate::Level(3),
                    fan_direction: FanDirection::Stopped,
                },
                zones: vec![
                    Zone::new("Living Room", true),
                    Zone::new("Bedroom", false),
                    Zone::new("Kitchen", true),
                    Zone::new("Office", false),
                    Zone::new("Hall", true),
                    Zone::new("Dining", false),
                    Zone::new("Guest Main", true),
                    Zone::new("Edu", false),
                ],
            })),
        }
    }
}

impl SimulatedAircon {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceControl for SimulatedAircon {
    async fn read_control_state(&self) -> Result<ControlState, AirschedError> {
        Ok(self.lock().control)
    }

    async fn apply_control_state(&self, state: ControlState) -> Result<(), AirschedError> {
        self.lock().control = state;
        Ok(())
    }

    async fn read_zone_state(&self) -> Result<Vec<Zone>, AirschedError> {
        Ok(self.lock().zones.clone())
    }

    async fn apply_zone_state(&self, zones: Vec<Zone>) -> Result<(), AirschedError> {
        self.lock().zones = zones;
        Ok(())
    }
}
