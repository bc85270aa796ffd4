//! Control state — the device settings a profile applies.
//!
//! The wire protocol encodes these as terse numeric/letter codes
//! (`pow=1&mode=2&stemp=23…`); the domain keeps them as proper enums and
//! leaves the encoding to the device adapter.

use serde::{Deserialize, Serialize};

/// Whether the unit is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Power {
    Off,
    On,
}

/// Operating mode of the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Auto,
    Heat,
    Cool,
    Dry,
    FanOnly,
}

/// Fan speed. `Auto` lets the unit decide; levels run 1 (lowest) to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanRate {
    Auto,
    Quiet,
    Level(u8),
}

/// Louvre swing setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanDirection {
    Stopped,
    Vertical,
    Horizontal,
    Both,
}

/// The full set of device control parameters a profile applies at start time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub power: Power,
    pub mode: Mode,
    /// Target temperature in °C.
    pub target_temp: f32,
    pub fan_rate: FanRate,
    pub fan_direction: FanDirection,
}

impl ControlState {
    /// The state applied when a profile's end time fires: power down,
    /// everything else at neutral defaults.
    #[must_use]
    pub fn off() -> Self {
        Self {
            power: Power::Off,
            mode: Mode::Auto,
            target_temp: 25.0,
            fan_rate: FanRate::Auto,
            fan_direction: FanDirection::Stopped,
        }
    }
}

/// One named zone of the ducted system and whether it should be open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub on: bool,
}

impl Zone {
    #[must_use]
    pub fn new(name: impl Into<String>, on: bool) -> Self {
        Self {
            name: name.into(),
            on,
        }
    }
}
