//! Schedule profiles — the unit of scheduling.
//!
//! A profile maps a daily start time (and optional end time) to a control
//! state and zone configuration. Profiles are created active; the executor
//! deactivates a one-shot profile after its start fires, and every profile
//! after its end fires.

use serde::{Deserialize, Serialize};

use crate::control::{ControlState, FanDirection, FanRate, Mode, Power, Zone};
use crate::error::{AirschedError, ValidationError};
use crate::id::ProfileId;
use crate::time::TimeOfDay;

/// A user-defined rule: at `start_time`, apply `control` and `zones`; at
/// `end_time` (when present), power the unit off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleProfile {
    /// Store-assigned identity; [`ProfileId::UNSAVED`] until inserted.
    pub id: ProfileId,
    pub start_time: TimeOfDay,
    pub end_time: Option<TimeOfDay>,
    pub control: ControlState,
    /// Matched to physical zones by name, never by position. A name the
    /// device no longer knows is tolerated and ignored at apply time.
    pub zones: Vec<Zone>,
    /// Governs whether the profile is eligible to fire.
    pub is_active: bool,
}

impl ScheduleProfile {
    /// Create a builder for constructing a [`ScheduleProfile`].
    #[must_use]
    pub fn builder() -> ScheduleProfileBuilder {
        ScheduleProfileBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AirschedError::Validation`] when:
    /// - `control.target_temp` is outside 16–32 °C
    ///   ([`ValidationError::TemperatureOutOfRange`])
    /// - a fixed fan level is outside 1–5
    ///   ([`ValidationError::FanLevelOutOfRange`])
    /// - any zone has an empty name ([`ValidationError::EmptyZoneName`])
    pub fn validate(&self) -> Result<(), AirschedError> {
        if !(16.0..=32.0).contains(&self.control.target_temp) {
            return Err(ValidationError::TemperatureOutOfRange(self.control.target_temp).into());
        }
        if let FanRate::Level(level) = self.control.fan_rate {
            if !(1..=5).contains(&level) {
                return Err(ValidationError::FanLevelOutOfRange(level).into());
            }
        }
        if self.zones.iter().any(|zone| zone.name.is_empty()) {
            return Err(ValidationError::EmptyZoneName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`ScheduleProfile`].
#[derive(Debug, Default)]
pub struct ScheduleProfileBuilder {
    id: Option<ProfileId>,
    start_time: Option<TimeOfDay>,
    end_time: Option<TimeOfDay>,
    control: Option<ControlState>,
    zones: Vec<Zone>,
    is_active: Option<bool>,
}

impl ScheduleProfileBuilder {
    #[must_use]
    pub fn id(mut self, id: ProfileId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn start_time(mut self, start: TimeOfDay) -> Self {
        self.start_time = Some(start);
        self
    }

    #[must_use]
    pub fn end_time(mut self, end: TimeOfDay) -> Self {
        self.end_time = Some(end);
        self
    }

    #[must_use]
    pub fn control(mut self, control: ControlState) -> Self {
        self.control = Some(control);
        self
    }

    #[must_use]
    pub fn zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    #[must_use]
    pub fn is_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    /// Consume the builder, validate, and return a [`ScheduleProfile`].
    ///
    /// # Errors
    ///
    /// Returns [`AirschedError::Validation`] if `start_time` is missing or
    /// any invariant fails.
    pub fn build(self) -> Result<ScheduleProfile, AirschedError> {
        let start_time = self
            .start_time
            .ok_or_else(|| ValidationError::InvalidTime(String::new()))?;
        let profile = ScheduleProfile {
            id: self.id.unwrap_or_default(),
            start_time,
            end_time: self.end_time,
            control: self.control.unwrap_or_else(default_control),
            zones: self.zones,
            is_active: self.is_active.unwrap_or(true),
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Sensible starting control state for a new profile: cooling to 24 °C with
/// automatic fan.
#[must_use]
pub fn default_control() -> ControlState {
    ControlState {
        power: Power::On,
        mode: Mode::Cool,
        target_temp: 24.0,
        fan_rate: FanRate::Auto,
        fan_direction: FanDirection::Stopped,
    }
}
