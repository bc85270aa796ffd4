//! # airsched-domain
//!
//! Pure domain model for the airsched aircon scheduling daemon.
//!
//! ## Responsibilities
//! - Foundational types: profile identifiers, error conventions, times of day
//! - Define **Schedule profiles** (a daily start time, optional end time, the
//!   control state and zone settings to apply)
//! - Define **Control state** (power, mode, target temperature, fan settings)
//!   and **Zones** (named on/off areas of the ducted system)
//! - The **occurrence calculator**: pure wall-clock math mapping a profile's
//!   times and "now" to the next absolute firing instants
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod control;
pub mod error;
pub mod id;
pub mod profile;
pub mod time;
