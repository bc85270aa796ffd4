//! # airsched-adapter-device-skyfi
//!
//! HTTP client for air-conditioner controllers speaking the `SkyFi` protocol.
//!
//! The protocol is plain text over HTTP: requests carry their parameters as
//! query strings, responses are comma-delimited `key=value` lists beginning
//! with `ret=OK`. Zone state travels as two parallel semicolon-separated
//! lists (`zone_name` and `zone_onoff`).
//!
//! ## Responsibilities
//! - Implement the [`DeviceControl`](airsched_app::ports::DeviceControl) port
//! - Encode domain control and zone state to wire parameters
//! - Parse wire responses back into domain types
//! - Map transport failures to connectivity errors

pub mod client;
pub mod codec;

pub use client::{Config, SkyfiDevice};
