//! # airsched-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceControl` — read/apply aircon control and zone state
//!   - `ProfileRepository` — CRUD and live subscription over schedule profiles
//!   - `JobScheduler` / `JobStore` — durable deferred execution keyed by
//!     profile id and purpose
//!   - `NetworkMonitor`, `Clock` — environment seams kept injectable so tests
//!     stay hermetic
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ProfileService` — validate, persist, and (re)arm profiles
//!   - `ScheduleExecutor` — the fire-time state machine (a `JobRunner`)
//!   - `ScheduleOrchestrator` — occurrence computation and job arming
//!   - `FallbackSweep` — best-effort minute-match backstop
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `airsched-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod executor;
pub mod orchestrator;
pub mod ports;
pub mod services;
pub mod sweep;

#[cfg(test)]
mod testing;
