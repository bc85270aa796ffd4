//! # airsched-adapter-http-axum
//!
//! HTTP adapter exposing the schedule profile API over
//! [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - JSON REST endpoints for profile CRUD under `/api/profiles`
//! - Upcoming-occurrence preview at `/api/profiles/upcoming`
//! - Live profile-list stream (SSE) at `/api/profiles/stream`
//! - Map domain errors to HTTP status codes
//!
//! ## Dependency rule
//! Depends on `airsched-app` (services, ports) and `airsched-domain`. Holds
//! no business logic of its own.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

pub use router::build;
pub use state::AppState;
