//! # airsched-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`ProfileRepository`](airsched_app::ports::ProfileRepository)
//!   and [`JobStore`](airsched_app::ports::JobStore) port traits
//! - Manage the `SQLite` connection pool lifecycle
//! - Run database migrations (sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `airsched-app` (for port traits) and `airsched-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

pub mod error;
pub mod job_store;
pub mod pool;
pub mod profile_repo;

pub use error::StorageError;
pub use job_store::SqliteJobStore;
pub use pool::{Config, Database};
pub use profile_repo::SqliteProfileRepository;
