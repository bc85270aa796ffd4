//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod clock;
pub mod device;
pub mod jobs;
pub mod network;
pub mod storage;

pub use clock::{Clock, SystemClock};
pub use device::DeviceControl;
pub use jobs::{JobOutcome, JobPurpose, JobRunner, JobScheduler, JobStore, PendingJob};
pub use network::{AlwaysOnline, NetworkMonitor};
pub use storage::ProfileRepository;
