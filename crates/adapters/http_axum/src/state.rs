//! Shared application state for axum handlers.

use std::sync::Arc;

use airsched_app::ports::{Clock, JobScheduler, ProfileRepository};
use airsched_app::services::profile_service::ProfileService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository, job scheduler, and clock types to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone` — only the `Arc` wrapper is cloned.
pub struct AppState<R, J, C> {
    /// Profile CRUD service with scheduling side effects.
    pub profile_service: Arc<ProfileService<R, J, C>>,
}

impl<R, J, C> Clone for AppState<R, J, C> {
    fn clone(&self) -> Self {
        Self {
            profile_service: Arc::clone(&self.profile_service),
        }
    }
}

impl<R, J, C> AppState<R, J, C>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    /// Create a new application state from a service instance.
    pub fn new(profile_service: ProfileService<R, J, C>) -> Self {
        Self {
            profile_service: Arc::new(profile_service),
        }
    }

    /// Create a new application state from a pre-wrapped `Arc` service.
    ///
    /// Use this when the service is shared with background tasks before the
    /// HTTP state is constructed.
    pub fn from_arc(profile_service: Arc<ProfileService<R, J, C>>) -> Self {
        Self { profile_service }
    }
}
