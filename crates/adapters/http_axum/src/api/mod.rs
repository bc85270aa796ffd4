//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod profiles;
pub mod stream;

use axum::Router;
use axum::routing::get;

use airsched_app::ports::{Clock, JobScheduler, ProfileRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, J, C>() -> Router<AppState<R, J, C>>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/profiles",
            get(profiles::list::<R, J, C>).post(profiles::create::<R, J, C>),
        )
        .route("/profiles/upcoming", get(profiles::upcoming::<R, J, C>))
        .route("/profiles/stream", get(stream::stream::<R, J, C>))
        .route(
            "/profiles/{id}",
            get(profiles::get::<R, J, C>)
                .put(profiles::update::<R, J, C>)
                .delete(profiles::delete::<R, J, C>),
        )
}
