//! Server-Sent Events (SSE) stream of the live profile list.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use airsched_app::ports::{Clock, JobScheduler, ProfileRepository};

use crate::state::AppState;

/// `GET /api/profiles/stream` — SSE stream of the full profile list.
///
/// Sends the current list immediately, then a fresh JSON-encoded snapshot
/// after every committed write. The stream continues until the client
/// disconnects.
pub async fn stream<R, J, C>(
    State(state): State<AppState<R, J, C>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    let rx = state.profile_service.subscribe_all();
    let event_stream = WatchStream::new(rx).filter_map(|profiles| {
        match serde_json::to_string(&profiles) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize profile list for SSE stream");
                None
            }
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
