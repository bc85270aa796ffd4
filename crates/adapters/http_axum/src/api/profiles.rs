//! JSON REST handlers for schedule profiles.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use airsched_app::orchestrator::UpcomingOccurrence;
use airsched_app::ports::{Clock, JobScheduler, ProfileRepository};
use airsched_domain::control::{ControlState, Zone};
use airsched_domain::id::ProfileId;
use airsched_domain::profile::ScheduleProfile;
use airsched_domain::time::TimeOfDay;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a profile.
#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub start_time: TimeOfDay,
    pub end_time: Option<TimeOfDay>,
    pub control: Option<ControlState>,
    pub zones: Option<Vec<Zone>>,
    pub is_active: Option<bool>,
}

/// Request body for updating a profile.
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub start_time: TimeOfDay,
    pub end_time: Option<TimeOfDay>,
    pub control: ControlState,
    pub zones: Vec<Zone>,
    pub is_active: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ScheduleProfile>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<ScheduleProfile>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<ScheduleProfile>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the upcoming endpoint.
pub enum UpcomingResponse {
    Ok(Json<Vec<UpcomingOccurrence>>),
}

impl IntoResponse for UpcomingResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/profiles` — list all profiles, ordered by start time.
pub async fn list<R, J, C>(State(state): State<AppState<R, J, C>>) -> Result<ListResponse, ApiError>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    let profiles = state.profile_service.list_profiles().await?;
    Ok(ListResponse::Ok(Json(profiles)))
}

/// `GET /api/profiles/:id` — get a profile by id.
pub async fn get<R, J, C>(
    State(state): State<AppState<R, J, C>>,
    Path(id): Path<i64>,
) -> Result<GetResponse, ApiError>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    let profile = state.profile_service.get_profile(ProfileId::new(id)).await?;
    Ok(GetResponse::Ok(Json(profile)))
}

/// `POST /api/profiles` — create a new profile and arm its jobs.
pub async fn create<R, J, C>(
    State(state): State<AppState<R, J, C>>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    let mut builder = ScheduleProfile::builder().start_time(req.start_time);

    if let Some(end_time) = req.end_time {
        builder = builder.end_time(end_time);
    }
    if let Some(control) = req.control {
        builder = builder.control(control);
    }
    for zone in req.zones.unwrap_or_default() {
        builder = builder.zone(zone);
    }
    if let Some(is_active) = req.is_active {
        builder = builder.is_active(is_active);
    }

    let profile = builder.build()?;
    let created = state.profile_service.create_profile(profile).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/profiles/:id` — overwrite a profile and re-arm its jobs.
pub async fn update<R, J, C>(
    State(state): State<AppState<R, J, C>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<GetResponse, ApiError>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    let mut builder = ScheduleProfile::builder()
        .id(ProfileId::new(id))
        .start_time(req.start_time)
        .control(req.control)
        .is_active(req.is_active);

    if let Some(end_time) = req.end_time {
        builder = builder.end_time(end_time);
    }
    for zone in req.zones {
        builder = builder.zone(zone);
    }

    let profile = builder.build()?;
    let updated = state.profile_service.update_profile(profile).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/profiles/:id` — delete a profile, cancelling its jobs.
pub async fn delete<R, J, C>(
    State(state): State<AppState<R, J, C>>,
    Path(id): Path<i64>,
) -> Result<DeleteResponse, ApiError>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    state
        .profile_service
        .delete_profile(ProfileId::new(id))
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/profiles/upcoming` — preview of future firings, soonest first.
pub async fn upcoming<R, J, C>(
    State(state): State<AppState<R, J, C>>,
) -> Result<UpcomingResponse, ApiError>
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    let occurrences = state.profile_service.upcoming().await?;
    Ok(UpcomingResponse::Ok(Json(occurrences)))
}
