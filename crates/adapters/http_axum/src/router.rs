//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use airsched_app::ports::{Clock, JobScheduler, ProfileRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and exposes a `/health` probe. Includes a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG` level
/// using the `tracing` ecosystem.
pub fn build<R, J, C>(state: AppState<R, J, C>) -> Router
where
    R: ProfileRepository + Clone + 'static,
    J: JobScheduler + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{DateTime, FixedOffset, Utc};
    use tokio::sync::watch;
    use tower::ServiceExt;

    use airsched_app::ports::{JobPurpose, JobScheduler};
    use airsched_app::services::profile_service::ProfileService;
    use airsched_domain::error::AirschedError;
    use airsched_domain::id::ProfileId;
    use airsched_domain::profile::ScheduleProfile;

    use super::*;

    struct RepoInner {
        profiles: Mutex<HashMap<ProfileId, ScheduleProfile>>,
        next_id: AtomicI64,
        all: watch::Sender<Vec<ScheduleProfile>>,
    }

    #[derive(Clone)]
    struct StubRepo {
        inner: Arc<RepoInner>,
    }

    impl Default for StubRepo {
        fn default() -> Self {
            let (all, _) = watch::channel(Vec::new());
            Self {
                inner: Arc::new(RepoInner {
                    profiles: Mutex::new(HashMap::new()),
                    next_id: AtomicI64::new(1),
                    all,
                }),
            }
        }
    }

    impl StubRepo {
        fn publish(&self, profiles: &HashMap<ProfileId, ScheduleProfile>) {
            let mut list: Vec<ScheduleProfile> = profiles.values().cloned().collect();
            list.sort_by_key(|p| (p.start_time, p.id));
            self.inner.all.send_replace(list);
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ProfileId, ScheduleProfile>> {
            self.inner
                .profiles
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl ProfileRepository for StubRepo {
        async fn create(
            &self,
            mut profile: ScheduleProfile,
        ) -> Result<ScheduleProfile, AirschedError> {
            profile.id = ProfileId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
            let mut profiles = self.lock();
            profiles.insert(profile.id, profile.clone());
            self.publish(&profiles);
            Ok(profile)
        }

        async fn get_by_id(&self, id: ProfileId) -> Result<Option<ScheduleProfile>, AirschedError> {
            Ok(self.lock().get(&id).cloned())
        }

        async fn get_all(&self) -> Result<Vec<ScheduleProfile>, AirschedError> {
            let mut list: Vec<ScheduleProfile> = self.lock().values().cloned().collect();
            list.sort_by_key(|p| (p.start_time, p.id));
            Ok(list)
        }

        async fn update(&self, profile: ScheduleProfile) -> Result<ScheduleProfile, AirschedError> {
            let mut profiles = self.lock();
            profiles.insert(profile.id, profile.clone());
            self.publish(&profiles);
            Ok(profile)
        }

        async fn delete(&self, id: ProfileId) -> Result<(), AirschedError> {
            let mut profiles = self.lock();
            profiles.remove(&id);
            self.publish(&profiles);
            Ok(())
        }

        fn subscribe_all(&self) -> watch::Receiver<Vec<ScheduleProfile>> {
            self.inner.all.subscribe()
        }
    }

    struct NoopJobs;

    impl JobScheduler for NoopJobs {
        async fn schedule_once(
            &self,
            _profile_id: ProfileId,
            _purpose: JobPurpose,
            _fire_at: DateTime<Utc>,
        ) -> Result<(), AirschedError> {
            Ok(())
        }

        async fn cancel(
            &self,
            _profile_id: ProfileId,
            _purpose: JobPurpose,
        ) -> Result<(), AirschedError> {
            Ok(())
        }
    }

    struct FixedClock(DateTime<FixedOffset>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<FixedOffset> {
            self.0
        }
    }

    fn test_app() -> Router {
        let service = ProfileService::new(
            StubRepo::default(),
            NoopJobs,
            FixedClock("2024-03-04T08:00:00+10:00".parse().unwrap()),
        );
        build(AppState::new(service))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_create_and_fetch_profile() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/profiles",
                serde_json::json!({
                    "start_time": "07:00",
                    "end_time": "22:00",
                    "zones": [{"name": "Living Room", "on": true}],
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["start_time"], "07:00");

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/profiles/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["end_time"], "22:00");
        assert_eq!(fetched["is_active"], true);
    }

    #[tokio::test]
    async fn should_return_bad_request_for_out_of_range_temperature() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/profiles",
                serde_json::json!({
                    "start_time": "07:00",
                    "control": {
                        "power": "on",
                        "mode": "cool",
                        "target_temp": 99.0,
                        "fan_rate": "auto",
                        "fan_direction": "stopped",
                    },
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_profile() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/profiles/404")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_delete_profile_and_return_no_content() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/profiles",
                serde_json::json!({"start_time": "07:00"}),
            ))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/profiles/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/profiles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn should_list_upcoming_occurrences_soonest_first() {
        let app = test_app();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/profiles",
                serde_json::json!({"start_time": "07:00", "end_time": "22:00"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/profiles/upcoming")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let upcoming = body_json(response).await;
        let purposes: Vec<&str> = upcoming
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["purpose"].as_str().unwrap())
            .collect();
        // 22:00 today fires before 07:00 tomorrow
        assert_eq!(purposes, ["end", "start"]);
    }
}
