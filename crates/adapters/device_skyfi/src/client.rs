//! HTTP client implementing [`DeviceControl`] against a `SkyFi` controller.

use std::time::Duration;

use airsched_app::ports::DeviceControl;
use airsched_domain::control::{ControlState, Zone};
use airsched_domain::error::{AirschedError, ConnectivityError};

use crate::codec;

/// Configuration for the `SkyFi` client.
pub struct Config {
    /// Controller base URL, e.g. `http://192.168.1.30:2000`.
    pub base_url: String,
    /// Per-request timeout; expiry surfaces as a connectivity error.
    pub timeout: Duration,
}

impl Config {
    /// Build a [`SkyfiDevice`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<SkyfiDevice, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(SkyfiDevice {
            http,
            base_url: self.base_url,
        })
    }
}

/// Client for a `SkyFi`-protocol air-conditioner controller.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct SkyfiDevice {
    http: reqwest::Client,
    base_url: String,
}

impl SkyfiDevice {
    async fn get(&self, endpoint: &str) -> Result<String, ConnectivityError> {
        let url = format!("{}/skyfi/aircon/{endpoint}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        self.read_body(response).await
    }

    async fn post(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, ConnectivityError> {
        let url = format!("{}/skyfi/aircon/{endpoint}", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(params)
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        self.read_body(response).await
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<String, ConnectivityError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ConnectivityError::Protocol(format!(
                "unexpected status {status}"
            )));
        }
        response
            .text()
            .await
            .map_err(|err| self.transport_error(&err))
    }

    fn transport_error(&self, err: &reqwest::Error) -> ConnectivityError {
        if err.is_timeout() {
            ConnectivityError::Timeout
        } else if err.is_connect() {
            ConnectivityError::Unreachable(self.base_url.clone())
        } else {
            ConnectivityError::Protocol(err.to_string())
        }
    }
}

impl DeviceControl for SkyfiDevice {
    async fn read_control_state(&self) -> Result<ControlState, AirschedError> {
        let body = self.get("get_control_info").await?;
        Ok(codec::parse_control(&body)?)
    }

    async fn apply_control_state(&self, state: ControlState) -> Result<(), AirschedError> {
        let params = codec::encode_control(&state);
        let body = self.post("set_control_info", &params).await?;
        Ok(codec::ensure_ack(&body)?)
    }

    async fn read_zone_state(&self) -> Result<Vec<Zone>, AirschedError> {
        let body = self.get("get_zone_setting").await?;
        Ok(codec::parse_zones(&body)?)
    }

    async fn apply_zone_state(&self, zones: Vec<Zone>) -> Result<(), AirschedError> {
        let params = codec::encode_zones(&zones);
        let body = self.post("set_zone_setting", &params).await?;
        Ok(codec::ensure_ack(&body)?)
    }
}
