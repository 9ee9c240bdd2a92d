//! Edge Function RPC client.

use pontaj_core::{Device, Employee};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{BackendError, BackendResult};

/// Path of the RPC proxy under the backend base URL.
pub const EDGE_FUNCTION_PATH: &str = "/functions/v1/external-api-proxy";

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Timeout for small lookups (devices, event saves).
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for employee queries, which can join biometric data.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// `{"data": ...}` envelope every RPC answer arrives in.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
}

/// Client for the directory backend's RPC interface.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    rpc_url: String,
    api_key: String,
    /// Separately-configured endpoint receiving raw access events.
    ingest_url: Option<String>,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        ingest_url: Option<String>,
    ) -> BackendResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            rpc_url: format!("{}{EDGE_FUNCTION_PATH}", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            ingest_url,
        })
    }

    async fn rpc_get<T: DeserializeOwned>(
        &self,
        action: &str,
        extra: &[(&str, &str)],
        timeout: Duration,
    ) -> BackendResult<Option<T>> {
        let mut query: Vec<(&str, &str)> = vec![("action", action)];
        query.extend_from_slice(extra);

        debug!(action, "backend RPC call");
        let response = self
            .http
            .get(&self.rpc_url)
            .query(&query)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(timeout)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<Option<T>> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    /// Fetch all active devices (`get-active-devices`).
    pub async fn get_active_devices(&self) -> BackendResult<Vec<Device>> {
        Ok(self
            .rpc_get("get-active-devices", &[], LOOKUP_TIMEOUT)
            .await?
            .unwrap_or_default())
    }

    /// Fetch one employee with biometric data (`get-angajat`).
    pub async fn get_employee(&self, employee_id: &str) -> BackendResult<Option<Employee>> {
        self.rpc_get(
            "get-angajat",
            &[("angajat_id", employee_id)],
            QUERY_TIMEOUT,
        )
        .await
    }

    /// Fetch all active employees with biometric records
    /// (`get-angajati-biometrie`).
    pub async fn get_employees_with_biometrics(&self) -> BackendResult<Vec<Employee>> {
        Ok(self
            .rpc_get("get-angajati-biometrie", &[], QUERY_TIMEOUT)
            .await?
            .unwrap_or_default())
    }

    /// Record an attendance event (`save-pontaj-event`).
    pub async fn save_attendance_event(
        &self,
        employee_id: &str,
        device_id: &str,
        event_time: &str,
    ) -> BackendResult<Value> {
        let payload = serde_json::json!({
            "angajat_id": employee_id,
            "dispozitiv_id": device_id,
            "event_time": event_time,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .query(&[("action", "save-pontaj-event")])
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(LOOKUP_TIMEOUT)
            .json(&payload)
            .send()
            .await?;

        Ok(Self::decode::<Value>(response).await?.unwrap_or(Value::Null))
    }

    /// Forward a raw access event to the ingestion endpoint, if configured.
    ///
    /// Returns `Ok(false)` when no ingestion endpoint is set.
    pub async fn ingest_access_event(&self, event: &Value) -> BackendResult<bool> {
        let Some(url) = self.ingest_url.as_deref() else {
            return Ok(false);
        };

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(LOOKUP_TIMEOUT)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "event ingestion rejected");
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(true)
    }
}
