//! Device operation client.
//!
//! Owns the network transaction for one (operation, device, employee)
//! triple: payload construction, digest-authenticated request, response
//! classification, and conversion of every failure into a [`SyncOutcome`].

use async_trait::async_trait;
use pontaj_core::{Device, Employee, SyncOutcome, SyncStep};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::classify::{classify, ResponsePolicy, FACE_ADD, FACE_UPDATE, PERSON_CREATE, PERSON_DELETE};
use crate::error::{IsapiError, IsapiResult};
use crate::payload;
use crate::transport::{PhotoConfig, PhotoTransport};

/// Port terminals actually serve ISAPI on.
pub const DEFAULT_DEVICE_PORT: u16 = 80;

/// Port the device-management backend historically reports for terminals
/// that really listen on port 80; requests to it hang. Kept as a silent
/// substitution for compatibility with the stored device records.
pub const MISREPORTED_MGMT_PORT: u16 = 8000;

/// Fixed client identification header sent with every device request.
pub const CLIENT_USER_AGENT: &str = "Hikvision-ISAPI-Client/1.0";

/// Timeout for person/face/delete operations.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for downloading the source image in direct-data transport.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

const PERSON_RECORD_PATH: &str = "/ISAPI/AccessControl/UserInfo/Record";
const PERSON_DELETE_PATH: &str = "/ISAPI/AccessControl/UserInfoDetail/Delete";
const FACE_RECORD_PATH: &str = "/ISAPI/Intelligent/FDLib/FaceDataRecord";
const FACE_MODIFY_PATH: &str = "/ISAPI/Intelligent/FDLib/FDModify";

/// Resolve the port to dial for a configured device.
#[must_use]
pub fn effective_port(configured: Option<u16>) -> u16 {
    match configured {
        None | Some(0) | Some(MISREPORTED_MGMT_PORT) => DEFAULT_DEVICE_PORT,
        Some(port) => port,
    }
}

/// The operations the orchestrator needs from a device client.
///
/// `DeviceClient` is the production implementation; orchestration tests use
/// scripted stubs.
#[async_trait]
pub trait DeviceOps: Send + Sync {
    async fn create_person(&self, device: &Device, employee: &Employee) -> SyncOutcome;
    async fn add_face_photo(
        &self,
        device: &Device,
        employee: &Employee,
        photo: &PhotoConfig,
    ) -> SyncOutcome;
    async fn update_face_photo(
        &self,
        device: &Device,
        employee: &Employee,
        photo: &PhotoConfig,
    ) -> SyncOutcome;
    async fn delete_person(&self, device: &Device, employee: &Employee) -> SyncOutcome;
}

/// Request body shapes we send to a terminal. Kept as owned data so the
/// request can be rebuilt for the digest retry.
enum DeviceBody {
    Json(String),
    Multipart { metadata: String, image: Vec<u8> },
}

/// Digest-authenticated ISAPI client.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    downloader: reqwest::Client,
}

impl DeviceClient {
    /// Build a client with the standard operation and download timeouts.
    pub fn new() -> IsapiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .timeout(OPERATION_TIMEOUT)
            // Terminals ship self-signed certificates.
            .danger_accept_invalid_certs(true)
            .build()?;
        let downloader = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self { http, downloader })
    }

    fn device_url(device: &Device, path: &str) -> String {
        format!(
            "http://{}:{}{path}?format=json",
            device.ip_address,
            effective_port(device.port)
        )
    }

    fn build_request(&self, method: &Method, url: &str, body: &DeviceBody) -> IsapiResult<reqwest::RequestBuilder> {
        let builder = self.http.request(method.clone(), url);
        Ok(match body {
            DeviceBody::Json(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(json.clone()),
            DeviceBody::Multipart { metadata, image } => {
                // Per the vendor docs the JSON message travels in a part
                // named `faceURL` and the binary image in a part named `img`.
                let form = reqwest::multipart::Form::new()
                    .part(
                        "faceURL",
                        reqwest::multipart::Part::text(metadata.clone())
                            .mime_str("application/json")
                            .map_err(IsapiError::Http)?,
                    )
                    .part(
                        "img",
                        reqwest::multipart::Part::bytes(image.clone())
                            .file_name("facePic.jpg")
                            .mime_str("image/jpeg")
                            .map_err(IsapiError::Http)?,
                    );
                builder.multipart(form)
            }
        })
    }

    /// Issue a request with HTTP Digest Authentication.
    ///
    /// The first attempt goes out unauthenticated; on a 401 carrying a
    /// `WWW-Authenticate` challenge the request is rebuilt with the computed
    /// `Authorization` header. A 401 without a challenge is returned as-is
    /// for the classifier.
    async fn send_digest(
        &self,
        device: &Device,
        method: Method,
        url: &str,
        body: DeviceBody,
    ) -> IsapiResult<(u16, String)> {
        let first = self
            .build_request(&method, url, &body)?
            .send()
            .await
            .map_err(IsapiError::from_transport)?;

        if first.status() != StatusCode::UNAUTHORIZED {
            return Self::read_response(first).await;
        }

        let challenge = first
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let Some(challenge) = challenge else {
            return Self::read_response(first).await;
        };

        let mut prompt = digest_auth::parse(&challenge)
            .map_err(|e| IsapiError::DigestAuth(e.to_string()))?;

        let parsed = reqwest::Url::parse(url).map_err(|e| IsapiError::DigestAuth(e.to_string()))?;
        let uri = match parsed.query() {
            Some(query) => format!("{}?{query}", parsed.path()),
            None => parsed.path().to_string(),
        };
        let mut context = digest_auth::AuthContext::new(
            device.username.as_str(),
            device.password.as_str(),
            uri.as_str(),
        );
        context.method = if method == Method::PUT {
            digest_auth::HttpMethod::PUT
        } else {
            digest_auth::HttpMethod::POST
        };
        let answer = prompt
            .respond(&context)
            .map_err(|e| IsapiError::DigestAuth(e.to_string()))?;

        let second = self
            .build_request(&method, url, &body)?
            .header(AUTHORIZATION, answer.to_string())
            .send()
            .await
            .map_err(IsapiError::from_transport)?;

        Self::read_response(second).await
    }

    async fn read_response(response: reqwest::Response) -> IsapiResult<(u16, String)> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(IsapiError::from_transport)?;
        Ok((status, body))
    }

    fn serialize<T: Serialize>(record: &T) -> IsapiResult<String> {
        serde_json::to_string(record)
            .map_err(|e| IsapiError::Validation(format!("payload serialization failed: {e}")))
    }

    /// Convert a client-side error into the outcome dictated by the policy.
    fn outcome_from_error(policy: &ResponsePolicy, device: &Device, err: &IsapiError) -> SyncOutcome {
        match err {
            IsapiError::Validation(msg) => {
                SyncOutcome::skipped(format!("Validation error: {msg}"), policy.step)
            }
            IsapiError::Timeout(detail) => SyncOutcome::new(
                policy.transport_error_kind,
                format!(
                    "Request timeout - device {} not responding: {detail}",
                    device.ip_address
                ),
                policy.step,
            ),
            IsapiError::Connection(detail) => SyncOutcome::new(
                policy.transport_error_kind,
                format!(
                    "Connection error - device {} unreachable: {detail}",
                    device.ip_address
                ),
                policy.step,
            ),
            IsapiError::ImageDownload(detail) => SyncOutcome::partial(
                format!("Failed to download image: {detail}"),
                SyncStep::Photo,
            ),
            other => SyncOutcome::new(
                policy.transport_error_kind,
                format!("Unexpected error: {other}"),
                policy.step,
            ),
        }
    }

    async fn run_json_op<T: Serialize>(
        &self,
        policy: &ResponsePolicy,
        device: &Device,
        method: Method,
        path: &str,
        record: IsapiResult<T>,
    ) -> SyncOutcome {
        let result = async {
            let record = record?;
            let url = Self::device_url(device, path);
            debug!(device = %device.ip_address, url = %url, step = %policy.step, "ISAPI request");
            let json = Self::serialize(&record)?;
            self.send_digest(device, method, &url, DeviceBody::Json(json))
                .await
        }
        .await;

        match result {
            Ok((status, body)) => {
                let outcome = classify(policy, status, &body);
                debug!(
                    device = %device.ip_address,
                    http_status = status,
                    outcome = %outcome.kind,
                    "ISAPI response classified"
                );
                outcome
            }
            Err(err) => {
                warn!(device = %device.ip_address, error = %err, step = %policy.step, "ISAPI request failed");
                Self::outcome_from_error(policy, device, &err)
            }
        }
    }

    async fn download_image(&self, url: &str) -> IsapiResult<Vec<u8>> {
        debug!(url = %url, "downloading face image");
        let response = self
            .downloader
            .get(url)
            .send()
            .await
            .map_err(|e| IsapiError::ImageDownload(e.to_string()))?;
        if !response.status().is_success() {
            return Err(IsapiError::ImageDownload(format!(
                "HTTP {} from image host",
                response.status().as_u16()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IsapiError::ImageDownload(e.to_string()))?;
        debug!(size = bytes.len(), "face image downloaded");
        Ok(bytes.to_vec())
    }

    /// Shared implementation of the two face operations. The transport
    /// strategy decides whether the device fetches the image itself or we
    /// download and re-upload it as multipart content.
    async fn run_face_op(
        &self,
        policy: &ResponsePolicy,
        device: &Device,
        employee: &Employee,
        photo: &PhotoConfig,
        method: Method,
        path: &str,
    ) -> SyncOutcome {
        // The PUT (update) variant carries the fixed faceID field.
        let is_update = method == Method::PUT;

        let result = async {
            let url = Self::device_url(device, path);
            match photo.transport {
                PhotoTransport::UrlReference => {
                    let record = if is_update {
                        payload::build_face_update_record(employee, photo.storage_base())?
                    } else {
                        payload::build_face_record(employee, photo.storage_base())?
                    };
                    debug!(device = %device.ip_address, url = %url, face_url = ?record.face_url, "ISAPI face request (URL reference)");
                    let json = Self::serialize(&record)?;
                    self.send_digest(device, method, &url, DeviceBody::Json(json))
                        .await
                }
                PhotoTransport::DirectData => {
                    let image_url = payload::resolve_photo_url(employee, photo.storage_base())?;
                    let image = self.download_image(&image_url).await?;
                    let record = if is_update {
                        payload::build_face_update_metadata(employee)?
                    } else {
                        payload::build_face_metadata(employee)?
                    };
                    debug!(device = %device.ip_address, url = %url, image_bytes = image.len(), "ISAPI face request (direct data)");
                    let metadata = Self::serialize(&record)?;
                    self.send_digest(device, method, &url, DeviceBody::Multipart { metadata, image })
                        .await
                }
            }
        }
        .await;

        match result {
            Ok((status, body)) => classify(policy, status, &body),
            Err(err) => {
                warn!(device = %device.ip_address, error = %err, "ISAPI face request failed");
                Self::outcome_from_error(policy, device, &err)
            }
        }
    }
}

#[async_trait]
impl DeviceOps for DeviceClient {
    /// Create or update the person record on the device.
    async fn create_person(&self, device: &Device, employee: &Employee) -> SyncOutcome {
        self.run_json_op(
            &PERSON_CREATE,
            device,
            Method::POST,
            PERSON_RECORD_PATH,
            payload::build_person_record(employee),
        )
        .await
    }

    async fn add_face_photo(
        &self,
        device: &Device,
        employee: &Employee,
        photo: &PhotoConfig,
    ) -> SyncOutcome {
        self.run_face_op(&FACE_ADD, device, employee, photo, Method::POST, FACE_RECORD_PATH)
            .await
    }

    async fn update_face_photo(
        &self,
        device: &Device,
        employee: &Employee,
        photo: &PhotoConfig,
    ) -> SyncOutcome {
        self.run_face_op(
            &FACE_UPDATE,
            device,
            employee,
            photo,
            Method::PUT,
            FACE_MODIFY_PATH,
        )
        .await
    }

    /// Delete the person record. The endpoint is named "Delete" but the
    /// device expects PUT.
    async fn delete_person(&self, device: &Device, employee: &Employee) -> SyncOutcome {
        self.run_json_op(
            &PERSON_DELETE,
            device,
            Method::PUT,
            PERSON_DELETE_PATH,
            payload::build_person_delete_record(employee),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misreported_port_is_substituted() {
        assert_eq!(effective_port(Some(8000)), 80);
    }

    #[test]
    fn absent_or_zero_port_defaults() {
        assert_eq!(effective_port(None), 80);
        assert_eq!(effective_port(Some(0)), 80);
    }

    #[test]
    fn other_ports_pass_through() {
        assert_eq!(effective_port(Some(80)), 80);
        assert_eq!(effective_port(Some(8080)), 8080);
        assert_eq!(effective_port(Some(443)), 443);
    }

    #[test]
    fn device_url_applies_port_rule() {
        let device = Device {
            ip_address: "192.168.1.50".into(),
            port: Some(8000),
            ..Default::default()
        };
        assert_eq!(
            DeviceClient::device_url(&device, PERSON_RECORD_PATH),
            "http://192.168.1.50:80/ISAPI/AccessControl/UserInfo/Record?format=json"
        );
    }
}
