//! Catch-all webhook for device event notifications.
//!
//! Terminals post to whatever path they were configured with, retry
//! aggressively on anything but 200, and send multipart, JSON or XML
//! bodies. So: any path, always `200 OK` once past the IP gate, and every
//! parse or forward failure is only logged.

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use pontaj_events::{is_access_event, parse_request_body};
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::state::AppState;

pub async fn device_webhook(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    if !state.allowlist.allows(addr.ip()) {
        warn!(source = %addr.ip(), "webhook post from non-whitelisted source");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let path = uri.path().to_string();
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let decoded_body = String::from_utf8_lossy(&body);

    state
        .event_log
        .append(&format!("Received POST to path: {path}"))
        .await;
    state
        .event_log
        .append(&format!("Content-Type: {content_type}"))
        .await;
    state.event_log.append(&decoded_body).await;

    let parsed = parse_request_body(&content_type, &body);
    if let Some(parsed) = parsed {
        if is_access_event(&parsed) {
            info!(source = %addr.ip(), path = %path, "access event received");
            state
                .access_log
                .append(&format!("Received POST to path: {path}"))
                .await;
            state
                .access_log
                .append(&format!("Content-Type: {content_type}"))
                .await;
            state.access_log.append(&decoded_body).await;

            if let Some(backend) = state.backend.as_ref() {
                match backend.ingest_access_event(&parsed).await {
                    Ok(true) => {
                        state
                            .event_log
                            .append("Access event forwarded to backend")
                            .await;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!(error = %err, "access event forwarding failed");
                        state
                            .event_log
                            .append(&format!("Failed to forward access event: {err}"))
                            .await;
                    }
                }
            }
        }
    }

    (StatusCode::OK, "OK").into_response()
}
