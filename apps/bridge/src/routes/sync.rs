//! Sync control-plane endpoints.
//!
//! Every endpoint answers HTTP 200 with the status embedded in the body,
//! even for partial or fatal batch outcomes: batch callers inspect the
//! per-device results instead of handling HTTP error branches. Only
//! malformed requests and missing backend configuration produce the
//! `{"status": "error"}` envelope.

use axum::extract::State;
use axum::Json;
use pontaj_core::Employee;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct SyncRequest {
    #[serde(default)]
    pub angajat_id: Option<String>,
}

fn error_body(error: impl std::fmt::Display, error_type: &str) -> Json<Value> {
    Json(json!({
        "status": "error",
        "error": error.to_string(),
        "error_type": error_type,
    }))
}

enum Prepared {
    Ready {
        employee: Employee,
        devices: Vec<pontaj_core::Device>,
    },
    Failed(Json<Value>),
}

/// Shared request preamble: backend present, employee found, devices found.
async fn prepare(state: &AppState, request: &SyncRequest) -> Prepared {
    let Some(backend) = state.backend.clone() else {
        return Prepared::Failed(error_body("Backend is not configured", "ConfigurationError"));
    };
    let Some(employee_id) = request.angajat_id.as_deref().filter(|s| !s.is_empty()) else {
        return Prepared::Failed(error_body(
            "Missing required field: angajat_id",
            "ValidationError",
        ));
    };

    let employee = match backend.get_employee(employee_id).await {
        Ok(Some(employee)) => employee,
        Ok(None) => {
            return Prepared::Failed(error_body(
                format!("Angajat {employee_id} not found"),
                "NotFound",
            ));
        }
        Err(err) => {
            error!(error = %err, "employee lookup failed");
            return Prepared::Failed(error_body(err, "BackendError"));
        }
    };

    let devices = match state.active_devices().await {
        Ok(devices) if !devices.is_empty() => devices,
        Ok(_) => return Prepared::Failed(error_body("No active devices found", "NotFound")),
        Err(err) => {
            error!(error = %err, "device lookup failed");
            return Prepared::Failed(error_body(err, "BackendError"));
        }
    };

    Prepared::Ready { employee, devices }
}

/// `POST /api/hikvision/sync-angajat-all-devices`
pub async fn sync_employee_all_devices(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Json<Value> {
    let (employee, devices) = match prepare(&state, &request).await {
        Prepared::Ready { employee, devices } => (employee, devices),
        Prepared::Failed(body) => return body,
    };

    info!(employee = %employee.id, devices = devices.len(), "syncing employee to all devices");
    let report = state.driver().sync_employee(&employee, &devices).await;

    Json(json!({
        "status": "ok",
        "summary": report.summary,
        "per_device": report.per_device,
    }))
}

/// `POST /api/hikvision/sync-all-angajati-all-devices`
pub async fn sync_all_employees_all_devices(State(state): State<AppState>) -> Json<Value> {
    let Some(backend) = state.backend.clone() else {
        return error_body("Backend is not configured", "ConfigurationError");
    };

    let employees = match backend.get_employees_with_biometrics().await {
        Ok(employees) if !employees.is_empty() => employees,
        Ok(_) => return error_body("No active angajati with biometrics found", "NotFound"),
        Err(err) => return error_body(err, "BackendError"),
    };
    let devices = match state.active_devices().await {
        Ok(devices) if !devices.is_empty() => devices,
        Ok(_) => return error_body("No active devices found", "NotFound"),
        Err(err) => return error_body(err, "BackendError"),
    };

    info!(
        employees = employees.len(),
        devices = devices.len(),
        "fleet resync started"
    );
    let report = state.driver().sync_fleet(&employees, &devices).await;

    Json(json!({
        "status": "ok",
        "summary": report.summary,
        "employee_results": report.employee_results,
    }))
}

/// `POST /api/hikvision/sync-photo-angajat-all-devices`
pub async fn sync_photo_all_devices(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Json<Value> {
    let (employee, devices) = match prepare(&state, &request).await {
        Prepared::Ready { employee, devices } => (employee, devices),
        Prepared::Failed(body) => return body,
    };

    let report = state.driver().sync_photo(&employee, &devices).await;
    Json(json!({
        "status": "ok",
        "summary": report.summary,
        "per_device": report.per_device,
    }))
}

/// `POST /api/hikvision/update-photo-angajat-all-devices`
pub async fn update_photo_all_devices(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Json<Value> {
    let (employee, devices) = match prepare(&state, &request).await {
        Prepared::Ready { employee, devices } => (employee, devices),
        Prepared::Failed(body) => return body,
    };

    let report = state.driver().update_photo(&employee, &devices).await;
    Json(json!({
        "status": "ok",
        "summary": report.summary,
        "per_device": report.per_device,
    }))
}

/// `POST /api/hikvision/delete-angajat-all-devices`
pub async fn delete_employee_all_devices(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Json<Value> {
    let (employee, devices) = match prepare(&state, &request).await {
        Prepared::Ready { employee, devices } => (employee, devices),
        Prepared::Failed(body) => return body,
    };

    info!(employee = %employee.id, devices = devices.len(), "deleting employee from all devices");
    let report = state.driver().delete_employee(&employee, &devices).await;

    Json(json!({
        "status": "ok",
        "summary": report.summary,
        "per_device": report.per_device,
    }))
}
