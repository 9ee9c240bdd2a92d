//! Vendor response classification.
//!
//! One generic routine turns a raw `(HTTP status, body)` pair into a
//! [`SyncOutcome`], parameterized by a per-operation [`ResponsePolicy`].
//! The body is inspected even on non-200 responses: depending on firmware,
//! "already exists" may arrive as HTTP 200 or HTTP 400 with the detail only
//! in the embedded `statusCode`/`subStatusCode` fields.

use pontaj_core::{OutcomeKind, SyncOutcome, SyncStep};
use serde_json::Value;

/// Embedded vendor status code meaning "ok".
const ISAPI_STATUS_OK: i64 = 1;
/// Embedded vendor status code for precondition conflicts ("already exists",
/// "not found").
const ISAPI_STATUS_CONFLICT: i64 = 6;

/// Maximum number of response-body characters preserved in messages.
const BODY_EXCERPT_CHARS: usize = 200;

/// How an operation recognizes its idempotent "already done" response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotentSignal {
    /// `statusCode=6` with `subStatusCode="employeeNoAlreadyExist"`.
    EmployeeExists,
    /// `statusCode=6`, or a status string saying the record is gone.
    RecordMissing,
    /// `statusCode=6` with `subStatusCode="deviceUserAlreadyExistFace"`.
    FaceExists,
    /// `statusCode=6` with "alreadyExist" anywhere in sub-status or status
    /// string (firmware wording varies on the PUT path).
    FaceExistsLoose,
}

impl IdempotentSignal {
    fn matches(self, status_code: Option<i64>, sub_status: &str, status_string: &str) -> bool {
        let conflict = status_code == Some(ISAPI_STATUS_CONFLICT);
        match self {
            IdempotentSignal::EmployeeExists => conflict && sub_status == "employeeNoAlreadyExist",
            IdempotentSignal::RecordMissing => {
                let lowered = status_string.to_lowercase();
                conflict || lowered.contains("not found") || lowered.contains("does not exist")
            }
            IdempotentSignal::FaceExists => conflict && sub_status == "deviceUserAlreadyExistFace",
            IdempotentSignal::FaceExistsLoose => {
                conflict
                    && (sub_status.contains("alreadyExist") || status_string.contains("alreadyExist"))
            }
        }
    }
}

/// Per-operation classification policy (the severity table).
#[derive(Debug, Clone, Copy)]
pub struct ResponsePolicy {
    pub step: SyncStep,
    pub idempotent: IdempotentSignal,
    /// Severity of a parsed vendor body that is neither success nor the
    /// idempotent signal.
    pub isapi_error_kind: OutcomeKind,
    /// Whether an unparseable HTTP 200 counts as success. True only for the
    /// face endpoints, which have no strict body contract.
    pub raw_success_on_200: bool,
    /// Severity of an unparseable non-200 response.
    pub raw_error_kind: OutcomeKind,
    /// Severity of timeouts and connection failures.
    pub transport_error_kind: OutcomeKind,
    pub success_message: &'static str,
    pub idempotent_message: &'static str,
    pub error_prefix: &'static str,
}

pub const PERSON_CREATE: ResponsePolicy = ResponsePolicy {
    step: SyncStep::Person,
    idempotent: IdempotentSignal::EmployeeExists,
    isapi_error_kind: OutcomeKind::Fatal,
    raw_success_on_200: false,
    raw_error_kind: OutcomeKind::Fatal,
    transport_error_kind: OutcomeKind::Fatal,
    success_message: "Person created/updated successfully",
    idempotent_message: "Person already exists on device",
    error_prefix: "ISAPI error",
};

pub const PERSON_DELETE: ResponsePolicy = ResponsePolicy {
    step: SyncStep::Delete,
    idempotent: IdempotentSignal::RecordMissing,
    isapi_error_kind: OutcomeKind::Partial,
    raw_success_on_200: false,
    raw_error_kind: OutcomeKind::Fatal,
    transport_error_kind: OutcomeKind::Fatal,
    success_message: "User deleted successfully",
    idempotent_message: "User not found on device (already deleted or never existed)",
    error_prefix: "ISAPI error",
};

pub const FACE_ADD: ResponsePolicy = ResponsePolicy {
    step: SyncStep::Photo,
    idempotent: IdempotentSignal::FaceExists,
    isapi_error_kind: OutcomeKind::Partial,
    raw_success_on_200: true,
    raw_error_kind: OutcomeKind::Partial,
    transport_error_kind: OutcomeKind::Partial,
    success_message: "Face image added successfully",
    idempotent_message: "Face image already exists on device",
    error_prefix: "Face image failed",
};

pub const FACE_UPDATE: ResponsePolicy = ResponsePolicy {
    step: SyncStep::Photo,
    idempotent: IdempotentSignal::FaceExistsLoose,
    isapi_error_kind: OutcomeKind::Partial,
    raw_success_on_200: true,
    raw_error_kind: OutcomeKind::Partial,
    transport_error_kind: OutcomeKind::Partial,
    success_message: "Face image updated successfully (PUT)",
    idempotent_message: "Face image already exists on device (PUT)",
    error_prefix: "Face image update failed",
};

/// Classify a vendor response into an outcome.
pub fn classify(policy: &ResponsePolicy, http_status: u16, body: &str) -> SyncOutcome {
    // Auth failure is always fatal, whatever the body says.
    if http_status == 401 {
        return SyncOutcome::fatal(
            "Authentication failed - invalid device credentials",
            policy.step,
        );
    }

    match serde_json::from_str::<Value>(body) {
        Ok(data) => classify_body(policy, &data),
        Err(_) => classify_raw(policy, http_status, body),
    }
}

fn classify_body(policy: &ResponsePolicy, data: &Value) -> SyncOutcome {
    let status_code = data.get("statusCode").and_then(Value::as_i64);
    let sub_status = data
        .get("subStatusCode")
        .and_then(Value::as_str)
        .unwrap_or("");
    let status_string = data
        .get("statusString")
        .and_then(Value::as_str)
        .unwrap_or("");

    if status_code == Some(ISAPI_STATUS_OK)
        && (sub_status == "ok" || status_string.eq_ignore_ascii_case("ok"))
    {
        return SyncOutcome::success(policy.success_message, policy.step);
    }

    if policy
        .idempotent
        .matches(status_code, sub_status, status_string)
    {
        return SyncOutcome::success(policy.idempotent_message, policy.step);
    }

    let error_msg = data
        .get("errorMsg")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(status_string);

    SyncOutcome::new(
        policy.isapi_error_kind,
        format!(
            "{}: statusCode={}, subStatusCode={sub_status}, statusString={status_string}, errorMsg={error_msg}",
            policy.error_prefix,
            status_code.map_or_else(|| "none".to_string(), |c| c.to_string()),
        ),
        policy.step,
    )
}

fn classify_raw(policy: &ResponsePolicy, http_status: u16, body: &str) -> SyncOutcome {
    let excerpt = body_excerpt(body);

    if http_status == 200 {
        if policy.raw_success_on_200 {
            return SyncOutcome::success(policy.success_message, policy.step);
        }
        // A success status with a body we cannot parse is ambiguous and
        // therefore fatal for operations with a body contract.
        return SyncOutcome::fatal(
            format!("HTTP 200 but failed to parse response: {excerpt}"),
            policy.step,
        );
    }

    SyncOutcome::new(
        policy.raw_error_kind,
        format!("{}: HTTP {http_status}: {excerpt}", policy.error_prefix),
        policy.step,
    )
}

fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
