//! Per-(employee, device) sync flows.
//!
//! Each flow validates preconditions, runs the device operations in order,
//! and folds the step outcomes into one terminal [`SyncOutcome`]. Fatal and
//! Skipped short-circuit; Partial never does.

use pontaj_core::{Device, Employee, OutcomeKind, SyncOutcome, SyncStep};
use pontaj_isapi::{DeviceOps, PhotoConfig};
use tracing::{info, warn};

const MISSING_EMPLOYEE_NO: &str = "Missing employee_no - cannot sync without employee number";
const MISSING_PHOTO_REF: &str = "Missing foto_fata_url - cannot sync photo without photo URL";

fn validate_employee_no(employee: &Employee) -> Option<SyncOutcome> {
    if employee.employee_no().is_none() {
        return Some(SyncOutcome::skipped(MISSING_EMPLOYEE_NO, SyncStep::Validation));
    }
    None
}

/// Full sync of one employee to one device: person record, then face photo.
///
/// If the person record already existed on the device the photo step is
/// skipped entirely: an existing person most likely already carries a
/// photo, and re-uploading is wasted work on rate-limited terminals.
pub async fn sync_employee_to_device<C: DeviceOps + ?Sized>(
    client: &C,
    employee: &Employee,
    device: &Device,
    photo: &PhotoConfig,
) -> SyncOutcome {
    if let Some(skipped) = validate_employee_no(employee) {
        return skipped;
    }

    let person = client.create_person(device, employee).await;
    match person.kind {
        OutcomeKind::Fatal => {
            warn!(device = %device.ip_address, employee = %employee.id, message = %person.message, "person step fatal");
            return person;
        }
        OutcomeKind::Skipped => return person,
        _ => {}
    }

    if person.already_existed() {
        return SyncOutcome::success(
            format!(
                "{}. Photo step skipped (person already exists on device)",
                person.message
            ),
            SyncStep::Person,
        );
    }

    if employee.face_photo().is_none() {
        return SyncOutcome::success(
            "Person created successfully. No photo URL available - photo step skipped",
            SyncStep::Person,
        );
    }

    let photo_result = client.add_face_photo(device, employee, photo).await;
    if photo_result.kind == OutcomeKind::Success {
        info!(device = %device.ip_address, employee = %employee.id, "person and photo synced");
        SyncOutcome::success("Person and photo synced successfully", SyncStep::Complete)
    } else {
        SyncOutcome::partial(
            format!(
                "Person created successfully, but photo sync failed: {}",
                photo_result.message
            ),
            SyncStep::Photo,
        )
    }
}

/// Photo-only sync, assuming the person record already exists on the device.
pub async fn sync_photo_to_device<C: DeviceOps + ?Sized>(
    client: &C,
    employee: &Employee,
    device: &Device,
    photo: &PhotoConfig,
) -> SyncOutcome {
    if let Some(skipped) = validate_employee_no(employee) {
        return skipped;
    }
    if employee.face_photo().is_none() {
        return SyncOutcome::skipped(MISSING_PHOTO_REF, SyncStep::Validation);
    }

    client.add_face_photo(device, employee, photo).await
}

/// Photo update with create fallback: PUT the face record, and if the
/// device refuses, POST a fresh one.
pub async fn update_photo_on_device<C: DeviceOps + ?Sized>(
    client: &C,
    employee: &Employee,
    device: &Device,
    photo: &PhotoConfig,
) -> SyncOutcome {
    if let Some(skipped) = validate_employee_no(employee) {
        return skipped;
    }
    if employee.face_photo().is_none() {
        return SyncOutcome::skipped(MISSING_PHOTO_REF, SyncStep::Validation);
    }

    let updated = client.update_face_photo(device, employee, photo).await;
    if updated.kind == OutcomeKind::Success {
        return updated;
    }

    info!(device = %device.ip_address, employee = %employee.id, "face update failed, falling back to create");
    let created = client.add_face_photo(device, employee, photo).await;
    if created.kind == OutcomeKind::Success {
        SyncOutcome::success(
            format!(
                "{} (created via POST fallback after update failed: {})",
                created.message, updated.message
            ),
            SyncStep::Photo,
        )
    } else {
        SyncOutcome::partial(
            format!(
                "Face update failed (PUT: {}; POST fallback: {})",
                updated.message, created.message
            ),
            SyncStep::Photo,
        )
    }
}

/// Delete one employee's person record from one device.
pub async fn delete_employee_from_device<C: DeviceOps + ?Sized>(
    client: &C,
    employee: &Employee,
    device: &Device,
) -> SyncOutcome {
    if let Some(skipped) = validate_employee_no(employee) {
        return skipped;
    }

    client.delete_person(device, employee).await
}
