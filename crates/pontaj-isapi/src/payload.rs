//! Vendor-schema payload builders.
//!
//! All builders validate mandatory fields and fail with
//! [`IsapiError::Validation`] before any network call. Field names follow
//! the vendor's mixed-case JSON schema exactly.

use pontaj_core::Employee;
use serde::Serialize;

use crate::error::{IsapiError, IsapiResult};

/// Public-object path under which face photos live in the storage bucket.
pub const STORAGE_PHOTO_PATH: &str = "storage/v1/object/public/pontaj-photos";

/// Host suffix of the storage provider; terminals refuse to fetch images
/// from it over plain HTTP.
pub const STORAGE_HOST_SUFFIX: &str = ".supabase.co";

/// Fixed validity window granted to every person record.
pub const VALID_FROM: &str = "2025-10-10T00:00:00";
pub const VALID_UNTIL: &str = "2037-12-31T23:59:59";

/// Person record for `POST /ISAPI/AccessControl/UserInfo/Record`.
#[derive(Debug, Clone, Serialize)]
pub struct PersonRecord {
    #[serde(rename = "UserInfo")]
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// The device expects the employee number in string form.
    #[serde(rename = "employeeNo")]
    pub employee_no: String,
    pub name: String,
    #[serde(rename = "userType")]
    pub user_type: &'static str,
    #[serde(rename = "Valid")]
    pub valid: ValidPeriod,
    #[serde(rename = "doorRight")]
    pub door_right: &'static str,
    #[serde(rename = "RightPlan")]
    pub right_plan: Vec<RightPlan>,
    #[serde(rename = "userVerifyMode")]
    pub user_verify_mode: &'static str,
    #[serde(rename = "localUIRight")]
    pub local_ui_right: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidPeriod {
    pub enable: bool,
    #[serde(rename = "beginTime")]
    pub begin_time: &'static str,
    #[serde(rename = "endTime")]
    pub end_time: &'static str,
    #[serde(rename = "timeType")]
    pub time_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RightPlan {
    #[serde(rename = "doorNo")]
    pub door_no: u32,
    #[serde(rename = "planTemplateNo")]
    pub plan_template_no: &'static str,
}

/// Face record for the FDLib endpoints. The update variant carries a fixed
/// `faceID`; metadata-only variants (multipart transport) omit `faceURL`.
#[derive(Debug, Clone, Serialize)]
pub struct FaceRecord {
    #[serde(rename = "faceLibType")]
    pub face_lib_type: &'static str,
    #[serde(rename = "FDID")]
    pub fdid: &'static str,
    #[serde(rename = "FPID")]
    pub fpid: String,
    #[serde(rename = "faceID", skip_serializing_if = "Option::is_none")]
    pub face_id: Option<&'static str>,
    #[serde(rename = "faceURL", skip_serializing_if = "Option::is_none")]
    pub face_url: Option<String>,
}

/// Deletion record for `PUT /ISAPI/AccessControl/UserInfoDetail/Delete`.
#[derive(Debug, Clone, Serialize)]
pub struct PersonDeleteRecord {
    #[serde(rename = "UserInfoDetail")]
    pub user_info_detail: UserInfoDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfoDetail {
    pub mode: &'static str,
    #[serde(rename = "EmployeeNoList")]
    pub employee_no_list: Vec<EmployeeNoEntry>,
    #[serde(rename = "operateType")]
    pub operate_type: &'static str,
    #[serde(rename = "terminalNoList")]
    pub terminal_no_list: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeNoEntry {
    #[serde(rename = "employeeNo")]
    pub employee_no: String,
}

fn require_employee_no(employee: &Employee, what: &str) -> IsapiResult<u32> {
    employee
        .employee_no()
        .ok_or_else(|| IsapiError::Validation(format!("employee_no is required for {what}")))
}

/// Build the person-creation payload.
pub fn build_person_record(employee: &Employee) -> IsapiResult<PersonRecord> {
    let employee_no = require_employee_no(employee, "sync")?;

    Ok(PersonRecord {
        user_info: UserInfo {
            employee_no: employee_no.to_string(),
            name: employee.display_name(),
            user_type: "normal",
            valid: ValidPeriod {
                enable: employee.is_active(),
                begin_time: VALID_FROM,
                end_time: VALID_UNTIL,
                time_type: "local",
            },
            door_right: "1",
            right_plan: vec![RightPlan {
                door_no: 1,
                plan_template_no: "1",
            }],
            user_verify_mode: "face",
            local_ui_right: false,
        },
    })
}

/// Resolve the face photo reference into a fetchable URL.
///
/// A bare filename is completed against the storage base; an `http://` URL
/// pointing at the storage provider is rewritten to `https://`.
pub fn resolve_photo_url(employee: &Employee, storage_base: Option<&str>) -> IsapiResult<String> {
    let reference = employee
        .face_photo()
        .ok_or_else(|| IsapiError::Validation("foto_fata_url is required for face image sync".into()))?;

    let mut url = if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else {
        let base = storage_base.ok_or_else(|| {
            IsapiError::Validation(format!(
                "foto_fata_url is just a filename ('{reference}') but no storage base URL was provided"
            ))
        })?;
        format!(
            "{}/{STORAGE_PHOTO_PATH}/{reference}",
            base.trim_end_matches('/')
        )
    };

    if url.starts_with("http://") && url.contains(STORAGE_HOST_SUFFIX) {
        url = url.replacen("http://", "https://", 1);
    }

    Ok(url)
}

/// Face-creation payload with the image referenced by URL.
pub fn build_face_record(employee: &Employee, storage_base: Option<&str>) -> IsapiResult<FaceRecord> {
    let employee_no = require_employee_no(employee, "face image sync")?;
    let face_url = resolve_photo_url(employee, storage_base)?;

    Ok(FaceRecord {
        face_lib_type: "blackFD",
        fdid: "1",
        fpid: employee_no.to_string(),
        face_id: None,
        face_url: Some(face_url),
    })
}

/// Face-update payload (PUT) with the image referenced by URL.
pub fn build_face_update_record(
    employee: &Employee,
    storage_base: Option<&str>,
) -> IsapiResult<FaceRecord> {
    let employee_no = require_employee_no(employee, "face image update")?;
    let face_url = resolve_photo_url(employee, storage_base)?;

    Ok(FaceRecord {
        face_lib_type: "blackFD",
        fdid: "1",
        fpid: employee_no.to_string(),
        face_id: Some("1"),
        face_url: Some(face_url),
    })
}

/// Metadata-only face-creation payload; the image travels as a separate
/// multipart part.
pub fn build_face_metadata(employee: &Employee) -> IsapiResult<FaceRecord> {
    let employee_no = require_employee_no(employee, "face image sync")?;
    Ok(FaceRecord {
        face_lib_type: "blackFD",
        fdid: "1",
        fpid: employee_no.to_string(),
        face_id: None,
        face_url: None,
    })
}

/// Metadata-only face-update payload for the multipart PUT.
pub fn build_face_update_metadata(employee: &Employee) -> IsapiResult<FaceRecord> {
    let employee_no = require_employee_no(employee, "face image update")?;
    Ok(FaceRecord {
        face_lib_type: "blackFD",
        fdid: "1",
        fpid: employee_no.to_string(),
        face_id: Some("1"),
        face_url: None,
    })
}

/// Deletion-by-employee-number payload targeting terminal 1.
pub fn build_person_delete_record(employee: &Employee) -> IsapiResult<PersonDeleteRecord> {
    let employee_no = require_employee_no(employee, "user deletion")?;

    Ok(PersonDeleteRecord {
        user_info_detail: UserInfoDetail {
            mode: "byEmployeeNo",
            employee_no_list: vec![EmployeeNoEntry {
                employee_no: employee_no.to_string(),
            }],
            operate_type: "byTerminal",
            terminal_no_list: vec![1],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pontaj_core::BiometricProfile;

    fn employee(no: Option<u32>, photo: Option<&str>) -> Employee {
        Employee {
            id: "a1".into(),
            given_name: Some("Ion".into()),
            family_name: Some("Pop".into()),
            status: Some("activ".into()),
            biometrics: Some(BiometricProfile {
                employee_no: no,
                face_photo: photo.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn person_record_matches_vendor_schema() {
        let record = build_person_record(&employee(Some(1000), None)).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["UserInfo"]["employeeNo"], "1000");
        assert_eq!(json["UserInfo"]["name"], "Ion Pop");
        assert_eq!(json["UserInfo"]["userType"], "normal");
        assert_eq!(json["UserInfo"]["Valid"]["enable"], true);
        assert_eq!(json["UserInfo"]["Valid"]["beginTime"], VALID_FROM);
        assert_eq!(json["UserInfo"]["Valid"]["endTime"], VALID_UNTIL);
        assert_eq!(json["UserInfo"]["Valid"]["timeType"], "local");
        assert_eq!(json["UserInfo"]["doorRight"], "1");
        assert_eq!(json["UserInfo"]["RightPlan"][0]["doorNo"], 1);
        assert_eq!(json["UserInfo"]["RightPlan"][0]["planTemplateNo"], "1");
        assert_eq!(json["UserInfo"]["userVerifyMode"], "face");
        assert_eq!(json["UserInfo"]["localUIRight"], false);
    }

    #[test]
    fn person_record_inactive_for_other_status() {
        let mut e = employee(Some(7), None);
        e.status = Some("suspendat".into());
        let record = build_person_record(&e).unwrap();
        assert!(!record.user_info.valid.enable);

        e.status = None;
        let record = build_person_record(&e).unwrap();
        assert!(!record.user_info.valid.enable);
    }

    #[test]
    fn person_record_requires_employee_no() {
        let err = build_person_record(&employee(None, None)).unwrap_err();
        assert!(matches!(err, IsapiError::Validation(_)));
    }

    #[test]
    fn photo_url_completed_from_filename() {
        let e = employee(Some(12), Some("photo1.jpg"));
        let url = resolve_photo_url(&e, Some("https://x.example.co")).unwrap();
        assert_eq!(
            url,
            "https://x.example.co/storage/v1/object/public/pontaj-photos/photo1.jpg"
        );
    }

    #[test]
    fn photo_url_filename_without_base_is_validation_error() {
        let e = employee(Some(12), Some("photo1.jpg"));
        let err = resolve_photo_url(&e, None).unwrap_err();
        assert!(matches!(err, IsapiError::Validation(_)));
    }

    #[test]
    fn photo_url_insecure_storage_scheme_rewritten() {
        let e = employee(
            Some(12),
            Some("http://proj.supabase.co/storage/v1/object/public/pontaj-photos/a.jpg"),
        );
        let url = resolve_photo_url(&e, None).unwrap();
        assert_eq!(
            url,
            "https://proj.supabase.co/storage/v1/object/public/pontaj-photos/a.jpg"
        );
    }

    #[test]
    fn photo_url_insecure_foreign_host_left_alone() {
        let e = employee(Some(12), Some("http://cdn.example.org/a.jpg"));
        let url = resolve_photo_url(&e, None).unwrap();
        assert_eq!(url, "http://cdn.example.org/a.jpg");
    }

    #[test]
    fn face_update_record_carries_face_id() {
        let e = employee(Some(12), Some("test.jpg"));
        let record = build_face_update_record(&e, Some("https://p.supabase.co")).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["faceLibType"], "blackFD");
        assert_eq!(json["FDID"], "1");
        assert_eq!(json["FPID"], "12");
        assert_eq!(json["faceID"], "1");
        assert_eq!(
            json["faceURL"],
            "https://p.supabase.co/storage/v1/object/public/pontaj-photos/test.jpg"
        );
    }

    #[test]
    fn face_metadata_omits_url() {
        let e = employee(Some(12), Some("test.jpg"));
        let json = serde_json::to_value(build_face_metadata(&e).unwrap()).unwrap();
        assert!(json.get("faceURL").is_none());
        assert!(json.get("faceID").is_none());

        let json = serde_json::to_value(build_face_update_metadata(&e).unwrap()).unwrap();
        assert!(json.get("faceURL").is_none());
        assert_eq!(json["faceID"], "1");
    }

    #[test]
    fn face_record_requires_photo_reference() {
        let e = employee(Some(12), None);
        let err = build_face_record(&e, Some("https://p.supabase.co")).unwrap_err();
        assert!(matches!(err, IsapiError::Validation(_)));
    }

    #[test]
    fn delete_record_targets_terminal_one() {
        let record = build_person_delete_record(&employee(Some(1000), None)).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["UserInfoDetail"]["mode"], "byEmployeeNo");
        assert_eq!(
            json["UserInfoDetail"]["EmployeeNoList"][0]["employeeNo"],
            "1000"
        );
        assert_eq!(json["UserInfoDetail"]["operateType"], "byTerminal");
        assert_eq!(json["UserInfoDetail"]["terminalNoList"][0], 1);
    }
}
