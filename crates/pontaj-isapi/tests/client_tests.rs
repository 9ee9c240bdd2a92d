//! Integration tests for the device operation client.
//!
//! A wiremock server plays the terminal: it issues digest challenges,
//! answers with embedded vendor status codes, and simulates the firmware
//! quirk of returning "already exists" on HTTP 400.

use pontaj_core::{BiometricProfile, Device, Employee, OutcomeKind};
use pontaj_isapi::{DeviceClient, DeviceOps, PhotoConfig};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIGEST_CHALLENGE: &str =
    r#"Digest realm="IP Camera(C1222)", qop="auth", nonce="abcdef0123456789", opaque="00000000""#;

fn mock_device(server: &MockServer) -> Device {
    let port = server
        .uri()
        .rsplit(':')
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .expect("mock server port");
    Device {
        id: "dev-1".into(),
        name: Some("Terminal 1".into()),
        ip_address: "127.0.0.1".into(),
        port: Some(port),
        username: "admin".into(),
        password: "pass1234".into(),
    }
}

fn enrolled_employee() -> Employee {
    Employee {
        id: "a1".into(),
        given_name: Some("Ion".into()),
        family_name: Some("Pop".into()),
        status: Some("activ".into()),
        biometrics: Some(BiometricProfile {
            employee_no: Some(1000),
            face_photo: Some("photo1.jpg".into()),
        }),
        ..Default::default()
    }
}

fn ok_body() -> serde_json::Value {
    serde_json::json!({"statusCode": 1, "subStatusCode": "ok", "statusString": "OK"})
}

/// Mount the digest dance for one endpoint: 401 + challenge without an
/// Authorization header, the given response once credentials are presented.
async fn mount_digest_endpoint(
    server: &MockServer,
    http_method: &str,
    endpoint: &str,
    authorized: ResponseTemplate,
) {
    Mock::given(method(http_method))
        .and(path(endpoint))
        .and(header_exists("Authorization"))
        .respond_with(authorized)
        .mount(server)
        .await;
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", DIGEST_CHALLENGE),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_person_succeeds_through_digest_challenge() {
    let server = MockServer::start().await;
    mount_digest_endpoint(
        &server,
        "POST",
        "/ISAPI/AccessControl/UserInfo/Record",
        ResponseTemplate::new(200).set_body_json(ok_body()),
    )
    .await;

    let client = DeviceClient::new().unwrap();
    let outcome = client
        .create_person(&mock_device(&server), &enrolled_employee())
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success);
    assert!(outcome.message.contains("created/updated"));
}

#[tokio::test]
async fn create_person_auth_rejection_is_fatal() {
    let server = MockServer::start().await;
    // Device rejects even the authorized retry.
    Mock::given(method("POST"))
        .and(path("/ISAPI/AccessControl/UserInfo/Record"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", DIGEST_CHALLENGE),
        )
        .mount(&server)
        .await;

    let client = DeviceClient::new().unwrap();
    let outcome = client
        .create_person(&mock_device(&server), &enrolled_employee())
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Fatal);
    assert!(outcome.message.contains("Authentication failed"));
}

#[tokio::test]
async fn create_person_is_idempotent_across_repeat_calls() {
    let server = MockServer::start().await;
    // Firmware answers HTTP 400 with the conflict detail in the body.
    Mock::given(method("POST"))
        .and(path("/ISAPI/AccessControl/UserInfo/Record"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "statusCode": 6,
            "subStatusCode": "employeeNoAlreadyExist"
        })))
        .mount(&server)
        .await;

    let client = DeviceClient::new().unwrap();
    let device = mock_device(&server);
    let employee = enrolled_employee();

    for _ in 0..2 {
        let outcome = client.create_person(&device, &employee).await;
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert!(outcome.already_existed());
    }
}

#[tokio::test]
async fn missing_employee_no_skips_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = DeviceClient::new().unwrap();
    let device = mock_device(&server);
    let employee = Employee {
        id: "a2".into(),
        biometrics: Some(BiometricProfile::default()),
        ..Default::default()
    };
    let photo = PhotoConfig::url_reference(Some("https://p.supabase.co".into()));

    let create = client.create_person(&device, &employee).await;
    assert_eq!(create.kind, OutcomeKind::Skipped);

    let face = client.add_face_photo(&device, &employee, &photo).await;
    assert_eq!(face.kind, OutcomeKind::Skipped);

    let delete = client.delete_person(&device, &employee).await;
    assert_eq!(delete.kind, OutcomeKind::Skipped);
}

#[tokio::test]
async fn unreachable_device_fatal_for_person_partial_for_photo() {
    // Nothing listens on port 1.
    let device = Device {
        id: "dead".into(),
        ip_address: "127.0.0.1".into(),
        port: Some(1),
        username: "admin".into(),
        password: "pw".into(),
        ..Default::default()
    };
    let client = DeviceClient::new().unwrap();
    let employee = enrolled_employee();
    let photo = PhotoConfig::url_reference(Some("https://p.supabase.co".into()));

    let person = client.create_person(&device, &employee).await;
    assert_eq!(person.kind, OutcomeKind::Fatal);
    assert!(person.message.contains("127.0.0.1"));

    let face = client.add_face_photo(&device, &employee, &photo).await;
    assert_eq!(face.kind, OutcomeKind::Partial);
}

#[tokio::test]
async fn add_face_via_url_reference() {
    let server = MockServer::start().await;
    mount_digest_endpoint(
        &server,
        "POST",
        "/ISAPI/Intelligent/FDLib/FaceDataRecord",
        ResponseTemplate::new(200).set_body_json(ok_body()),
    )
    .await;

    let client = DeviceClient::new().unwrap();
    let photo = PhotoConfig::url_reference(Some("https://p.supabase.co".into()));
    let outcome = client
        .add_face_photo(&mock_device(&server), &enrolled_employee(), &photo)
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success);
}

#[tokio::test]
async fn add_face_direct_data_uploads_downloaded_image() {
    let server = MockServer::start().await;
    let image_bytes: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    Mock::given(method("GET"))
        .and(path("/photos/face.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image_bytes))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ISAPI/Intelligent/FDLib/FaceDataRecord"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;

    let mut employee = enrolled_employee();
    employee.biometrics.as_mut().unwrap().face_photo =
        Some(format!("{}/photos/face.jpg", server.uri()));

    let client = DeviceClient::new().unwrap();
    let photo = PhotoConfig::direct_data(None);
    let outcome = client
        .add_face_photo(&mock_device(&server), &employee, &photo)
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success);
}

#[tokio::test]
async fn direct_data_download_failure_is_partial_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    // The face endpoint must never be reached.
    Mock::given(method("POST"))
        .and(path("/ISAPI/Intelligent/FDLib/FaceDataRecord"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut employee = enrolled_employee();
    employee.biometrics.as_mut().unwrap().face_photo =
        Some(format!("{}/photos/missing.jpg", server.uri()));

    let client = DeviceClient::new().unwrap();
    let outcome = client
        .add_face_photo(&mock_device(&server), &employee, &PhotoConfig::direct_data(None))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Partial);
    assert!(outcome.message.contains("Failed to download image"));
}

#[tokio::test]
async fn update_face_put_errors_stay_partial_for_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/ISAPI/Intelligent/FDLib/FDModify"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "statusCode": 4,
            "subStatusCode": "notSupport",
            "statusString": "Not Support"
        })))
        .mount(&server)
        .await;

    let client = DeviceClient::new().unwrap();
    let photo = PhotoConfig::url_reference(Some("https://p.supabase.co".into()));
    let outcome = client
        .update_face_photo(&mock_device(&server), &enrolled_employee(), &photo)
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Partial);
    assert!(outcome.message.contains("notSupport"));
}

#[tokio::test]
async fn delete_missing_person_is_idempotent_success() {
    let server = MockServer::start().await;
    mount_digest_endpoint(
        &server,
        "PUT",
        "/ISAPI/AccessControl/UserInfoDetail/Delete",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statusCode": 6,
            "subStatusCode": "employeeNoNotExist",
            "statusString": "employee not found"
        })),
    )
    .await;

    let client = DeviceClient::new().unwrap();
    let outcome = client
        .delete_person(&mock_device(&server), &enrolled_employee())
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success);
    assert!(outcome.message.contains("not found"));
}
