//! Scripted stub of the device-operations trait.
#![allow(dead_code)]

use async_trait::async_trait;
use pontaj_core::{Device, Employee, SyncOutcome, SyncStep};
use pontaj_isapi::{DeviceOps, PhotoConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Device stub returning pre-scripted outcomes and counting calls.
///
/// Outcomes can be overridden per device id; anything unscripted gets the
/// per-operation default (a plain success).
pub struct StubDeviceOps {
    person_default: SyncOutcome,
    photo_add_default: SyncOutcome,
    photo_update_default: SyncOutcome,
    delete_default: SyncOutcome,
    person_by_device: HashMap<String, SyncOutcome>,
    photo_add_by_device: HashMap<String, SyncOutcome>,
    pub person_calls: AtomicUsize,
    pub photo_add_calls: AtomicUsize,
    pub photo_update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl Default for StubDeviceOps {
    fn default() -> Self {
        Self {
            person_default: SyncOutcome::success(
                "Person created/updated successfully",
                SyncStep::Person,
            ),
            photo_add_default: SyncOutcome::success(
                "Face image added successfully",
                SyncStep::Photo,
            ),
            photo_update_default: SyncOutcome::success(
                "Face image updated successfully (PUT)",
                SyncStep::Photo,
            ),
            delete_default: SyncOutcome::success("User deleted successfully", SyncStep::Delete),
            person_by_device: HashMap::new(),
            photo_add_by_device: HashMap::new(),
            person_calls: AtomicUsize::new(0),
            photo_add_calls: AtomicUsize::new(0),
            photo_update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

impl StubDeviceOps {
    pub fn with_person_default(mut self, outcome: SyncOutcome) -> Self {
        self.person_default = outcome;
        self
    }

    pub fn with_photo_add_default(mut self, outcome: SyncOutcome) -> Self {
        self.photo_add_default = outcome;
        self
    }

    pub fn with_photo_update_default(mut self, outcome: SyncOutcome) -> Self {
        self.photo_update_default = outcome;
        self
    }

    pub fn with_delete_default(mut self, outcome: SyncOutcome) -> Self {
        self.delete_default = outcome;
        self
    }

    pub fn with_person_for(mut self, device_id: &str, outcome: SyncOutcome) -> Self {
        self.person_by_device.insert(device_id.to_string(), outcome);
        self
    }

    pub fn with_photo_add_for(mut self, device_id: &str, outcome: SyncOutcome) -> Self {
        self.photo_add_by_device
            .insert(device_id.to_string(), outcome);
        self
    }

    pub fn person_call_count(&self) -> usize {
        self.person_calls.load(Ordering::SeqCst)
    }

    pub fn photo_add_call_count(&self) -> usize {
        self.photo_add_calls.load(Ordering::SeqCst)
    }

    pub fn photo_update_call_count(&self) -> usize {
        self.photo_update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceOps for StubDeviceOps {
    async fn create_person(&self, device: &Device, _employee: &Employee) -> SyncOutcome {
        self.person_calls.fetch_add(1, Ordering::SeqCst);
        self.person_by_device
            .get(&device.id)
            .cloned()
            .unwrap_or_else(|| self.person_default.clone())
    }

    async fn add_face_photo(
        &self,
        device: &Device,
        _employee: &Employee,
        _photo: &PhotoConfig,
    ) -> SyncOutcome {
        self.photo_add_calls.fetch_add(1, Ordering::SeqCst);
        self.photo_add_by_device
            .get(&device.id)
            .cloned()
            .unwrap_or_else(|| self.photo_add_default.clone())
    }

    async fn update_face_photo(
        &self,
        _device: &Device,
        _employee: &Employee,
        _photo: &PhotoConfig,
    ) -> SyncOutcome {
        self.photo_update_calls.fetch_add(1, Ordering::SeqCst);
        self.photo_update_default.clone()
    }

    async fn delete_person(&self, _device: &Device, _employee: &Employee) -> SyncOutcome {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.delete_default.clone()
    }
}

/// Employee with full biometric enrollment.
pub fn enrolled_employee() -> Employee {
    Employee {
        id: "a1".into(),
        given_name: Some("Ion".into()),
        family_name: Some("Pop".into()),
        status: Some("activ".into()),
        biometrics: Some(pontaj_core::BiometricProfile {
            employee_no: Some(1000),
            face_photo: Some("photo1.jpg".into()),
        }),
        ..Default::default()
    }
}

/// Employee without an employee number.
pub fn unenrolled_employee() -> Employee {
    Employee {
        id: "a2".into(),
        biometrics: Some(pontaj_core::BiometricProfile::default()),
        ..Default::default()
    }
}

pub fn device(id: &str, ip: &str) -> Device {
    Device {
        id: id.into(),
        ip_address: ip.into(),
        username: "admin".into(),
        password: "pw".into(),
        ..Default::default()
    }
}
