//! Employee and device records as the backend delivers them.
//!
//! The backend has carried two field-naming schemes for devices over its
//! lifetime (`ip_address`/`ip`, `password_encrypted`/`password`,
//! `username`/`user`). Both are accepted here via serde aliases and
//! normalized into one canonical struct, so nothing downstream ever branches
//! on the wire variant.

use serde::{Deserialize, Serialize};

/// One employee (angajat) with optional biometric enrollment data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default)]
    pub id: String,
    /// Family name (`nume`).
    #[serde(rename = "nume", default)]
    pub family_name: Option<String>,
    /// Given name (`prenume`).
    #[serde(rename = "prenume", default)]
    pub given_name: Option<String>,
    /// Pre-joined full name (`nume_complet`), used when the parts are absent.
    #[serde(rename = "nume_complet", default)]
    pub full_name: Option<String>,
    /// Activation status; only the literal token `activ` (any case) counts
    /// as active.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "biometrie", default)]
    pub biometrics: Option<BiometricProfile>,
}

impl Employee {
    /// Numeric device identifier, mandatory for any device operation.
    ///
    /// Zero is treated as absent, matching the backend's convention for
    /// never-enrolled employees.
    #[must_use]
    pub fn employee_no(&self) -> Option<u32> {
        self.biometrics
            .as_ref()
            .and_then(|b| b.employee_no)
            .filter(|n| *n != 0)
    }

    /// Face photo reference: a full URL or a bare storage filename.
    #[must_use]
    pub fn face_photo(&self) -> Option<&str> {
        self.biometrics
            .as_ref()
            .and_then(|b| b.face_photo.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Display name for the device: `"{given} {family}"`, falling back to
    /// the pre-joined full name, falling back to `"Unknown"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let given = self.given_name.as_deref().unwrap_or("").trim();
        let family = self.family_name.as_deref().unwrap_or("").trim();
        if !given.is_empty() && !family.is_empty() {
            return format!("{given} {family}");
        }
        match self.full_name.as_deref().map(str::trim) {
            Some(full) if !full.is_empty() => full.to_string(),
            _ => "Unknown".to_string(),
        }
    }

    /// Case-insensitive check of the single recognized active token.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("activ"))
    }
}

/// Biometric enrollment fields nested under an employee record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiometricProfile {
    #[serde(default)]
    pub employee_no: Option<u32>,
    #[serde(rename = "foto_fata_url", default)]
    pub face_photo: Option<String>,
}

/// One access terminal with its network address and digest credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "ip", default)]
    pub ip_address: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(alias = "user", default)]
    pub username: String,
    /// Despite the historical wire name, this field carries the plaintext
    /// device password.
    #[serde(rename = "password_encrypted", alias = "password", default)]
    pub password: String,
}
