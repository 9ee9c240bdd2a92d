//! Photo transport strategies.
//!
//! Terminals can receive a face image two ways: fetch it themselves from a
//! public URL, or accept the bytes inline as a multipart part. Both are one
//! capability selected by caller configuration; the client dispatches on it
//! instead of carrying near-duplicate function pairs.

use serde::{Deserialize, Serialize};

/// How the face image reaches the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoTransport {
    /// Send the storage URL; the device downloads the image itself.
    #[default]
    UrlReference,
    /// Download the image here and re-upload it as multipart binary content.
    /// Useful when devices cannot reach the storage host directly.
    DirectData,
}

/// Photo sync configuration threaded from the caller down to the client.
#[derive(Debug, Clone, Default)]
pub struct PhotoConfig {
    pub transport: PhotoTransport,
    /// Storage base URL used to complete bare-filename photo references.
    pub storage_base: Option<String>,
}

impl PhotoConfig {
    #[must_use]
    pub fn url_reference(storage_base: Option<String>) -> Self {
        Self {
            transport: PhotoTransport::UrlReference,
            storage_base,
        }
    }

    #[must_use]
    pub fn direct_data(storage_base: Option<String>) -> Self {
        Self {
            transport: PhotoTransport::DirectData,
            storage_base,
        }
    }

    #[must_use]
    pub fn storage_base(&self) -> Option<&str> {
        self.storage_base.as_deref()
    }
}
