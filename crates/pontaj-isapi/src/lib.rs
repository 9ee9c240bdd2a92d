//! Hikvision ISAPI device client.
//!
//! Builds vendor-schema request payloads, performs digest-authenticated
//! HTTP operations against one terminal, and classifies the vendor's
//! responses into [`pontaj_core::SyncOutcome`] values. The vendor protocol
//! conflates HTTP status with an embedded application status code, and
//! "already exists" can arrive on HTTP 200 or 400 depending on firmware, so
//! classification inspects the JSON body even on non-200 responses.

pub mod classify;
pub mod client;
pub mod error;
pub mod payload;
pub mod transport;

pub use classify::{classify, ResponsePolicy, FACE_ADD, FACE_UPDATE, PERSON_CREATE, PERSON_DELETE};
pub use client::{
    effective_port, DeviceClient, DeviceOps, CLIENT_USER_AGENT, DEFAULT_DEVICE_PORT,
    MISREPORTED_MGMT_PORT,
};
pub use error::{IsapiError, IsapiResult};
pub use transport::{PhotoConfig, PhotoTransport};
