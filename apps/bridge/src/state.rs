//! Shared application state.

use pontaj_backend::BackendClient;
use pontaj_core::Device;
use pontaj_isapi::{DeviceClient, PhotoConfig};
use pontaj_sync::{BulkSyncDriver, SyncPacing};
use std::sync::Arc;

use crate::allowlist::IpAllowlist;
use crate::auth::JwtVerifier;
use crate::config::AppConfig;
use crate::devices::DeviceFileCache;
use crate::eventlog::DailyLogFile;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Option<Arc<BackendClient>>,
    pub device_client: Arc<DeviceClient>,
    pub verifier: Arc<JwtVerifier>,
    pub allowlist: Arc<IpAllowlist>,
    pub device_cache: Arc<DeviceFileCache>,
    pub event_log: Arc<DailyLogFile>,
    pub access_log: Arc<DailyLogFile>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, String> {
        let backend = match config.backend_url.as_deref() {
            Some(url) => Some(Arc::new(
                BackendClient::new(
                    url,
                    config.backend_api_key.clone(),
                    config.event_ingest_url.clone(),
                )
                .map_err(|e| e.to_string())?,
            )),
            None => None,
        };
        let device_client =
            Arc::new(DeviceClient::new().map_err(|e| e.to_string())?);
        let verifier = Arc::new(JwtVerifier::new(
            config.jwks_url.clone(),
            config.jwt_secret.clone(),
        ));
        let allowlist = Arc::new(IpAllowlist::from_entries(&config.allowed_event_sources));
        let device_cache = Arc::new(DeviceFileCache::new(config.devices_file.clone()));
        let event_log = Arc::new(DailyLogFile::new(
            config.log_dir.clone(),
            "hikvision_events",
            "hikvision_events_{date}.log",
        ));
        let access_log = Arc::new(DailyLogFile::new(
            config.log_dir.clone(),
            "hikvision_access",
            "Access Log {date}.log",
        ));

        Ok(Self {
            config: Arc::new(config),
            backend,
            device_client,
            verifier,
            allowlist,
            device_cache,
            event_log,
            access_log,
        })
    }

    /// Photo configuration for sync runs.
    #[must_use]
    pub fn photo_config(&self) -> PhotoConfig {
        PhotoConfig {
            transport: self.config.photo_transport,
            storage_base: self.config.backend_url.clone(),
        }
    }

    /// Bulk driver over the shared device client.
    #[must_use]
    pub fn driver(&self) -> BulkSyncDriver<DeviceClient> {
        BulkSyncDriver::new(
            self.device_client.clone(),
            SyncPacing::new(self.config.inter_call_delay),
            self.photo_config(),
        )
    }

    /// Active devices: the backend when configured, the legacy config file
    /// otherwise.
    pub async fn active_devices(&self) -> Result<Vec<Device>, String> {
        if let Some(backend) = self.backend.as_ref() {
            return backend
                .get_active_devices()
                .await
                .map_err(|e| e.to_string());
        }
        let (devices, _from_cache) = self.device_cache.devices().await;
        Ok(devices)
    }
}
