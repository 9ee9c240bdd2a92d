//! Legacy device list from `config/devices.json`.
//!
//! Deployments without a backend keep their terminals in a local JSON file.
//! The file is small but read on every request path that needs devices, so
//! a read-through cache keyed by the file's modification time avoids
//! re-parsing until the file actually changes.

use pontaj_core::Device;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct DevicesFile {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Debug)]
struct CachedDevices {
    modified: SystemTime,
    devices: Vec<Device>,
}

/// Mtime-keyed cache over the device config file.
#[derive(Debug)]
pub struct DeviceFileCache {
    path: PathBuf,
    cached: Mutex<Option<CachedDevices>>,
}

impl DeviceFileCache {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cached: Mutex::new(None),
        }
    }

    /// Current device list plus whether it came from the cache.
    ///
    /// A missing or unparseable file yields an empty list; the bridge keeps
    /// serving and the problem is logged.
    pub async fn devices(&self) -> (Vec<Device>, bool) {
        let modified = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.modified().ok(),
            Err(_) => None,
        };
        let Some(modified) = modified else {
            return (Vec::new(), false);
        };

        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.modified == modified {
                return (entry.devices.clone(), true);
            }
        }

        let devices = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => match serde_json::from_str::<DevicesFile>(&text) {
                Ok(file) => file.devices,
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "device config parse error");
                    return (Vec::new(), false);
                }
            },
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "device config read error");
                return (Vec::new(), false);
            }
        };

        *cached = Some(CachedDevices {
            modified,
            devices: devices.clone(),
        });
        (devices, false)
    }
}
