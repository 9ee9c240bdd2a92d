//! Bridge configuration.
//!
//! Values come from environment variables first, falling back to an
//! optional JSON settings file (`config/app_settings.json`), matching how
//! the service has historically been deployed.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pontaj_isapi::PhotoTransport;

/// Default API key the backend proxy was provisioned with.
const DEFAULT_API_KEY: &str = "hikvision-sync-2024";

/// Shape of the optional settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_jwks_url: Option<String>,
    #[serde(default)]
    pub supabase_jwt_secret: Option<String>,
    #[serde(default)]
    pub backend_api_key: Option<String>,
    #[serde(default)]
    pub event_ingest_url: Option<String>,
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(default)]
    pub allowed_event_sources: Option<Vec<String>>,
    #[serde(default)]
    pub listen_addr: Option<String>,
    #[serde(default)]
    pub photo_transport: Option<String>,
    #[serde(default)]
    pub inter_call_delay_ms: Option<u64>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL; sync endpoints answer with an error envelope when
    /// it is absent.
    pub backend_url: Option<String>,
    pub backend_api_key: String,
    pub event_ingest_url: Option<String>,
    pub jwks_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub allowed_origins: Vec<String>,
    /// CIDR ranges allowed to post device events.
    pub allowed_event_sources: Vec<String>,
    pub listen_addr: String,
    pub photo_transport: PhotoTransport,
    pub inter_call_delay: Duration,
    pub devices_file: PathBuf,
    pub faces_dir: PathBuf,
    pub log_dir: PathBuf,
}

fn env_or(env_key: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(env_key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or(fallback)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    /// Load configuration from the environment, with `settings_path` (if it
    /// exists) supplying defaults.
    pub fn load(settings_path: &Path) -> Self {
        let file: SettingsFile = std::fs::read_to_string(settings_path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();

        let allowed_origins = env_or("ALLOWED_ORIGINS", None)
            .map(|v| split_csv(&v))
            .or(file.allowed_origins)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);

        let allowed_event_sources = env_or("ALLOWED_EVENT_SOURCES", None)
            .map(|v| split_csv(&v))
            .or(file.allowed_event_sources)
            .unwrap_or_default();

        let photo_transport = match env_or("PHOTO_TRANSPORT", file.photo_transport.clone())
            .as_deref()
        {
            Some("direct_data") | Some("direct") => PhotoTransport::DirectData,
            _ => PhotoTransport::UrlReference,
        };

        let inter_call_delay = env_or("INTER_CALL_DELAY_MS", None)
            .and_then(|v| v.parse().ok())
            .or(file.inter_call_delay_ms)
            .map_or(Duration::from_secs(1), Duration::from_millis);

        Self {
            backend_url: env_or("SUPABASE_URL", file.supabase_url),
            backend_api_key: env_or("BACKEND_API_KEY", file.backend_api_key)
                .unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            event_ingest_url: env_or("EVENT_INGEST_URL", file.event_ingest_url),
            jwks_url: env_or("SUPABASE_JWKS_URL", file.supabase_jwks_url),
            jwt_secret: env_or("SUPABASE_JWT_SECRET", file.supabase_jwt_secret),
            allowed_origins,
            allowed_event_sources,
            listen_addr: env_or("LISTEN_ADDR", file.listen_addr)
                .unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            photo_transport,
            inter_call_delay,
            devices_file: PathBuf::from(
                env_or("DEVICES_FILE", None).unwrap_or_else(|| "config/devices.json".to_string()),
            ),
            faces_dir: PathBuf::from(
                env_or("FACES_DIR", None).unwrap_or_else(|| "faces".to_string()),
            ),
            log_dir: PathBuf::from(env_or("LOG_DIR", None).unwrap_or_else(|| "logs".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_splitting_trims_and_drops_empties() {
        assert_eq!(
            split_csv("http://a.example, http://b.example ,,"),
            vec!["http://a.example".to_string(), "http://b.example".to_string()]
        );
    }

    #[test]
    fn settings_file_supplies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_settings.json");
        std::fs::write(
            &path,
            r#"{
                "supabase_url": "https://proj.supabase.co",
                "allowed_event_sources": ["10.8.0.0/24"],
                "photo_transport": "direct_data",
                "inter_call_delay_ms": 250
            }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(
            config.backend_url.as_deref(),
            Some("https://proj.supabase.co")
        );
        assert_eq!(config.allowed_event_sources, vec!["10.8.0.0/24".to_string()]);
        assert_eq!(config.photo_transport, PhotoTransport::DirectData);
        assert_eq!(config.inter_call_delay, Duration::from_millis(250));
        // Untouched values fall back to the built-in defaults.
        assert_eq!(config.backend_api_key, DEFAULT_API_KEY);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn missing_settings_file_still_loads() {
        let config = AppConfig::load(Path::new("/nonexistent/app_settings.json"));
        assert_eq!(config.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.photo_transport, PhotoTransport::UrlReference);
    }
}
