use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use bridge::config::AppConfig;
use bridge::router;
use bridge::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bridge=debug")),
        )
        .init();

    let config = AppConfig::load(Path::new("config/app_settings.json"));

    if let Err(err) = std::fs::create_dir_all(&config.faces_dir) {
        eprintln!("Cannot create faces directory: {err}");
        std::process::exit(1);
    }

    tracing::info!(
        listen_addr = %config.listen_addr,
        backend_configured = config.backend_url.is_some(),
        event_sources = config.allowed_event_sources.len(),
        photo_transport = ?config.photo_transport,
        "starting pontaj bridge"
    );

    if config.allowed_event_sources.is_empty() {
        tracing::warn!("no event source allow-list configured; webhook accepts any source IP");
    }

    let app_state = AppState::new(config.clone()).unwrap_or_else(|e| {
        eprintln!("Startup error: {e}");
        std::process::exit(1);
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Cannot bind {}: {e}", config.listen_addr);
            std::process::exit(1);
        });

    tracing::info!(addr = %config.listen_addr, "pontaj bridge listening");

    axum::serve(
        listener,
        router(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap_or_else(|e| {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    });
}
