use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vehicle_registry::config::{DatabaseConfig, EnvironmentConfig};
use vehicle_registry::database;
use vehicle_registry::repositories::{LookupRepository, UserRepository, VehicleRepository};
use vehicle_registry::routes::create_app;
use vehicle_registry::state::AppState;
use vehicle_registry::storage::LocalBlobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let default_filter = if config.is_development() {
        "vehicle_registry=debug,tower_http=debug"
    } else {
        "vehicle_registry=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!("🚗 Vehicle Registry API ({})", config.environment);
    info!("================================================");

    // Inicializar base de datos
    let pool = match database::connect(&DatabaseConfig::new(config.database_url.clone())).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };

    // Gateways
    let blobs = Arc::new(LocalBlobStore::new(&config.blob_storage_path));
    info!("📦 Blobs en {}", config.blob_storage_path);

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(
        config,
        Arc::new(VehicleRepository::new(pool.clone())),
        Arc::new(LookupRepository::new(pool.clone())),
        Arc::new(UserRepository::new(pool)),
        blobs,
    );
    let app = create_app(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health");
    info!("   GET    /api/vehicles");
    info!("   GET    /api/vehicles/:id");
    info!("   POST   /api/vehicles");
    info!("   PUT    /api/vehicles/:id");
    info!("   DELETE /api/vehicles/:id");
    info!("   GET    /api/brands");
    info!("   GET    /api/vehicle-types");
    info!("   GET    /api/document-types");
    info!("   GET    /api/procedures");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
