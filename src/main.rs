use coin_shop::{
    api::{AppState, create_router},
    auth::{AuthService, JwtService},
    config::{catalog::load_catalog_or_builtin, database, settings::Settings},
    core::catalog::{CatalogCache, seed_catalog},
    errors::Result,
};
use dotenvy::dotenv;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    if settings.jwt_secret.is_generated() {
        warn!("JWT_SECRET not set, using a random secret. Tokens will not survive a restart.");
    }

    // 4. Connect and create tables
    let db = database::connect(&settings.database)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog and warm the cache
    let catalog_config = load_catalog_or_builtin(&settings.catalog_path)?;
    seed_catalog(&db, &catalog_config.items)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    let catalog = CatalogCache::default();
    catalog.refresh(&db).await?;
    info!("Catalog ready with {} items.", catalog.len().await);

    // 6. Serve
    let jwt = Arc::new(JwtService::new(&settings.jwt_secret));
    let auth = AuthService::new(
        db.clone(),
        jwt,
        settings.bcrypt_cost,
        settings.starting_balance,
    );
    let app = create_router(AppState::new(db.clone(), auth, catalog));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database connections.");
    db.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received.");
}
