use igreja_api::{
    AppState,
    config::{AppConfig, Env, StorageConfig},
    create_router, ensure_bootstrap_admin,
    repository::{PostgresRepository, RepositoryState},
    storage::{LocalDiskStorage, S3StorageClient, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Boots configuration, logging, the database pool (with migrations), the
/// upload backend and the HTTP server, then closes the pool after a graceful
/// shutdown.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise debug for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "igreja_api=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to apply database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool.clone())) as RepositoryState;

    if let Some(admin) = &config.bootstrap_admin {
        if let Err(e) = ensure_bootstrap_admin(&repo, admin).await {
            tracing::error!("Failed to create bootstrap admin: {}", e);
        }
    }

    // 4. Upload storage
    let storage: StorageState = match &config.storage {
        StorageConfig::Local { upload_dir } => {
            Arc::new(LocalDiskStorage::new(upload_dir.clone(), &config.public_url)) as StorageState
        }
        StorageConfig::S3 {
            endpoint,
            region,
            access_key,
            secret_key,
            bucket,
        } => Arc::new(S3StorageClient::new(endpoint, region, access_key, secret_key, bucket).await)
            as StorageState,
    };
    storage.ensure_bucket_exists().await;

    // 5. State, router, server
    let port = config.port;
    let app = create_router(AppState {
        repo,
        storage,
        config,
    });

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener.");

    tracing::info!("Listening on {}", addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{}/swagger-ui", port);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
