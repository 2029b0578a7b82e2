use std::sync::Arc;

use axum::Server;
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use axum_todo_auth::{config::Config, create_router, store::Store, AppState};

// Entry point of the application
#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "axum_todo_auth=debug,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("🔥 Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    if config.uses_dev_jwt_secret() {
        warn!("JWT_SECRET_KEY is not set, signing tokens with the development key");
    }
    if config.uses_dev_app_secret() {
        warn!("SECRET_KEY is not set, using the development application secret");
    }

    // Connect to the database
    let store = match Store::connect(&config.database_url, config.database_max_connections).await
    {
        Ok(store) => {
            info!("✅ Connection to the database is successful!");
            store
        }
        Err(err) => {
            error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    // Create the tables if they don't exist
    if let Err(err) = store.init_schema().await {
        error!("🔥 Failed to create the schema: {:?}", err);
        std::process::exit(1);
    }

    let app_state = Arc::new(AppState::new(store.clone(), &config));
    let app = create_router(app_state, config.cors_origin.clone());

    info!("🚀 Server started successfully on {}", config.bind_addr);

    let result = Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;

    if let Err(err) = result {
        error!("🔥 Server error: {}", err);
        std::process::exit(1);
    }
    info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {}", err);
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

    info!("Shutdown signal received");
}
