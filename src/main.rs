//! Application entry point and server initialization
//!
//! Loads configuration, initializes logging and the database, optionally
//! seeds demo contacts and serves the API until a shutdown signal arrives.

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use contact_directory::config::Config;
use contact_directory::database::{init_db, seed_demo_data, AppState};
use contact_directory::logging::init_logging;
use contact_directory::route::create_app;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("logging error: {err}");
            std::process::exit(1);
        }
    };

    let db = init_db(&config.database_url).expect("Failed to initialize database");
    let state = AppState::new(db);

    if config.seed_demo_data {
        if let Err(err) = seed_demo_data(state.service.store()) {
            tracing::error!(error = %err, "failed to seed demo contacts");
        }
    }

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|err| panic!("Failed to bind {addr}: {err}"));

    tracing::info!("Server running at http://localhost:{}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    if let Some(dir) = &config.log_dir {
        tracing::info!("Writing daily logs to {}", dir.display());
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
