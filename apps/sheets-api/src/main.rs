use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheets_api::config::{self, Config};
use sheets_api::AppState;

#[tokio::main]
async fn main() {
    config::load_env_files();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let sheets = match sheets_api::sheets::connect(&config) {
        Ok(sheets) => sheets,
        Err(err) => {
            tracing::error!(error = %err.message(), "spreadsheet backend unavailable");
            std::process::exit(1);
        }
    };

    tracing::info!(
        environment = config.environment.as_str(),
        sheet_types = ?config.sheet_types,
        default_action = config.default_action.as_str(),
        require_api_key = config.policy.require_api_key,
        require_referer_match = config.policy.require_referer_match,
        "sheets-api configured"
    );

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        sheets,
    };
    let app = sheets_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "sheets-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
