use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use timetable_server::config::AppConfig;
use timetable_server::source::SourceCache;
use timetable_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let source = SourceCache::new(config.source.clone());

    // Load once up front so a broken sheet shows in the log at startup.
    let warm = source.clone();
    let paths = source.config();
    match tokio::task::spawn_blocking(move || warm.dataset()).await {
        Ok(dataset) => match dataset.error() {
            None => info!(
                schedule = %paths.schedule_path.display(),
                stations = %paths.stations_path.display(),
                "timetable ready"
            ),
            Some(e) => warn!(error = %e, "starting without timetable data"),
        },
        Err(e) => warn!(error = %e, "initial timetable load failed"),
    }

    let state = AppState::new(source, config.lookup);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!("Bus timetable listening on http://{}", config.bind);
    info!("  GET /                   - Search page");
    info!("  GET /health             - Health check");
    info!("  GET /api/lookup         - Timetable lookup (JSON)");
    info!("  GET /api/stops/nearest  - Nearest stops (JSON)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
