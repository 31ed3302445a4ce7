//! DTAG - orchestrator and reference services
//!
//! Usage: `dtag <orchestrator|world|visualise|player> [config-file]`
//!
//! The config file defaults to `<role>.json` in the working directory.

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dtag::app::AppState;
use dtag::config::{
    log_level_from_env, ConfigError, OrchestratorConfig, Role, ServiceConfig, ServiceKind,
};
use dtag::http::build_router;
use dtag::orchestrator::{HttpTransport, Orchestrator};
use dtag::util::time::{init_process_time, uptime_secs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing(&log_level_from_env());

    init_process_time();

    let mut args = std::env::args().skip(1);
    let role: Role = args.next().ok_or(ConfigError::MissingRole)?.parse()?;
    let config_file = args
        .next()
        .unwrap_or_else(|| role.default_config_file().to_string());

    match role {
        Role::Orchestrator => run_orchestrator(&config_file).await?,
        Role::Service(kind) => run_service(kind, &config_file).await?,
    }

    info!(uptime_secs = uptime_secs(), "Game Over");
    Ok(())
}

/// Drive ticks until the tick limit, a fatal exchange error or a shutdown signal
async fn run_orchestrator(config_file: &str) -> anyhow::Result<()> {
    let config = OrchestratorConfig::load(config_file)?;
    let mut orchestrator = Orchestrator::new(&config, HttpTransport::new())?;

    info!(
        config = config_file,
        timestep = config.timestep,
        "DTAG Orchestrator running"
    );

    tokio::select! {
        result = orchestrator.run(config.max_ticks) => {
            if let Err(e) = &result {
                error!(error = %e, "Tick failed");
            }
            result?;
        }
        _ = shutdown_signal() => {}
    }

    Ok(())
}

/// Serve one of the peripheral services
async fn run_service(kind: ServiceKind, config_file: &str) -> anyhow::Result<()> {
    let state = AppState::new(kind, ServiceConfig::load(config_file)?);
    let (host, port) = (state.config.host.clone(), state.config.port);
    let update_path = state.service.update_path();
    let router = build_router(state);

    let listener = TcpListener::bind((host.as_str(), port)).await?;

    info!(service = %kind, "DTAG Server: http://{}:{}", host, port);
    info!("Update endpoint: http://{}:{}{}", host, port, update_path);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
