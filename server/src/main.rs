use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use wschat_server::config::{generate_config_template, Cli, Config};
use wschat_server::{routes, state, ws};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Handle --generate-config: print template and exit
    if cli.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load(&cli)?;

    // Initialize tracing/logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wschat_server=info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(filter).init();
    }

    tracing::info!("wschat server v{} starting", env!("CARGO_PKG_VERSION"));

    // The registry starts empty and lives until the process exits
    let app_state = state::AppState::new(
        ws::new_connection_registry(),
        config.page.clone(),
        config.static_dir.clone(),
    );

    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        static_dir = %config.static_dir.display(),
        "Listening on {}",
        addr
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM (Ctrl+C on other platforms).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("SIGINT received - initiating graceful shutdown");
            }
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received - initiating graceful shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Ctrl+C received - initiating graceful shutdown");
    }
}
