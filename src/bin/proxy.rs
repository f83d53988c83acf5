use anyhow::Context;
use tokio::signal;

use audioconvert::config::ProxyConfig;
use audioconvert::logging::init_logging;
use audioconvert::proxy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("audioconvert-proxy");

    let config = ProxyConfig::from_env().context("Invalid backend configuration")?;
    let app = proxy::router(&config).context("Could not build the HTTP client")?;

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Could not listen on {}", config.listen))?;
    log::info!(
        "Forwarding http://{} to {}",
        config.listen,
        config.backend.base_url()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Proxy server failed")?;

    log::info!("Proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
