use anyhow::Context;
use eframe::egui;
use std::sync::Arc;

use audioconvert::client::BackendClient;
use audioconvert::config::AppConfig;
use audioconvert::logging::init_logging;
use audioconvert::orchestrator::Orchestrator;

mod app;
mod localizations;
mod theme;
mod ui;

use app::AudioConvertApp;

fn main() -> anyhow::Result<()> {
    init_logging("audioconvert");

    let config = AppConfig::from_env().context("Invalid backend configuration")?;
    log::info!("Using conversion backend at {}", config.backend.base_url());

    let client = BackendClient::new(config.backend.clone()).context("Could not build the HTTP client")?;
    let orchestrator = Orchestrator::new(Arc::new(client), &config);

    // Set default download directory to user's downloads folder
    let default_download_dir = dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 760.0])
            .with_min_inner_size([600.0, 560.0])
            .with_title("AudioConvert"),
        ..Default::default()
    };

    let app = AudioConvertApp::new(orchestrator, default_download_dir);

    eframe::run_native(
        "AudioConvert",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Box::new(app)
        }),
    )
    .map_err(|err| anyhow::anyhow!("Window error: {err}"))?;

    log::info!("AudioConvert closed");
    Ok(())
}
