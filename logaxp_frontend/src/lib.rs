pub mod api;
pub mod app;
pub mod cache;
pub mod comments;
pub mod config;
pub mod editor;
pub mod feed;
pub mod forms;
pub mod models;
pub mod render;
pub mod sanitize;
pub mod share;
pub mod sync;

#[cfg(test)]
mod fake_api;

use std::sync::Arc;

use eframe::{self, egui};

pub use api::{ApiClient, ApiError, BlogApi};
pub use app::BlogApp;
pub use config::FrontendConfig;

/// Launches the egui application against `config` with default window
/// options.
pub fn run_frontend(config: FrontendConfig) -> anyhow::Result<()> {
    run_frontend_with_options(config, default_native_options())
}

/// Launches the egui app with caller-provided options.
pub fn run_frontend_with_options(
    config: FrontendConfig,
    options: eframe::NativeOptions,
) -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(false).try_init();
    let api: Arc<dyn BlogApi> = Arc::new(ApiClient::from_config(&config)?);
    log::info!(
        "starting frontend against {} (tenant {})",
        config.api_url,
        config.tenant
    );
    eframe::run_native(
        "LogaXP Blog",
        options,
        Box::new(move |cc| Ok(Box::new(BlogApp::new(cc, config, api)))),
    )
    .map_err(|err| anyhow::anyhow!("frontend exited with an error: {err}"))
}

fn default_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    }
}
