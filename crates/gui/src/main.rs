mod app;
mod ui;
mod viewport;

use std::path::PathBuf;
use std::sync::Arc;

use app::DemoApp;
use clap::Parser;
use scenecraft_gui_lib::state::{AppSettings, DemoState};
use shared::{Studio, StudioConfig};

#[derive(Debug, Parser)]
#[command(about = "Interactive background removal, blending and TripoSR demo")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenecraft_gui=info,scenecraft_gui_lib=info,shared=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match StudioConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.ensure_dirs() {
        tracing::error!("Failed to create working folders: {e}");
        std::process::exit(1);
    }

    let state = DemoState::new(Arc::new(Studio::from_config(config)), AppSettings::load());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SceneCraft: 2D Blending + TripoSR 3D")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "scenecraft-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(DemoApp::new(cc, state)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}
