//! QRLens - QR code scanning web utility
//!
//! Upload an image, get it back with every detected QR code boxed and
//! labeled, alongside the decoded text. Detection and decoding are
//! delegated to the `rqrr` crate.

mod config;
mod error;
mod server;
mod vision;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::server::AppState;
use crate::vision::ScanPipeline;

/// QRLens - QR code scanning web utility
#[derive(Parser, Debug)]
#[command(name = "qrlens")]
#[command(about = "Upload an image, get its QR codes boxed, labeled and decoded")]
struct Args {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Display width the uploaded image is scaled to (overrides config)
    #[arg(long)]
    display_width: Option<u32>,

    /// List the probed label-font locations and exit
    #[arg(long)]
    check_fonts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    // Font check mode
    if args.check_fonts {
        println!("Probed label font locations:");
        for path in vision::annotate::font_search_paths() {
            let found = if path.exists() { "found" } else { "missing" };
            println!("  [{}] {}", found, path.display());
        }
        return Ok(());
    }

    info!("QRLens starting...");

    let mut config = load_or_create_config(args.config.as_deref());
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(width) = args.display_width {
        config.render.display_width = width;
    }

    let state = Arc::new(AppState {
        pipeline: ScanPipeline::new(&config.render),
    });
    let app = server::router(state, config.server.max_upload_mb);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    info!("QRLens shutdown complete");

    Ok(())
}

/// Load configuration from the given path, the platform config dir, or fall
/// back to defaults.
fn load_or_create_config(explicit: Option<&std::path::Path>) -> AppConfig {
    if let Some(path) = explicit {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => {
                tracing::warn!("Could not load {:?}: {}; using defaults", path, e);
                return AppConfig::default();
            }
        }
    }

    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
