//! Application Configuration
//!
//! User settings stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Overlay rendering settings
    pub render: RenderConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum accepted upload size in megabytes
    pub max_upload_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_mb: 10,
        }
    }
}

/// Overlay rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Width the uploaded image is scaled to before decoding and display
    pub display_width: u32,
    /// Boundary stroke color [R, G, B]
    pub box_color: [u8; 3],
    /// Label text color [R, G, B]
    pub label_color: [u8; 3],
    /// Vertical offset of the label above the boundary, in pixels
    pub label_offset_px: u32,
    /// Label font size in pixels
    pub label_scale: f32,
    /// Explicit label font path; system locations are probed when unset
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            display_width: 400,
            box_color: [0, 128, 0],
            label_color: [255, 0, 0],
            label_offset_px: 10,
            label_scale: 14.0,
            font_path: None,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Platform config directory for this application
pub fn get_config_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "qrlens", "qrlens")
        .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
    let dir = dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
