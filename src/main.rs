use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::WonderlandConfig;

mod camera;
mod config;
mod demo;
mod engine;
mod input;
mod light;
mod math;
mod model;
mod rendering;
mod scene;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(WonderlandConfig::default_path);
    let config = WonderlandConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    pollster::block_on(window::run(config))?;

    Ok(())
}
