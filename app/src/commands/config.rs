//! Configuration commands.

use crate::commands::daemon::{connect_faces, trigger_mode};
use anyhow::bail;
use facebot_core::AppConfig;
use std::path::{Path, PathBuf};

/// Check the configuration and print the resolved trigger mode.
///
/// With `check`, the face service must also answer its health endpoint.
pub async fn validate(config: &AppConfig, check: bool) -> anyhow::Result<()> {
    config.validate()?;
    let mode = trigger_mode(config)?;
    if check {
        connect_faces(config).await?;
    }

    println!("Configuration OK");
    println!("  store:        {}", config.store.path.display());
    println!("  gateway:      {}", config.api.base_url);
    println!("  face service: {}", config.faces.service_url);
    println!("  trigger:      {mode}");
    println!("  upload:       {}", config.publisher.upload);
    if check {
        println!("  face service reachable");
    }
    Ok(())
}

/// Write the default configuration to `path`, or to the XDG config path.
///
/// An existing file is only replaced with `force`.
pub fn init(path: Option<&Path>, force: bool) -> anyhow::Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::config_path()?,
    };
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    AppConfig::default().save(&path)?;
    Ok(path)
}
