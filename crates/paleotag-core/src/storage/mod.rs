mod config;

pub use config::{ArchiveConfig, Config, DisplayConfig, FitConfig, ResampleConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the configuration directory.
///
/// `PALEOTAG_CONFIG_DIR` wins when set. Otherwise `~/.config/paleotag[-dev]/`
/// based on `PALEOTAG_ENV` (set `PALEOTAG_ENV=dev` for a development copy).
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("PALEOTAG_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("PALEOTAG_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("paleotag-dev")
            } else {
                base_dir.join("paleotag")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
