mod config;
pub mod database;
mod store;

pub use config::{AnnounceConfig, Config, SessionConfig};
pub use database::Database;
pub use store::{Store, KEY_LOGS, KEY_PRESETS, KEY_REPEAT, KEY_STEPS};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/steptimer[-dev]/` based on STEPTIMER_ENV.
///
/// Set STEPTIMER_ENV=dev to use the development data directory, or
/// STEPTIMER_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("STEPTIMER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STEPTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("steptimer-dev")
            } else {
                base_dir.join("steptimer")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
