//! Configuration file and environment loading.
//!
//! # Configuration File Format
//!
//! ```toml
//! [endpoint]
//! url = "http://nyx.vima.ekt.gr:3000/api/books"
//! timeout_seconds = 10
//! connect_timeout_seconds = 5
//!
//! [cache]
//! enabled = true
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 250
//! max_delay_ms = 2000
//! backoff_multiplier = 2.0
//!
//! [pagination]
//! page_size = 20
//! page_range = 5
//! ```
//!
//! Every key can be overridden from the environment with the `BOOKSHELF_`
//! prefix and `__` between section and key, e.g.
//! `BOOKSHELF_ENDPOINT__URL=http://localhost:3000/api/books`.

use std::path::{Path, PathBuf};

use super::Config;

const ENV_PREFIX: &str = "BOOKSHELF";
const LOCAL_CONFIG_FILE: &str = "bookshelf.toml";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Load configuration from an optional TOML file, then environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        tracing::debug!("Loading config file: {}", path.display());
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Locate a configuration file.
///
/// Checks `./bookshelf.toml` first, then `<config dir>/bookshelf/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("bookshelf").join("config.toml"))
        .filter(|path| path.is_file())
}
