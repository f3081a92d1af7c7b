//! Application settings loading from config.toml and the environment.
//!
//! The config file is optional; every setting has a default and the
//! `DATABASE_URL` / `BIND_ADDRESS` environment variables override whatever
//! the file says, which keeps deployments configurable without editing files.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/schedule_buddy.sqlite?mode=rwc";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Raw shape of the optional config.toml file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerSection>,
    database: Option<DatabaseSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    bind_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
    url: Option<String>,
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// SeaORM database URL
    pub database_url: String,
}

/// Loads configuration from the given path, tolerating a missing file.
///
/// # Errors
/// Returns an error only when the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let file = if path.as_ref().exists() {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
            message: format!("failed to read config file: {e}"),
        })?;
        toml::from_str::<FileConfig>(&contents).map_err(|e| Error::Config {
            message: format!("failed to parse config.toml: {e}"),
        })?
    } else {
        FileConfig::default()
    };

    let bind_address = std::env::var("BIND_ADDRESS").ok().unwrap_or_else(|| {
        file.server
            .and_then(|s| s.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
    });
    let database_url = std::env::var("DATABASE_URL").ok().unwrap_or_else(|| {
        file.database
            .and_then(|d| d.url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    });

    Ok(AppConfig {
        bind_address,
        database_url,
    })
}

/// Loads configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}
