// config lets you read a separate config file
use config::{Config, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::construct::PersistenceMode;
use crate::error::{HbnbError, Result};

/// Name of the optional settings file, looked up in the working directory
/// with any extension the `config` crate understands (`hbnb.toml`, ...).
pub const SETTINGS_FILE: &str = "hbnb";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// One of `json`, `sqlite` or `memory`.
    pub persistence: String,
    pub file_path: PathBuf,
    pub sqlite_path: PathBuf,
    /// Used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Settings {
    pub fn load(name: &str) -> Result<Settings> {
        let settings = Config::builder()
            .set_default("persistence", "json")?
            .set_default("file_path", "file.json")?
            .set_default("sqlite_path", "hbnb.db")?
            .set_default("log_filter", "warn")?
            .add_source(File::with_name(name).required(false))
            .build()?;
        Ok(settings.try_deserialize::<Settings>()?)
    }
    pub fn persistence_mode(&self) -> Result<PersistenceMode> {
        match self.persistence.to_lowercase().as_str() {
            "json" | "file" => Ok(PersistenceMode::Json(self.file_path.clone())),
            "sqlite" => Ok(PersistenceMode::Sqlite(self.sqlite_path.clone())),
            "memory" => Ok(PersistenceMode::InMemory),
            other => Err(HbnbError::Config(format!(
                "unknown persistence '{}', expected json, sqlite or memory",
                other
            ))),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            persistence: String::from("json"),
            file_path: PathBuf::from("file.json"),
            sqlite_path: PathBuf::from("hbnb.db"),
            log_filter: String::from("warn"),
        }
    }
}
