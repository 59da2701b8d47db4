//! Application settings.
//!
//! Settings are layered:
//! 1. **Built-ins**: the application's current settings, which start from the
//!    `Default` values below (`debug: true`).
//! 2. **File**: an optional TOML/YAML/JSON file, e.g. `--config app.yml`.
//! 3. **Environment**: variables prefixed with `YHTTP__`; nested keys use a
//!    double underscore (`YHTTP__SERVER__BIND=0.0.0.0:80` maps to `server.bind`).

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Error;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Append status-signal details to error bodies.
    pub debug: bool,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    pub server: ServerSettings,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_filter: "info".to_owned(),
            server: ServerSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: "127.0.0.1:8080".to_owned() }
    }
}

impl Settings {
    /// Loads the defaults, then `path` (if any), then the environment.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not exist, cannot be parsed, or a value has the
    /// wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        Self::default().layer(path)
    }

    /// Like [`load`](Settings::load), but starts from `self` instead of the
    /// defaults: keys missing from the file and environment keep their
    /// current value.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Settings::load).
    pub fn layer(&self, path: Option<&Path>) -> Result<Self, Error> {
        let mut builder = Config::builder().add_source(Config::try_from(self)?);
        if let Some(path) = path {
            info!(path = %path.display(), "loading settings");
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("YHTTP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
