//! Layered configuration for the collector daemon.
//!
//! Precedence, lowest to highest: built-in defaults, optional config file,
//! `NDNMAP_*` environment variables, command-line flags (applied by the
//! caller).

use anyhow::{Context, Result};
use ndnmap_collector::{DEFAULT_MAP_SERVER, NDN_UDP_PORT};
use serde::Deserialize;
use std::path::Path;

/// Settings the launcher can take from a file or the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the UDP status face listens on.
    pub listen: String,

    /// Host (and optional port) of the map server notifications go to.
    pub map_server: String,

    /// Seconds before an outstanding notification is abandoned.
    pub request_timeout_secs: u64,

    /// Bound on concurrently outstanding notifications.
    pub max_in_flight: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: format!("0.0.0.0:{}", NDN_UDP_PORT),
            map_server: DEFAULT_MAP_SERVER.to_string(),
            request_timeout_secs: 10,
            max_in_flight: 64,
        }
    }
}

impl Settings {
    /// Load settings, layering an optional file under `NDNMAP_*` environment
    /// overrides.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file));
        }

        builder
            .add_source(config::Environment::with_prefix("NDNMAP"))
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("parsing configuration")
    }
}
