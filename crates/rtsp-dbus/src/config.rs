//! Client configuration file.
//!
//! ```toml
//! bus = "system"
//! # address = "unix:path=/run/dbus/system_bus_socket"
//!
//! [rtsp]
//! path = "stream"
//! port = 8554
//!
//! [hls]
//! port = 8080
//!
//! [upstream]
//! host = "mediator.example.com"
//! aport = 5000
//! vport = 5001
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dbus::{BusKind, DbusConnector};

/// Directory name under the user's config dir.
pub const APP_DIR: &str = "dream-rtsp-ctl";

/// Config file name.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Bus the server is registered on.
    pub bus: BusKind,
    /// Explicit bus address; overrides `bus` when set.
    pub address: Option<String>,
    pub rtsp: RtspDefaults,
    pub hls: HlsDefaults,
    pub upstream: UpstreamDefaults,
}

/// Default `enableRTSP` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtspDefaults {
    pub path: String,
    pub port: i32,
    pub user: String,
    pub password: String,
}

/// Default `enableHLS` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsDefaults {
    pub port: i32,
    pub user: String,
    pub password: String,
}

/// Default `enableUpstream` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamDefaults {
    pub host: String,
    pub aport: i32,
    pub vport: i32,
}

impl ClientConfig {
    /// `$XDG_CONFIG_HOME/dream-rtsp-ctl/config.toml`, if a config dir exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`. A missing file yields the defaults; a malformed one is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            tracing::debug!("No config directory, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Build the connector this config describes.
    #[must_use]
    pub fn connector(&self) -> DbusConnector {
        let connector = DbusConnector::new(self.bus);
        match &self.address {
            Some(address) => connector.with_address(address.clone()),
            None => connector,
        }
    }
}
