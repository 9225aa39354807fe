//! Server configuration, read from a TOML file.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration. A file that exists but does not parse is a startup error.

use basalt_common::{BasaltError, Result};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "basalt.toml";

/// Largest favicon the client accepts once base64 encoded.
pub const MAX_FAVICON_BYTES: usize = 49_151;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub motd: String,
    pub max_players: u32,
    /// Frames at least this large are compressed. Negative disables compression.
    pub compression_threshold: i32,
    pub encryption: bool,
    pub view_distance: u8,
    pub simulation_distance: u8,
    /// PNG shown in the server list, 64x64.
    pub favicon: Option<PathBuf>,
    pub keep_alive_interval_secs: u64,
    pub keep_alive_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub disconnect_grace_millis: u64,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_owned(),
            port: 25565,
            motd: "A Basalt server".to_owned(),
            max_players: 20,
            compression_threshold: 256,
            encryption: true,
            view_distance: 4,
            simulation_distance: 4,
            favicon: None,
            keep_alive_interval_secs: 15,
            keep_alive_timeout_secs: 30,
            read_timeout_secs: 30,
            disconnect_grace_millis: 1000,
            log_level: "info".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Loads `path`, falling back to defaults when it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BasaltError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| BasaltError::Config(format!("failed to parse TOML: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(BasaltError::Config("port must not be 0".to_owned()));
        }
        if !(2..=32).contains(&self.view_distance) {
            return Err(BasaltError::Config(format!(
                "view_distance {} is outside 2..=32",
                self.view_distance
            )));
        }
        if self.keep_alive_timeout_secs <= self.keep_alive_interval_secs {
            return Err(BasaltError::Config(format!(
                "keep_alive_timeout_secs ({}) must exceed keep_alive_interval_secs ({})",
                self.keep_alive_timeout_secs, self.keep_alive_interval_secs
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// `None` when compression is disabled.
    pub fn compression(&self) -> Option<usize> {
        usize::try_from(self.compression_threshold).ok()
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs)
    }

    pub fn keep_alive_timeout(&self) -> Duration {
        Duration::from_secs(self.keep_alive_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn disconnect_grace(&self) -> Duration {
        Duration::from_millis(self.disconnect_grace_millis)
    }

    /// The favicon as a data URI. Unreadable or oversized files are skipped
    /// with a warning.
    pub fn load_favicon(&self) -> Option<String> {
        let path = self.favicon.as_ref()?;
        match std::fs::read(path) {
            Ok(bytes) => {
                let favicon = encode_favicon(&bytes);
                if favicon.is_none() {
                    warn!(
                        "Favicon {} is {} bytes, the limit is {}",
                        path.display(),
                        bytes.len(),
                        MAX_FAVICON_BYTES
                    );
                }
                favicon
            }
            Err(e) => {
                warn!("Failed to read favicon {}: {}", path.display(), e);
                None
            }
        }
    }
}

pub fn encode_favicon(png: &[u8]) -> Option<String> {
    if png.len() > MAX_FAVICON_BYTES {
        return None;
    }
    Some(format!("data:image/png;base64,{}", base64::encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_file_is_default() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:25565");
        assert_eq!(config.compression(), Some(256));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            port = 25570
            motd = "hello"
            compression_threshold = -1
            encryption = false
            favicon = "icon.png"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 25570);
        assert_eq!(config.motd, "hello");
        assert_eq!(config.compression(), None);
        assert!(!config.encryption);
        assert_eq!(config.favicon, Some(PathBuf::from("icon.png")));
        assert_eq!(config.max_players, 20);
        assert_eq!(config.keep_alive_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        assert_matches!(
            ServerConfig::from_toml("port = \"many\""),
            Err(BasaltError::Config(_))
        );
        assert_matches!(ServerConfig::from_toml("port ="), Err(BasaltError::Config(_)));
    }

    #[test]
    fn test_validate() {
        let mut config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert_matches!(config.validate(), Err(BasaltError::Config(_)));

        config.port = 25565;
        config.view_distance = 1;
        assert_matches!(config.validate(), Err(BasaltError::Config(_)));
        config.view_distance = 33;
        assert_matches!(config.validate(), Err(BasaltError::Config(_)));

        config.view_distance = 10;
        config.keep_alive_timeout_secs = config.keep_alive_interval_secs;
        assert_matches!(config.validate(), Err(BasaltError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = ServerConfig::load("does/not/exist/basalt.toml").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_encode_favicon() {
        assert_eq!(
            encode_favicon(b"png").unwrap(),
            "data:image/png;base64,cG5n"
        );
        assert!(encode_favicon(&vec![0u8; MAX_FAVICON_BYTES + 1]).is_none());
    }
}
