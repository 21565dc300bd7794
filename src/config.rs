use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::adb::error::{AdbError, AdbResult};

pub const DEFAULT_DESTINATION: &str = "/sdcard/Download";
pub const DEFAULT_PORT: u16 = 5555;

/// Startup configuration, read once from a TOML key-value file and passed
/// explicitly to whoever needs it. Edits to the file mid-run are not
/// observed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default remote destination directory.
    pub destination: String,
    /// Default device address; pushes fail fast without an address from
    /// here or from `--device`.
    pub address: Option<String>,
    /// Default wifi debugging port.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION.to_string(),
            address: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration. An explicit `path` must exist and parse; with no
    /// explicit path, a missing per-user file just yields the defaults.
    pub fn load(path: Option<&Path>) -> AdbResult<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| AdbError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| AdbError::ConfigParse { path, source })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// `~/.config/adb-wifi-push/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        homedir::my_home()
            .ok()
            .flatten()
            .map(|home| home.join(".config").join("adb-wifi-push").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_file() {
        let config = Config::parse(
            "destination = \"/sdcard/Music\"\naddress = \"192.168.1.20\"\nport = 5556\n",
        )
        .unwrap();
        assert_eq!(config.destination, "/sdcard/Music");
        assert_eq!(config.address.as_deref(), Some("192.168.1.20"));
        assert_eq!(config.port, 5556);
    }

    #[test]
    fn parse_partial_file_keeps_defaults() {
        let config = Config::parse("address = \"oneplus6\"\n").unwrap();
        assert_eq!(config.destination, DEFAULT_DESTINATION);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.address.as_deref(), Some("oneplus6"));
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert!(Config::parse("destinaton = \"/sdcard\"\n").is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, AdbError::ConfigRead { .. }));
    }

    #[test]
    fn load_roundtrip_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "adb-wifi-push-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "port = 4242\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.port, 4242);
        assert_eq!(config.destination, DEFAULT_DESTINATION);
        let _ = std::fs::remove_file(&path);
    }
}
