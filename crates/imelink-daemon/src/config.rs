//! TOML-based configuration for the daemon.
//!
//! Reads and writes `DaemonConfig` at the platform-appropriate location:
//! - Windows:  `%APPDATA%\IMELink\config.toml`
//! - Linux:    `~/.config/imelink/config.toml`
//! - macOS:    `~/Library/Application Support/IMELink/config.toml`
//!
//! The `IMELINK_CONFIG` environment variable overrides the path, which is
//! how tests point the daemon at a scratch file. On first run the default
//! config is written out so users have something to edit.

use std::path::PathBuf;

use imelink_session::SessionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub daemon: GeneralConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// General daemon behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// Overridden at runtime by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Optional `host:port` of the paired device to dial at startup. When
    /// absent the daemon only listens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            peer: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if neither `IMELINK_CONFIG`
/// nor a platform base directory is available.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os("IMELINK_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `DaemonConfig` from disk, returning `DaemonConfig::default()` if
/// the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<DaemonConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: DaemonConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DaemonConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk, creating the config directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &DaemonConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Loads the config, writing the defaults out first if no file exists yet.
///
/// # Errors
///
/// Propagates [`ConfigError`] from the load or the initial save.
pub fn load_or_init() -> Result<DaemonConfig, ConfigError> {
    let path = config_file_path()?;
    if !path.exists() {
        save_config(&DaemonConfig::default())?;
    }
    load_config()
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("IMELink"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("imelink"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("IMELink")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let cfg = DaemonConfig::default();
        assert_eq!(cfg.daemon.log_level, "info");
        assert_eq!(cfg.daemon.peer, None);
        assert_eq!(cfg.session.listen_port, 10000);
        assert_eq!(cfg.session.dial_timeout_ms, 10_000);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut cfg = DaemonConfig::default();
        cfg.daemon.log_level = "debug".to_string();
        cfg.daemon.peer = Some("192.168.1.20:10000".to_string());
        cfg.session.listen_port = 12000;

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: DaemonConfig = toml::from_str(&text).expect("deserialize");
        assert_eq!(restored, cfg);
    }

    #[test]
    fn test_absent_peer_is_omitted_from_toml() {
        let cfg = DaemonConfig::default();
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        assert!(!text.contains("peer"), "None peer must be omitted: {text}");
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let cfg: DaemonConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, DaemonConfig::default());

        let cfg: DaemonConfig = toml::from_str("[daemon]\n[session]\n").expect("deserialize");
        assert_eq!(cfg, DaemonConfig::default());
    }

    #[test]
    fn test_partial_session_table_keeps_other_defaults() {
        let cfg: DaemonConfig =
            toml::from_str("[session]\nlisten_port = 9999\n").expect("deserialize");
        assert_eq!(cfg.session.listen_port, 9999);
        assert_eq!(cfg.session.dial_timeout_ms, 10_000);
        assert_eq!(cfg.daemon.log_level, "info");
    }

    #[test]
    fn test_invalid_toml_reports_parse_error() {
        let result: Result<DaemonConfig, toml::de::Error> = toml::from_str("[[[ not toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_round_trip_via_temp_file() {
        let dir = std::env::temp_dir().join(format!("imelink_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut cfg = DaemonConfig::default();
        cfg.session.listen_port = 12345;
        cfg.daemon.log_level = "trace".to_string();

        // Write and read back through the same serializer the repository uses.
        let content = toml::to_string_pretty(&cfg).unwrap();
        std::fs::write(&path, &content).unwrap();
        let loaded: DaemonConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded, cfg);
        std::fs::remove_dir_all(&dir).ok();
    }
}
