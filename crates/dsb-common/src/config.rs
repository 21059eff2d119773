//! ---
//! dsb_section: "01-core-functionality"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Shared primitives and utilities for the bridge runtime."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_root_service_name() -> String {
    "com.contoso".to_owned()
}

fn default_bridge_device_name() -> String {
    "device".to_owned()
}

/// Primary configuration object for a bridge instance.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Logging output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Transport security pass-through settings.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Bus service naming settings.
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Logging output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving the rolling daily log file.
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    /// Log file prefix; defaults to the service name when unset.
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Stdout log format.
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            file_prefix: None,
            format: default_log_format(),
        }
    }
}

/// Transport security settings.
///
/// The bridge core treats `secure_access_required` as an opaque flag and
/// forwards it to the interface-creation boundary call; enforcement lives in
/// the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    /// Whether synthesized interfaces must be created through the secured
    /// boundary call.
    #[serde(default)]
    pub secure_access_required: bool,
}

/// Bus service naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Root prefix for service and interface names.
    #[serde(default = "default_root_service_name")]
    pub root_service_name: String,
    /// Path segment under which device objects are exposed.
    #[serde(default = "default_bridge_device_name")]
    pub bridge_device_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root_service_name: default_root_service_name(),
            bridge_device_name: default_bridge_device_name(),
        }
    }
}

impl BridgeConfig {
    /// Environment variable overriding the configuration file path.
    pub const ENV_CONFIG_PATH: &'static str = "DSB_CONFIG";

    /// Load configuration from disk, respecting the `DSB_CONFIG` override.
    ///
    /// The first existing candidate wins; when nothing exists the defaults
    /// are returned.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            let path = PathBuf::from(&env_path);
            if !path.exists() {
                return Err(anyhow!(
                    "configuration file from {} not found: {}",
                    Self::ENV_CONFIG_PATH,
                    path.display()
                ));
            }
            return Self::load_file(&path);
        }
        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                return Self::load_file(path);
            }
        }
        debug!("no configuration file found; using defaults");
        Ok(Self::default())
    }

    /// Parse a single TOML configuration file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing configuration file {}", path.display()))?;
        debug!(source = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = BridgeConfig::default();
        assert!(!config.security.secure_access_required);
        assert_eq!(config.service.root_service_name, "com.contoso");
        assert_eq!(config.service.bridge_device_name, "device");
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bridge.toml");
        fs::write(
            &path,
            r#"
[security]
secure_access_required = true

[service]
root_service_name = "com.example"
"#,
        )
        .expect("write config");

        let config = BridgeConfig::load_file(&path).expect("load");
        assert!(config.security.secure_access_required);
        assert_eq!(config.service.root_service_name, "com.example");
        // untouched sections keep defaults
        assert_eq!(config.service.bridge_device_name, "device");
        assert_eq!(config.logging.directory, PathBuf::from("target/logs"));
    }

    #[test]
    fn missing_candidates_fall_back_to_defaults() {
        let config =
            BridgeConfig::load(&["/definitely/not/here.toml"]).expect("defaults on missing file");
        assert_eq!(config.service.root_service_name, "com.contoso");
    }
}
