// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Callchain Configuration
//!
//! This crate provides configuration management for the debug printer.
//! It handles loading, saving, and defaulting configuration files that specify:
//! - Printer defaults (separator, maximum call-chain depth, output stream,
//!   terminator and flushing)
//! - Logging configuration for binaries built on the printer
//!
//! Configuration is stored in TOML format. Nothing here is read implicitly:
//! the printer only sees a configuration when one is loaded and handed to it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default separator between the location tag, call-chain entries and values.
pub const DEFAULT_SEPARATOR: &str = ": ";

/// Default text written after each record.
pub const DEFAULT_TERMINATOR: &str = "\n";

/// Errors raised by [`Config`] file handling
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Printer config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid printer TOML
    #[error("Invalid printer config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be rendered as TOML
    #[error("Could not render printer config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// An explicitly requested file does not exist
    #[error("No printer config at {0}")]
    NotFound(PathBuf),
    /// The platform reports no user configuration directory
    #[error("No user configuration directory on this platform")]
    NoConfigDir,
}

/// Everything a `config.toml` can hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Printer defaults
    #[serde(default)]
    pub printer: PrinterConfig,
    /// Diagnostics of binaries built on the printer
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Printer defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Joins the location tag, call-chain entries and values
    pub separator: String,
    /// Maximum number of call-chain entries; absent means unbounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Output stream name ("stderr" or "stdout")
    pub stream: String,
    /// Written after each record
    pub terminator: String,
    /// Flush the stream after each record
    pub flush: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_depth: None,
            stream: "stderr".to_string(),
            terminator: DEFAULT_TERMINATOR.to_string(),
            flush: false,
        }
    }
}

/// Diagnostics settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "warn".to_string() } }
}

impl Config {
    /// Parses the TOML file at `path`; absent keys take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Writes this configuration to `path` as TOML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `{config_dir()}/callchain/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("callchain").join("config.toml"))
    }

    /// Load an explicitly requested file, or the default file when it exists
    ///
    /// An explicit `path` must exist. Without one, a missing default file (or
    /// a missing user config directory) yields [`Config::default`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Ok(default) if default.exists() => Self::from_file(default),
                Ok(_) | Err(ConfigError::NoConfigDir) => Ok(Self::default()),
                Err(e) => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::{tempdir, NamedTempFile};

    use super::*;

    fn write_temp(contents: &str) -> NamedTempFile {
        let file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&file, contents).expect("Failed to write temporary config");
        file
    }

    #[test]
    fn test_every_key() {
        let file = write_temp(
            r#"
            [printer]
            separator = " | "
            max_depth = 2
            stream = "stdout"
            terminator = ";\n"
            flush = true

            [logging]
            level = "debug"
        "#,
        );

        let config = Config::from_file(&file).expect("Failed to load full config");
        let expected = PrinterConfig {
            separator: " | ".to_string(),
            max_depth: Some(2),
            stream: "stdout".to_string(),
            terminator: ";\n".to_string(),
            flush: true,
        };
        assert_eq!(config.printer, expected);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_temp("[printer]\nmax_depth = 0\n");
        let config = Config::from_file(&file).expect("Failed to load partial config");
        assert_eq!(
            config,
            Config {
                printer: PrinterConfig { max_depth: Some(0), ..PrinterConfig::default() },
                logging: LoggingConfig::default(),
            }
        );

        let empty = write_temp("");
        assert_eq!(Config::from_file(&empty).expect("empty file"), Config::default());
    }

    #[test]
    fn test_read_errors() {
        let dir = tempdir().expect("Failed to create temporary directory");
        match Config::from_file(dir.path().join("absent.toml")).expect_err("absent file") {
            ConfigError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected Io error, got {:?}", other),
        }

        let garbage = write_temp("separator = = ");
        assert!(matches!(Config::from_file(&garbage), Err(ConfigError::Parse(_))));

        let wrong_type = write_temp("[printer]\nflush = \"yes\"\n");
        assert!(matches!(Config::from_file(&wrong_type), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.printer.max_depth = Some(3);
        config.printer.separator = " / ".to_string();
        config.save(&path).expect("Failed to save config");

        let text = fs::read_to_string(&path).expect("Failed to read saved config");
        assert!(text.contains("[printer]"));
        assert!(text.contains("max_depth = 3"));
        assert_eq!(Config::from_file(&path).expect("Failed to reload config"), config);

        // Unbounded depth leaves the key out
        Config::default().save(&path).expect("Failed to save default config");
        let text = fs::read_to_string(&path).expect("Failed to read saved config");
        assert!(!text.contains("max_depth"));

        let nested = dir.path().join("missing").join("config.toml");
        assert!(matches!(config.save(&nested), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_default_path_is_namespaced() {
        let path = Config::default_path().expect("Failed to get default config path");
        assert!(path.ends_with("callchain/config.toml"), "{}", path.display());
    }

    #[test]
    fn test_load_or_default() {
        let file = write_temp("[printer]\nseparator = \" -> \"\n");
        let config =
            Config::load_or_default(Some(file.path())).expect("Failed to load explicit file");
        assert_eq!(config.printer.separator, " -> ");

        let dir = tempdir().expect("Failed to create temporary directory");
        let missing = dir.path().join("missing.toml");
        match Config::load_or_default(Some(&missing)).expect_err("explicit file must exist") {
            ConfigError::NotFound(path) => assert_eq!(path, missing),
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let printer = PrinterConfig::default();
        assert_eq!(printer.separator, ": ");
        assert_eq!(printer.max_depth, None);
        assert_eq!(printer.stream, "stderr");
        assert_eq!(printer.terminator, "\n");
        assert!(!printer.flush);
        assert_eq!(LoggingConfig::default().level, "warn");
    }
}
