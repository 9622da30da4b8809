//! Server configuration: optional TOML file plus command-line overrides.
//!
//! # Invariants
//! - Command-line values win over file values, file values over defaults.
//! - Relative paths resolve against the working directory.

use campus_core::logging::normalize_level;
use campus_core::{default_log_level, LogSettings};
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_PATH: &str = "campus.sqlite3";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// On-disk TOML layout. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub listen: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
    pub stderr: Option<bool>,
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub listen: Option<String>,
    pub database: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen: SocketAddr,
    pub database_path: PathBuf,
    pub logging: LogSettings,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    InvalidListen(String),
    EmptyDatabasePath,
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid config `{}`: {message}", path.display())
            }
            Self::InvalidListen(value) => {
                write!(f, "listen address `{value}` is not a valid socket address")
            }
            Self::EmptyDatabasePath => write!(f, "database path cannot be empty"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

impl Config {
    /// Loads the optional file and layers `overrides` on top.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        Self::resolve(file, overrides, &cwd)
    }

    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        cwd: &Path,
    ) -> Result<Self, ConfigError> {
        let listen_text = overrides
            .listen
            .or(file.server.listen)
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_text
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidListen(listen_text.clone()))?;

        let database_path = overrides
            .database
            .or(file.database.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
        if database_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        let level = overrides
            .log_level
            .or(file.logging.level)
            .unwrap_or_else(|| default_log_level().to_string());
        let level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;

        let log_dir = overrides
            .log_dir
            .or(file.logging.dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        Ok(Self {
            listen,
            database_path: absolutize(cwd, database_path),
            logging: LogSettings {
                level: level.to_string(),
                log_dir: absolutize(cwd, log_dir),
                stderr: file.logging.stderr.unwrap_or(true),
            },
        })
    }
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError, FileConfig, Overrides};
    use std::path::{Path, PathBuf};

    fn parse(text: &str) -> FileConfig {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let config = Config::resolve(FileConfig::default(), Overrides::default(), Path::new("/srv"))
            .unwrap();

        assert_eq!(config.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(config.database_path, PathBuf::from("/srv/campus.sqlite3"));
        assert_eq!(config.logging.log_dir, PathBuf::from("/srv/logs"));
        assert!(config.logging.stderr);
    }

    #[test]
    fn file_values_are_used_and_flags_override_them() {
        let file = parse(
            r#"
            [server]
            listen = "0.0.0.0:9000"

            [database]
            path = "/var/lib/campus/records.sqlite3"

            [logging]
            level = "warning"
            dir = "/var/log/campus"
            stderr = false
            "#,
        );
        let overrides = Overrides {
            listen: Some("127.0.0.1:7000".to_string()),
            log_level: Some("ERROR".to_string()),
            ..Overrides::default()
        };

        let config = Config::resolve(file, overrides, Path::new("/srv")).unwrap();

        assert_eq!(config.listen.port(), 7000);
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/campus/records.sqlite3")
        );
        assert_eq!(config.logging.level, "error");
        assert_eq!(config.logging.log_dir, PathBuf::from("/var/log/campus"));
        assert!(!config.logging.stderr);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = Config::resolve(
            FileConfig::default(),
            Overrides {
                listen: Some("localhost".to_string()),
                ..Overrides::default()
            },
            Path::new("/srv"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListen(_)));

        let err = Config::resolve(
            FileConfig::default(),
            Overrides {
                database: Some(PathBuf::new()),
                ..Overrides::default()
            },
            Path::new("/srv"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDatabasePath));

        let err = Config::resolve(
            parse("[logging]\nlevel = \"chatty\"\n"),
            Overrides::default(),
            Path::new("/srv"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let err = FileConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = FileConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
