//! Configuration system for the `Taskdeck` server.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskdeck-server/config.toml`)
//! 4. Compiled defaults

use std::path::PathBuf;

use crate::routes::DEFAULT_MAX_BODY_SIZE;

/// Errors that can occur when loading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerConfigFile {
    server: ServerSection,
    storage: StorageSection,
}

/// `[server]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerSection {
    bind_addr: Option<String>,
    max_body_size: Option<usize>,
}

/// `[storage]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageSection {
    database_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the task server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Taskdeck task server")]
pub struct ServerCliArgs {
    /// Address to bind the HTTP server to.
    #[arg(short, long, env = "TASKDECK_ADDR")]
    pub bind: Option<String>,

    /// Path to the SQLite database file.
    #[arg(short, long, env = "TASKDECK_DB")]
    pub database: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskdeck-server/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum request body size in bytes.
    #[arg(long)]
    pub max_body_size: Option<usize>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKDECK_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to (e.g., `127.0.0.1:3000`).
    pub bind_addr: String,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,
    /// Log level filter string.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            database_path: default_database_path(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and a missing
    /// file is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, file))
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &ServerCliArgs, file: ServerConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: cli
                .bind
                .clone()
                .or(file.server.bind_addr)
                .unwrap_or(defaults.bind_addr),
            database_path: cli
                .database
                .clone()
                .or(file.storage.database_path)
                .unwrap_or(defaults.database_path),
            max_body_size: cli
                .max_body_size
                .or(file.server.max_body_size)
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_body_size),
            log_level: cli.log_level.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `<data dir>/taskdeck/tasks.db`, or `./tasks.db` when no data dir exists.
fn default_database_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from("tasks.db"),
        |dir| dir.join("taskdeck").join("tasks.db"),
    )
}

fn load_config_file(
    explicit_path: Option<&std::path::Path>,
) -> Result<ServerConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ServerConfigFile::default());
        };
        config_dir.join("taskdeck-server").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> ServerConfigFile {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.max_body_size, 64 * 1024);
        assert!(config.database_path.ends_with("tasks.db"));
    }

    #[test]
    fn toml_parsing_full() {
        let file = parse(
            r#"
[server]
bind_addr = "0.0.0.0:8080"
max_body_size = 4096

[storage]
database_path = "/var/lib/taskdeck/tasks.db"
"#,
        );
        let config = ServerConfig::resolve(&ServerCliArgs::default(), file);

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.max_body_size, 4096);
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/taskdeck/tasks.db")
        );
    }

    #[test]
    fn toml_parsing_partial() {
        let file = parse(
            r"
[server]
max_body_size = 1024
",
        );
        let config = ServerConfig::resolve(&ServerCliArgs::default(), file);

        assert_eq!(config.bind_addr, "127.0.0.1:3000"); // default
        assert_eq!(config.max_body_size, 1024); // from file
        assert_eq!(config.database_path, default_database_path()); // default
    }

    #[test]
    fn toml_parsing_empty() {
        let config = ServerConfig::resolve(&ServerCliArgs::default(), parse(""));
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn cli_overrides_file() {
        let file = parse(
            r#"
[server]
bind_addr = "0.0.0.0:8080"
max_body_size = 4096

[storage]
database_path = "/from/file.db"
"#,
        );
        let cli = ServerCliArgs {
            bind: Some("127.0.0.1:4000".to_string()),
            database: Some(PathBuf::from("/from/cli.db")),
            max_body_size: None, // falls through to file
            ..Default::default()
        };
        let config = ServerConfig::resolve(&cli, file);

        assert_eq!(config.bind_addr, "127.0.0.1:4000");
        assert_eq!(config.database_path, PathBuf::from("/from/cli.db"));
        assert_eq!(config.max_body_size, 4096);
    }

    #[test]
    fn zero_max_body_size_falls_back_to_default() {
        let file = parse("[server]\nmax_body_size = 0\n");
        let config = ServerConfig::resolve(&ServerCliArgs::default(), file);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);

        let cli = ServerCliArgs {
            max_body_size: Some(0),
            ..Default::default()
        };
        let config = ServerConfig::resolve(&cli, parse(""));
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let file = parse(
            r#"
[server]
bind_addr = "0.0.0.0:1"
color = "blue"
"#,
        );
        assert_eq!(file.server.bind_addr.as_deref(), Some("0.0.0.0:1"));
    }

    #[test]
    fn missing_default_config_file_returns_defaults() {
        assert!(load_config_file(None).is_ok());
    }

    #[test]
    fn explicit_missing_config_file_returns_error() {
        let result = load_config_file(Some(std::path::Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
