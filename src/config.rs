//! Application configuration.
//!
//! Settings resolve with the following priority (highest first):
//! 1. CLI flags
//! 2. Process environment
//! 3. `.env` file
//! 4. TOML config file (`--config`, or `task-frontend.toml` when present)
//! 5. Compiled defaults

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Parser;
use dotenvy::EnvLoader;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "task-frontend.toml";

/// Application timezone, unset means the server's local clock
static APP_TIMEZONE: OnceLock<Tz> = OnceLock::new();

/// Initialize the timezone from the given string
pub fn init_timezone(tz_str: &str) {
    let timezone: Tz = tz_str.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone = %tz_str, "invalid timezone, falling back to UTC");
        chrono_tz::UTC
    });

    if APP_TIMEZONE.set(timezone).is_err() {
        tracing::warn!("timezone already initialized");
    }
}

/// Get the configured timezone, if any
pub fn get_timezone() -> Option<Tz> {
    APP_TIMEZONE.get().copied()
}

/// Today's date on the application clock. Due dates are compared against this.
pub fn today() -> NaiveDate {
    match get_timezone() {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Local::now().date_naive(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Parser, Debug, Default)]
#[command(name = "task-frontend")]
#[command(about = "Web frontend for creating tasks on the task API")]
pub struct CliArgs {
    /// Address to listen on (e.g. 0.0.0.0:3100)
    #[arg(long)]
    pub bind: Option<String>,

    /// Base URL of the task backend
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long)]
    pub backend_timeout: Option<u64>,

    /// IANA timezone used for "today" (defaults to the server's local time)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Directory served under /static
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerSection,
    backend: BackendSection,
    app: AppSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    bind_addr: Option<String>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BackendSection {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppSection {
    timezone: Option<String>,
    log_level: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub backend_url: String,
    pub backend_timeout: Duration,
    pub timezone: Option<String>,
    pub static_dir: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3100".to_string(),
            backend_url: "http://localhost:4000".to_string(),
            backend_timeout: Duration::from_secs(10),
            timezone: None,
            static_dir: PathBuf::from("static"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;

        // A missing .env is fine
        let dotenv = EnvLoader::new().load().unwrap_or_default();
        let env = |key: &str| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned());

        Self::resolve(cli, &env, &file)
    }

    fn resolve(
        cli: &CliArgs,
        env: &dyn Fn(&str) -> Option<String>,
        file: &ConfigFile,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let backend_timeout = match cli.backend_timeout {
            Some(secs) => Some(secs),
            None => match env("BACKEND_TIMEOUT_SECS") {
                Some(value) => Some(value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "BACKEND_TIMEOUT_SECS",
                    value,
                })?),
                None => file.backend.timeout_secs,
            },
        };

        Ok(Self {
            bind_addr: cli
                .bind
                .clone()
                .or_else(|| env("BIND_ADDR"))
                .or_else(|| file.server.bind_addr.clone())
                .unwrap_or(defaults.bind_addr),
            backend_url: cli
                .backend_url
                .clone()
                .or_else(|| env("BACKEND_URL"))
                .or_else(|| file.backend.url.clone())
                .unwrap_or(defaults.backend_url),
            backend_timeout: backend_timeout
                .map(Duration::from_secs)
                .unwrap_or(defaults.backend_timeout),
            timezone: cli
                .timezone
                .clone()
                .or_else(|| env("APP_TIMEZONE"))
                .or_else(|| file.app.timezone.clone()),
            static_dir: cli
                .static_dir
                .clone()
                .or_else(|| env("STATIC_DIR").map(PathBuf::from))
                .or_else(|| file.server.static_dir.clone())
                .unwrap_or(defaults.static_dir),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.app.log_level.clone())
                .unwrap_or(defaults.log_level),
        })
    }
}

/// An explicit path must exist; the default file is optional.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = explicit_path {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let path = PathBuf::from(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(&CliArgs::default(), &no_env, &ConfigFile::default()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.backend_url, "http://localhost:4000");
        assert_eq!(config.backend_timeout, Duration::from_secs(10));
        assert_eq!(config.timezone, None);
    }

    #[test]
    fn test_toml_full() {
        let file: ConfigFile = toml::from_str(
            r#"
[server]
bind_addr = "127.0.0.1:8080"
static_dir = "public"

[backend]
url = "http://tasks.internal:4000"
timeout_secs = 3

[app]
timezone = "Europe/London"
log_level = "debug"
"#,
        )
        .unwrap();
        let config = AppConfig::resolve(&CliArgs::default(), &no_env, &file).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.backend_url, "http://tasks.internal:4000");
        assert_eq!(config.backend_timeout, Duration::from_secs(3));
        assert_eq!(config.timezone.as_deref(), Some("Europe/London"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_toml_partial() {
        let file: ConfigFile = toml::from_str("[backend]\nurl = \"http://other:9000\"\n").unwrap();
        let config = AppConfig::resolve(&CliArgs::default(), &no_env, &file).unwrap();

        assert_eq!(config.backend_url, "http://other:9000");
        assert_eq!(config.bind_addr, "0.0.0.0:3100");
    }

    #[test]
    fn test_priority_cli_then_env_then_file() {
        let file: ConfigFile = toml::from_str(
            r#"
[server]
bind_addr = "127.0.0.1:8080"

[backend]
url = "http://from-file:4000"
timeout_secs = 3
"#,
        )
        .unwrap();
        let cli = CliArgs {
            bind: Some("0.0.0.0:9999".to_string()),
            ..Default::default()
        };
        let env = |key: &str| match key {
            "BIND_ADDR" => Some("0.0.0.0:7777".to_string()),
            "BACKEND_URL" => Some("http://from-env:4000".to_string()),
            _ => None,
        };
        let config = AppConfig::resolve(&cli, &env, &file).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9999");
        assert_eq!(config.backend_url, "http://from-env:4000");
        assert_eq!(config.backend_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_timeout_in_env() {
        let env = |key: &str| (key == "BACKEND_TIMEOUT_SECS").then(|| "soon".to_string());
        let result = AppConfig::resolve(&CliArgs::default(), &env, &ConfigFile::default());
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: "BACKEND_TIMEOUT_SECS", .. })));
    }

    #[test]
    fn test_explicit_missing_config_file_is_an_error() {
        let result = load_config_file(Some(Path::new("/nonexistent/task-frontend.toml")));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_today_uses_local_clock_without_timezone() {
        // The timezone is never initialized in unit tests
        let before = Local::now().date_naive();
        let today = today();
        let after = Local::now().date_naive();
        assert!(today == before || today == after);
    }
}
