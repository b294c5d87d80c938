use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ProverError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEB_DIR: &str = "prover/web";
const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
const DEFAULT_JOURNAL_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ProverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ProverError::Config(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Server configuration.
///
/// Layered: built-in defaults, then the optional TOML file, then env vars
/// (`PROVER_HOST`, `PROVER_PORT`, `PROVER_WEB_DIR`,
/// `PROVER_JOURNAL_MAX_ENTRIES`, `LOG_FORMAT`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Static UI directory served as the fallback route. `None` disables it.
    pub web_dir: Option<PathBuf>,
    pub max_body_bytes: usize,
    /// CORS origins. Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Journal entries kept before older ones are folded into a checkpoint.
    pub journal_max_entries: usize,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            web_dir: Some(PathBuf::from(DEFAULT_WEB_DIR)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            allowed_origins: Vec::new(),
            journal_max_entries: DEFAULT_JOURNAL_MAX_ENTRIES,
            log_format: LogFormat::Text,
        }
    }
}

/// TOML file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub web_dir: Option<PathBuf>,
    pub max_body_bytes: Option<usize>,
    pub allowed_origins: Option<Vec<String>>,
    pub journal_max_entries: Option<usize>,
}

impl Config {
    /// Load from `.env`, an optional TOML file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ProverError> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => Some(load_file(path)?),
            None => None,
        };
        Self::from_sources(file, |key| env::var(key).ok())
    }

    /// Merge a parsed file and an env lookup over the defaults.
    pub fn from_sources(
        file: Option<FileConfig>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ProverError> {
        let mut config = Config::default();

        if let Some(FileConfig { server }) = file {
            if let Some(host) = server.host {
                config.host = host;
            }
            if let Some(port) = server.port {
                config.port = port;
            }
            if let Some(web_dir) = server.web_dir {
                config.web_dir = Some(web_dir);
            }
            if let Some(max) = server.max_body_bytes {
                config.max_body_bytes = max;
            }
            if let Some(origins) = server.allowed_origins {
                config.allowed_origins = origins;
            }
            if let Some(max) = server.journal_max_entries {
                config.journal_max_entries = max;
            }
        }

        if let Some(host) = lookup("PROVER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PROVER_PORT") {
            config.port = port.parse().map_err(|_| {
                ProverError::Config(format!("PROVER_PORT must be a number, got '{port}'"))
            })?;
        }
        if let Some(dir) = lookup("PROVER_WEB_DIR") {
            config.web_dir = if dir.is_empty() { None } else { Some(PathBuf::from(dir)) };
        }
        if let Some(max) = lookup("PROVER_JOURNAL_MAX_ENTRIES") {
            config.journal_max_entries = max.parse().map_err(|_| {
                ProverError::Config(format!(
                    "PROVER_JOURNAL_MAX_ENTRIES must be a number, got '{max}'"
                ))
            })?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = format.parse()?;
        }

        if config.max_body_bytes == 0 {
            return Err(ProverError::Config("max_body_bytes must be positive".into()));
        }
        if config.journal_max_entries == 0 {
            return Err(ProverError::Config("journal_max_entries must be positive".into()));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse a TOML config file.
pub fn load_file(path: &Path) -> Result<FileConfig, ProverError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ProverError::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    parse_file(&content)
        .map_err(|e| ProverError::Config(format!("{}: {e}", path.display())))
}

pub fn parse_file(content: &str) -> Result<FileConfig, ProverError> {
    toml::from_str(content).map_err(|e| ProverError::Config(format!("Failed to parse config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(None, env_of(&[])).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.web_dir, Some(PathBuf::from("prover/web")));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = parse_file(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            max_body_bytes = 1024
            allowed_origins = ["https://example.org"]
            "#,
        )
        .unwrap();
        let config = Config::from_sources(Some(file), env_of(&[])).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.allowed_origins, vec!["https://example.org"]);
    }

    #[test]
    fn env_overrides_file() {
        let file = parse_file("[server]\nport = 9000\n").unwrap();
        let config = Config::from_sources(
            Some(file),
            env_of(&[("PROVER_PORT", "7000"), ("LOG_FORMAT", "json"), ("PROVER_WEB_DIR", "")]),
        )
        .unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.web_dir.is_none());
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = Config::from_sources(None, env_of(&[("PROVER_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ProverError::Config(msg) if msg.contains("PROVER_PORT")));
    }

    #[test]
    fn bad_log_format_is_a_config_error() {
        let err = Config::from_sources(None, env_of(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ProverError::Config(_)));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(parse_file("[server]\nprot = 1\n").is_err());
        assert!(parse_file("[database]\nurl = \"x\"\n").is_err());
    }

    #[test]
    fn shipped_example_config_parses() {
        let file = parse_file(include_str!("../../../config/prover.toml")).unwrap();
        let config = Config::from_sources(Some(file), env_of(&[])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn journal_bound_from_file_and_env() {
        let config = Config::from_sources(None, env_of(&[])).unwrap();
        assert_eq!(config.journal_max_entries, 1024);

        let file = parse_file("[server]\njournal_max_entries = 16\n").unwrap();
        let config = Config::from_sources(Some(file.clone()), env_of(&[])).unwrap();
        assert_eq!(config.journal_max_entries, 16);

        let config =
            Config::from_sources(Some(file), env_of(&[("PROVER_JOURNAL_MAX_ENTRIES", "4")]))
                .unwrap();
        assert_eq!(config.journal_max_entries, 4);

        let err = Config::from_sources(None, env_of(&[("PROVER_JOURNAL_MAX_ENTRIES", "0")]))
            .unwrap_err();
        assert!(matches!(err, ProverError::Config(msg) if msg.contains("journal_max_entries")));
    }

    #[test]
    fn zero_body_limit_is_rejected() {
        let file = parse_file("[server]\nmax_body_bytes = 0\n").unwrap();
        assert!(Config::from_sources(Some(file), env_of(&[])).is_err());
    }
}
