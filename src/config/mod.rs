//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `DRRECONCILE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderValue;

use crate::constants::{DEFAULT_EMBEDDING_CACHE_CAPACITY, DEFAULT_MAX_CONCURRENT_QUERIES};
use crate::terminology::TerminologyConfig;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `DRRECONCILE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Base URL advertised in the service manifest.
    pub public_url: String,

    /// Browser origin allowed by CORS (OpenRefine). Default: `http://127.0.0.1:3333`.
    pub cors_origin: String,

    /// Postgres connection URL. Unset means an in-memory store.
    pub database_url: Option<String>,

    /// Directory of the general sentence embedder (mean pooling).
    pub sentence_model_path: Option<PathBuf>,

    /// Directory of the biomedical embedder (CLS pooling).
    pub biomedical_model_path: Option<PathBuf>,

    /// Cached embeddings per provider. Default: `10_000`.
    pub embedding_cache_capacity: u64,

    /// Queries of one batch evaluated concurrently. `0` is treated as `1`.
    pub max_concurrent_queries: usize,

    pub terminology: TerminologyConfig,
}

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://127.0.0.1:3333";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            database_url: None,
            sentence_model_path: None,
            biomedical_model_path: None,
            embedding_cache_capacity: DEFAULT_EMBEDDING_CACHE_CAPACITY,
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
            terminology: TerminologyConfig::default(),
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "DRRECONCILE_PORT";
    const ENV_BIND_ADDR: &'static str = "DRRECONCILE_BIND_ADDR";
    const ENV_PUBLIC_URL: &'static str = "DRRECONCILE_PUBLIC_URL";
    const ENV_CORS_ORIGIN: &'static str = "DRRECONCILE_CORS_ORIGIN";
    const ENV_DATABASE_URL: &'static str = "DRRECONCILE_DATABASE_URL";
    const ENV_SENTENCE_MODEL_PATH: &'static str = "DRRECONCILE_SENTENCE_MODEL_PATH";
    const ENV_BIOMEDICAL_MODEL_PATH: &'static str = "DRRECONCILE_BIOMEDICAL_MODEL_PATH";
    const ENV_EMBEDDING_CACHE_CAPACITY: &'static str = "DRRECONCILE_EMBEDDING_CACHE_CAPACITY";
    const ENV_MAX_CONCURRENT_QUERIES: &'static str = "DRRECONCILE_MAX_CONCURRENT_QUERIES";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let public_url = Self::parse_string_from_env(Self::ENV_PUBLIC_URL, defaults.public_url);
        let cors_origin = Self::parse_string_from_env(Self::ENV_CORS_ORIGIN, defaults.cors_origin);
        let database_url = Self::parse_optional_string_from_env(Self::ENV_DATABASE_URL);
        let sentence_model_path = Self::parse_optional_path_from_env(Self::ENV_SENTENCE_MODEL_PATH);
        let biomedical_model_path =
            Self::parse_optional_path_from_env(Self::ENV_BIOMEDICAL_MODEL_PATH);
        let embedding_cache_capacity = Self::parse_u64_from_env(
            Self::ENV_EMBEDDING_CACHE_CAPACITY,
            defaults.embedding_cache_capacity,
        );
        let max_concurrent_queries = Self::parse_u64_from_env(
            Self::ENV_MAX_CONCURRENT_QUERIES,
            defaults.max_concurrent_queries as u64,
        )
        .max(1) as usize;

        Ok(Self {
            port,
            bind_addr,
            public_url,
            cors_origin,
            database_url,
            sentence_model_path,
            biomedical_model_path,
            embedding_cache_capacity,
            max_concurrent_queries,
            terminology: TerminologyConfig::from_env(),
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.sentence_model_path, &self.biomedical_model_path]
            .into_iter()
            .flatten()
        {
            Self::validate_model_dir(path)?;
        }

        if self.public_url.trim().is_empty() {
            return Err(ConfigError::EmptyPublicUrl);
        }

        self.cors_origin_header()?;

        Ok(())
    }

    /// The CORS origin as a header value.
    pub fn cors_origin_header(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(self.cors_origin.trim()).map_err(|_| {
            ConfigError::InvalidCorsOrigin {
                value: self.cors_origin.clone(),
            }
        })
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn validate_model_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
