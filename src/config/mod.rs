//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RECS_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_EMBEDDING_DIM, DEFAULT_SIMILARITY_K,
    DEFAULT_STORE_TIMEOUT_MS,
};

/// Default Qdrant URL used when `RECS_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default collection holding one vector per user.
pub const DEFAULT_QDRANT_COLLECTION: &str = "conversations";

/// Default Neo4j bolt address used when `RECS_NEO4J_URI` is not set.
pub const DEFAULT_NEO4J_URI: &str = "127.0.0.1:7687";

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RECS_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding user embeddings. Default: `conversations`.
    pub qdrant_collection: String,

    /// Neo4j bolt address. Default: `127.0.0.1:7687`.
    pub neo4j_uri: String,

    pub neo4j_user: String,

    pub neo4j_password: String,

    /// SQLite analytics database. Default: `./db/analytics.db`.
    pub sqlite_path: PathBuf,

    /// Redis URL. When unset the in-process cache is used.
    pub redis_url: Option<String>,

    /// Max entries in the in-process cache. Default: `10_000`.
    pub cache_capacity: u64,

    /// Ranking and cache behaviour for the orchestrator.
    pub retrieval: RetrievalConfig,
}

/// Settings consumed by [`crate::retrieval::RetrievalOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Number of nearest users consulted. Default: `5`.
    pub similarity_k: u64,

    /// Lifetime of cached results. Default: 5 minutes.
    pub cache_ttl: Duration,

    /// Bound on every store call. Default: 2 seconds.
    pub store_timeout: Duration,

    /// De-duplicate concurrent misses for the same user. Default: `true`.
    pub single_flight: bool,

    /// Expected embedding dimension. Default: `1024`.
    pub embedding_dim: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_k: DEFAULT_SIMILARITY_K,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            single_flight: true,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.similarity_k == 0 {
            return Err(ConfigError::MustBePositive {
                name: Config::ENV_SIMILARITY_K,
            });
        }
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::MustBePositive {
                name: Config::ENV_CACHE_TTL_SECS,
            });
        }
        if self.store_timeout.is_zero() {
            return Err(ConfigError::MustBePositive {
                name: Config::ENV_STORE_TIMEOUT_MS,
            });
        }
        if self.embedding_dim == 0 {
            return Err(ConfigError::MustBePositive {
                name: Config::ENV_EMBEDDING_DIM,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_collection: DEFAULT_QDRANT_COLLECTION.to_string(),
            neo4j_uri: DEFAULT_NEO4J_URI.to_string(),
            neo4j_user: "neo4j".to_string(),
            neo4j_password: "password".to_string(),
            sqlite_path: PathBuf::from("./db/analytics.db"),
            redis_url: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "RECS_PORT";
    pub const ENV_BIND_ADDR: &'static str = "RECS_BIND_ADDR";
    pub const ENV_QDRANT_URL: &'static str = "RECS_QDRANT_URL";
    pub const ENV_QDRANT_COLLECTION: &'static str = "RECS_QDRANT_COLLECTION";
    pub const ENV_NEO4J_URI: &'static str = "RECS_NEO4J_URI";
    pub const ENV_NEO4J_USER: &'static str = "RECS_NEO4J_USER";
    pub const ENV_NEO4J_PASSWORD: &'static str = "RECS_NEO4J_PASSWORD";
    pub const ENV_SQLITE_PATH: &'static str = "RECS_SQLITE_PATH";
    pub const ENV_REDIS_URL: &'static str = "RECS_REDIS_URL";
    pub const ENV_CACHE_CAPACITY: &'static str = "RECS_CACHE_CAPACITY";
    pub const ENV_SIMILARITY_K: &'static str = "RECS_SIMILARITY_K";
    pub const ENV_CACHE_TTL_SECS: &'static str = "RECS_CACHE_TTL_SECS";
    pub const ENV_STORE_TIMEOUT_MS: &'static str = "RECS_STORE_TIMEOUT_MS";
    pub const ENV_SINGLE_FLIGHT: &'static str = "RECS_SINGLE_FLIGHT";
    pub const ENV_EMBEDDING_DIM: &'static str = "RECS_EMBEDDING_DIM";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let retrieval_defaults = defaults.retrieval.clone();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let qdrant_url = Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let qdrant_collection =
            Self::parse_string_from_env(Self::ENV_QDRANT_COLLECTION, defaults.qdrant_collection);
        let neo4j_uri = Self::parse_string_from_env(Self::ENV_NEO4J_URI, defaults.neo4j_uri);
        let neo4j_user = Self::parse_string_from_env(Self::ENV_NEO4J_USER, defaults.neo4j_user);
        let neo4j_password =
            Self::parse_string_from_env(Self::ENV_NEO4J_PASSWORD, defaults.neo4j_password);
        let sqlite_path = env::var(Self::ENV_SQLITE_PATH)
            .map(PathBuf::from)
            .unwrap_or(defaults.sqlite_path);
        let redis_url = Self::parse_optional_string_from_env(Self::ENV_REDIS_URL);
        let cache_capacity =
            Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?;

        let similarity_k =
            Self::parse_u64_from_env(Self::ENV_SIMILARITY_K, retrieval_defaults.similarity_k)?;
        let cache_ttl_secs = Self::parse_u64_from_env(
            Self::ENV_CACHE_TTL_SECS,
            retrieval_defaults.cache_ttl.as_secs(),
        )?;
        let store_timeout_ms = Self::parse_u64_from_env(
            Self::ENV_STORE_TIMEOUT_MS,
            retrieval_defaults.store_timeout.as_millis() as u64,
        )?;
        let single_flight =
            Self::parse_bool_from_env(Self::ENV_SINGLE_FLIGHT, retrieval_defaults.single_flight)?;
        let embedding_dim = Self::parse_u64_from_env(
            Self::ENV_EMBEDDING_DIM,
            retrieval_defaults.embedding_dim as u64,
        )? as usize;

        Ok(Self {
            port,
            bind_addr,
            qdrant_url,
            qdrant_collection,
            neo4j_uri,
            neo4j_user,
            neo4j_password,
            sqlite_path,
            redis_url,
            cache_capacity,
            retrieval: RetrievalConfig {
                similarity_k,
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                store_timeout: Duration::from_millis(store_timeout_ms),
                single_flight,
                embedding_dim,
            },
        })
    }

    /// Validates basic invariants (does not contact any store).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retrieval.validate()?;

        if self.qdrant_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_QDRANT_URL,
            });
        }
        if self.qdrant_collection.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_QDRANT_COLLECTION,
            });
        }
        if self.neo4j_uri.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_NEO4J_URI,
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::MustBePositive {
                name: Self::ENV_CACHE_CAPACITY,
            });
        }
        if self.sqlite_path.exists() && !self.sqlite_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.sqlite_path.clone(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
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

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: var_name,
                    value,
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
