use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which persistence adapter backs the observation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One CSV object, rewritten whole on every change.
    CsvTable,
    /// Per-record rows scoped by owner.
    Rows,
}

impl StoreBackend {
    pub fn label(self) -> &'static str {
        match self {
            Self::CsvTable => "csv",
            Self::Rows => "rows",
        }
    }

    /// Whether records written through this backend outlive the process.
    pub fn is_durable(self) -> bool {
        matches!(self, Self::CsvTable)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" | "table" | "object" => Some(Self::CsvTable),
            "rows" | "row" | "db" => Some(Self::Rows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub table_key: String,
    pub owner_id: String,
}

impl StorageConfig {
    pub const DEFAULT_TABLE_KEY: &'static str = "Rotto_Tracker.csv";

    fn from_env() -> Result<Self, ConfigError> {
        let raw_backend = env::var("SURF_STORE").unwrap_or_else(|_| "csv".to_string());
        let backend = StoreBackend::parse(&raw_backend)
            .ok_or(ConfigError::UnknownStoreBackend(raw_backend))?;

        let table_key =
            env::var("SURF_TABLE_KEY").unwrap_or_else(|_| Self::DEFAULT_TABLE_KEY.to_string());
        if table_key.trim().is_empty() {
            return Err(ConfigError::EmptyTableKey);
        }

        Ok(Self {
            backend,
            data_dir: env::var("SURF_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            table_key,
            owner_id: env::var("SURF_OWNER_ID").unwrap_or_else(|_| "local".to_string()),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownStoreBackend(String),
    EmptyTableKey,
    /// The backend keeps records only for the life of the current process.
    EphemeralStore(StoreBackend),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownStoreBackend(value) => {
                write!(f, "SURF_STORE must be 'csv' or 'rows', got '{value}'")
            }
            ConfigError::EmptyTableKey => write!(f, "SURF_TABLE_KEY must not be empty"),
            ConfigError::EphemeralStore(backend) => write!(
                f,
                "SURF_STORE={} keeps records in memory only; use SURF_STORE=csv for CLI commands",
                backend.label()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownStoreBackend(_)
            | ConfigError::EmptyTableKey
            | ConfigError::EphemeralStore(_) => None,
        }
    }
}
