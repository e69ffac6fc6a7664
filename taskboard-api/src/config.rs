/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string; when unset, credentials come
///   from the secret store
/// - `DATABASE_SECRET_ID`: Secret holding the credentials (default: postgresql)
/// - `DATABASE_SECRET_REGION`: Secret store region (default: eu-north-1)
/// - `DATABASE_SECRET_VERSION_STAGE`: Secret version stage (default: AWSCURRENT)
/// - `DATABASE_SSL_MODE`: `disable`, `prefer`, `require`, `verify-ca` or `verify-full`
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_MIN_CONNECTIONS`: Idle connections kept open (default: 1)
/// - `DATABASE_ACQUIRE_TIMEOUT`: Seconds to wait for a connection (default: 30)
/// - `DATABASE_RUN_MIGRATIONS`: Apply migrations at startup (default: true)
/// - `JWT_SECRET`: Secret key for token validation (required, at least 32 characters)
/// - `JWT_ISSUER`: Expected token issuer (default: taskboard)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter (default: taskboard_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```
use sqlx::postgres::PgSslMode;
use std::fmt;
use taskboard_shared::auth::jwt::{JwtSettings, DEFAULT_ISSUER};
use taskboard_shared::db::pool::DatabaseConfig;
use taskboard_shared::db::secrets::{
    DatabaseSource, DEFAULT_REGION, DEFAULT_SECRET_ID, DEFAULT_VERSION_STAGE,
};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseSettings,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Logging configuration
    pub log: LogConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Where credentials come from
    pub source: DatabaseSource,

    /// TLS mode; `None` keeps the URL's own `sslmode` (or verify-full for secrets)
    pub ssl_mode: Option<PgSslMode>,

    /// Connection pool settings
    pub pool: DatabaseConfig,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key shared with the identity provider
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    pub secret: String,

    /// Expected `iss` claim
    pub issuer: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    pub fn settings(&self) -> JwtSettings {
        JwtSettings::new(self.secret.clone(), self.issuer.clone())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "8080").parse::<u16>()?;
        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let source = match lookup("DATABASE_URL") {
            Some(url) => DatabaseSource::Url(url),
            None => DatabaseSource::SecretsManager {
                secret_id: var("DATABASE_SECRET_ID", DEFAULT_SECRET_ID),
                region: var("DATABASE_SECRET_REGION", DEFAULT_REGION),
                version_stage: var("DATABASE_SECRET_VERSION_STAGE", DEFAULT_VERSION_STAGE),
            },
        };

        let ssl_mode = lookup("DATABASE_SSL_MODE")
            .map(|mode| {
                mode.parse::<PgSslMode>()
                    .map_err(|_| anyhow::anyhow!("Invalid DATABASE_SSL_MODE: {}", mode))
            })
            .transpose()?;

        let defaults = DatabaseConfig::default();
        let pool = DatabaseConfig {
            max_connections: var("DATABASE_MAX_CONNECTIONS", &defaults.max_connections.to_string())
                .parse()?,
            min_connections: var("DATABASE_MIN_CONNECTIONS", &defaults.min_connections.to_string())
                .parse()?,
            acquire_timeout_seconds: var(
                "DATABASE_ACQUIRE_TIMEOUT",
                &defaults.acquire_timeout_seconds.to_string(),
            )
            .parse()?,
            ..defaults
        };

        let run_migrations = var("DATABASE_RUN_MIGRATIONS", "true").parse::<bool>()?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let format = match var("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            other => anyhow::bail!("Invalid LOG_FORMAT: {}", other),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseSettings {
                source,
                ssl_mode,
                pool,
                run_migrations,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: var("JWT_ISSUER", DEFAULT_ISSUER),
            },
            log: LogConfig { format },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
