/// Database credential resolution
///
/// The board database is reached either through a plain connection URL (local
/// development) or through credentials stored in a managed secret store. A
/// stored secret is a JSON document:
///
/// ```json
/// {
///   "host": "board.cluster.eu-north-1.rds.amazonaws.com",
///   "port": 5432,
///   "dbname": "board",
///   "username": "board_app",
///   "password": "..."
/// }
/// ```
///
/// Credentials are resolved once at startup and turned into
/// [`PgConnectOptions`] for the connection pool.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::secrets::{resolve_connect_options, DatabaseSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = DatabaseSource::SecretsManager {
///     secret_id: "postgresql".to_string(),
///     region: "eu-north-1".to_string(),
///     version_stage: "AWSCURRENT".to_string(),
/// };
/// let options = resolve_connect_options(&source, None).await?;
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use aws_sdk_secretsmanager::{config::Region, error::DisplayErrorContext};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Default secret name holding the database credentials
pub const DEFAULT_SECRET_ID: &str = "postgresql";

/// Default secret version stage
pub const DEFAULT_VERSION_STAGE: &str = "AWSCURRENT";

/// Default region of the secret store
pub const DEFAULT_REGION: &str = "eu-north-1";

/// Error type for credential resolution
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// The secret store call failed (network, permissions, unknown secret)
    #[error("Failed to fetch secret {secret_id}: {message}")]
    Fetch { secret_id: String, message: String },

    /// The secret exists but carries no string payload
    #[error("Secret {0} has no string value")]
    EmptySecret(String),

    /// The secret payload is not a valid credential document
    #[error("Invalid secret payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The connection URL could not be parsed
    #[error("Invalid database URL: {0}")]
    InvalidUrl(#[from] sqlx::Error),
}

/// Where database credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSource {
    /// A full PostgreSQL connection URL
    Url(String),

    /// A JSON credential document in AWS Secrets Manager
    SecretsManager {
        secret_id: String,
        region: String,
        version_stage: String,
    },
}

/// Connection credentials as stored in the secret store
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseSecret {
    pub host: String,

    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,

    pub dbname: String,

    pub username: String,

    pub password: String,
}

impl fmt::Debug for DatabaseSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSecret")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl DatabaseSecret {
    /// Parses a secret payload
    pub fn from_json(payload: &str) -> Result<Self, SecretError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Builds connection options for this secret
    pub fn connect_options(&self, ssl_mode: PgSslMode) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }
}

// Secret stores emit the port as either a number or a string.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A source of database credentials keyed by secret name
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches and parses the credential document stored under `secret_id`
    async fn database_secret(&self, secret_id: &str) -> Result<DatabaseSecret, SecretError>;
}

/// AWS Secrets Manager backed store
pub struct AwsSecretsManager {
    client: aws_sdk_secretsmanager::Client,
    version_stage: String,
}

impl AwsSecretsManager {
    /// Creates a client for `region` using the default credential chain
    pub async fn new(region: &str, version_stage: &str) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: aws_sdk_secretsmanager::Client::new(&sdk_config),
            version_stage: version_stage.to_string(),
        }
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManager {
    async fn database_secret(&self, secret_id: &str) -> Result<DatabaseSecret, SecretError> {
        debug!(secret_id, version_stage = %self.version_stage, "Fetching database secret");

        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .version_stage(&self.version_stage)
            .send()
            .await
            .map_err(|e| SecretError::Fetch {
                secret_id: secret_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let payload = output
            .secret_string()
            .ok_or_else(|| SecretError::EmptySecret(secret_id.to_string()))?;

        DatabaseSecret::from_json(payload)
    }
}

/// In-memory store, for tests and fixed deployments
#[derive(Debug, Default, Clone)]
pub struct StaticSecretStore {
    secrets: HashMap<String, DatabaseSecret>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret under `secret_id`
    pub fn with_secret(mut self, secret_id: impl Into<String>, secret: DatabaseSecret) -> Self {
        self.secrets.insert(secret_id.into(), secret);
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn database_secret(&self, secret_id: &str) -> Result<DatabaseSecret, SecretError> {
        self.secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| SecretError::Fetch {
                secret_id: secret_id.to_string(),
                message: "secret not found".to_string(),
            })
    }
}

/// Fetches `secret_id` from `store` and builds connection options
///
/// Certificates are verified unless `ssl_mode` says otherwise.
pub async fn connect_options_from_store(
    store: &dyn SecretStore,
    secret_id: &str,
    ssl_mode: Option<PgSslMode>,
) -> Result<PgConnectOptions, SecretError> {
    let secret = store.database_secret(secret_id).await?;

    info!(
        host = %secret.host,
        port = secret.port,
        dbname = %secret.dbname,
        "Resolved database credentials from secret store"
    );

    Ok(secret.connect_options(ssl_mode.unwrap_or(PgSslMode::VerifyFull)))
}

/// Resolves connection options for a configured source
///
/// For [`DatabaseSource::Url`], `ssl_mode` overrides the URL's `sslmode` only
/// when set.
pub async fn resolve_connect_options(
    source: &DatabaseSource,
    ssl_mode: Option<PgSslMode>,
) -> Result<PgConnectOptions, SecretError> {
    match source {
        DatabaseSource::Url(url) => {
            let options = PgConnectOptions::from_str(url)?;
            Ok(match ssl_mode {
                Some(mode) => options.ssl_mode(mode),
                None => options,
            })
        }
        DatabaseSource::SecretsManager {
            secret_id,
            region,
            version_stage,
        } => {
            let store = AwsSecretsManager::new(region, version_stage).await;
            connect_options_from_store(&store, secret_id, ssl_mode).await
        }
    }
}
