/// Database layer for Taskboard
///
/// # Modules
///
/// - `secrets`: Credential resolution from a URL or a secret store
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded schema migrations
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::db::secrets::{resolve_connect_options, DatabaseSource};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = DatabaseSource::Url(std::env::var("DATABASE_URL")?);
///     let options = resolve_connect_options(&source, None).await?;
///     let pool = create_pool(DatabaseConfig::default(), options).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod secrets;
