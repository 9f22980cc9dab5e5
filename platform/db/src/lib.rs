//! Database primitives plus the record store the HTTP handlers talk to.

pub mod store;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;

pub use store::{DbEmployeeStore, EmployeeStore, MemoryEmployeeStore, StoreError, StoreResult};

/// Shared sea-orm connection alias.
pub type DbPool = DatabaseConnection;

/// URL used when no database is configured: a private in-memory SQLite database.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing")]
    MissingUrl,
    #[error("failed to connect to database: {0}")]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Idle and lifetime limit for the single in-memory connection. Closing that
/// connection drops the database with it, so the pool must never recycle it.
pub const IN_MEMORY_CONNECTION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 10);

/// Environment-driven connection settings.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    env_key: String,
    url: Option<String>,
    max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            env_key: "DATABASE_URL".to_string(),
            url: None,
            max_connections: 10,
        }
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            ..Self::default()
        }
    }

    /// Settings read from `DATABASE_URL`, falling back to in-memory SQLite.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if std::env::var(&settings.env_key).is_err() {
            settings.url = Some(IN_MEMORY_URL.to_string());
        }
        settings
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn database_url(&self) -> DbResult<String> {
        match &self.url {
            Some(url) => Ok(url.clone()),
            None => std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl),
        }
    }

    /// In-memory SQLite starts empty on every connect, so callers migrate it eagerly.
    pub fn is_in_memory(&self) -> bool {
        self.database_url()
            .map(|url| url.starts_with("sqlite") && url.contains(":memory:"))
            .unwrap_or(false)
    }
}

fn connect_options(settings: &DatabaseSettings) -> DbResult<ConnectOptions> {
    let mut options = ConnectOptions::new(settings.database_url()?);
    options
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(true);
    // every pooled connection to :memory: would otherwise see its own empty database
    if settings.is_in_memory() {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(IN_MEMORY_CONNECTION_TTL)
            .max_lifetime(IN_MEMORY_CONNECTION_TTL);
    } else {
        options.max_connections(settings.max_connections);
    }
    Ok(options)
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let pool = Database::connect(connect_options(settings)?).await?;
    tracing::debug!(in_memory = settings.is_in_memory(), "database connected");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins_over_env_key() {
        let settings = DatabaseSettings::new("EMPLOYEE_DB_URL_THAT_IS_NOT_SET")
            .with_url("postgres://localhost/employees");
        assert_eq!(
            settings.database_url().unwrap(),
            "postgres://localhost/employees"
        );
        assert!(!settings.is_in_memory());
    }

    #[test]
    fn unset_env_key_reports_missing_url() {
        let settings = DatabaseSettings::new("EMPLOYEE_DB_URL_THAT_IS_NOT_SET");
        assert!(matches!(settings.database_url(), Err(DbError::MissingUrl)));
    }

    #[test]
    fn in_memory_connection_is_never_recycled() {
        let settings = DatabaseSettings::default().with_url(IN_MEMORY_URL);
        let options = connect_options(&settings).unwrap();
        assert_eq!(options.get_max_connections(), Some(1));
        assert_eq!(options.get_min_connections(), Some(1));
        assert_eq!(options.get_idle_timeout(), Some(IN_MEMORY_CONNECTION_TTL));
        assert_eq!(options.get_max_lifetime(), Some(IN_MEMORY_CONNECTION_TTL));

        let remote = DatabaseSettings::default().with_url("postgres://localhost/employees");
        let options = connect_options(&remote).unwrap();
        assert_eq!(options.get_max_connections(), Some(10));
        assert_eq!(options.get_idle_timeout(), None);
    }

    #[tokio::test]
    async fn in_memory_pool_carries_lifetime_limits() {
        let settings = DatabaseSettings::default().with_url(IN_MEMORY_URL);
        let pool = connect(&settings).await.unwrap();
        let sqlite = pool.get_sqlite_connection_pool();
        assert_eq!(sqlite.options().get_max_connections(), 1);
        assert_eq!(
            sqlite.options().get_idle_timeout(),
            Some(IN_MEMORY_CONNECTION_TTL)
        );
        assert_eq!(
            sqlite.options().get_max_lifetime(),
            Some(IN_MEMORY_CONNECTION_TTL)
        );
    }

    #[test]
    fn sqlite_memory_urls_are_detected() {
        let settings = DatabaseSettings::default().with_url(IN_MEMORY_URL);
        assert!(settings.is_in_memory());
        let file = DatabaseSettings::default().with_url("sqlite://timesheet.db?mode=rwc");
        assert!(!file.is_in_memory());
    }
}
