use super::config::DatabaseConfig;
use keystone_api_types::ApiError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection as SeaConnection, DbErr, SqlErr};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Database connection wrapper with configuration
#[derive(Clone)]
pub struct DatabaseConnection {
    connection: SeaConnection,
    config: DatabaseConfig,
}

/// Database-related errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    DbError(#[from] DbErr),

    /// A business-key unique constraint rejected an insert. The allocator
    /// raises this when retrying with a fresh id cannot help.
    #[error("Unique constraint violated on {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DatabaseError {
    /// Whether the underlying failure is a unique-constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::UniqueViolation { .. } => true,
            DatabaseError::DbError(err) => {
                matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
            }
            _ => false,
        }
    }

    /// Columns of the violated unique constraint as `table.column` pairs,
    /// when the failure is a unique-constraint violation. Callers use this
    /// to tell an id collision from a business-key duplicate.
    pub fn unique_violation_columns(&self) -> Option<Vec<String>> {
        match self {
            DatabaseError::DbError(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => Some(
                    detail
                        .rsplit(':')
                        .next()
                        .unwrap_or(&detail)
                        .split(',')
                        .map(|part| part.trim().trim_matches('"').to_string())
                        .filter(|part| !part.is_empty())
                        .collect(),
                ),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation { constraint } => {
                // A duplicate the caller can act on; everything else stays
                // an opaque storage failure.
                tracing::warn!(%constraint, "duplicate key rejected by the database");
                let key = constraint
                    .rsplit('.')
                    .next()
                    .unwrap_or(constraint.as_str())
                    .to_string();
                ApiError::Conflict {
                    entity: "Record".to_string(),
                    key,
                }
            }
            err => {
                // Full detail stays in the logs; callers get a sanitized
                // message.
                tracing::error!(error = %err, "storage failure");
                ApiError::Database {
                    message: "database operation failed".to_string(),
                }
            }
        }
    }
}

impl DatabaseConnection {
    /// Create a new database connection with configuration
    pub async fn new(config: DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Connecting to database: {}", config.url);

        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(config.connection_timeout)
            .acquire_timeout(config.connection_timeout)
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let connection = Database::connect(opts).await?;

        debug!(
            "Database connection established with {} max connections",
            config.max_connections
        );

        Ok(Self { connection, config })
    }

    /// Get the underlying Sea-ORM connection
    pub fn get_connection(&self) -> &SeaConnection {
        &self.connection
    }

    /// Get database configuration
    pub fn get_config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        use sea_orm_migration::MigratorTrait;

        info!("Running database migrations");

        crate::migrations::Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Check database connectivity
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        debug!("Pinging database");
        self.connection.ping().await?;
        Ok(())
    }

    /// Close the database connection
    pub async fn close(self) -> Result<(), DatabaseError> {
        info!("Closing database connection");
        self.connection.close().await?;
        Ok(())
    }
}
