//! CLI command implementations.

pub mod heal;
pub mod migrate;

use secrecy::SecretString;

/// Errors shared by commands that connect to the storefront database.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] cartkeeper_storefront::db::RepositoryError),

    #[error("Storage error: {0}")]
    Storage(#[from] cartkeeper_core::StorageError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Read the storefront database URL, falling back to `DATABASE_URL`.
fn storefront_database_url() -> Result<SecretString, CommandError> {
    let _ = dotenvy::dotenv();

    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}
