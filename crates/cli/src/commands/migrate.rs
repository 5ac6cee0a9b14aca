//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! ck-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`
//!
//! ```text
//! migrations/
//! ├── 20260124000001_create_users.sql
//! ├── 20260124000002_create_products.sql
//! └── 20260124000003_create_sessions.sql
//! ```

use cartkeeper_storefront::db;

use super::{CommandError, storefront_database_url};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn storefront() -> Result<(), CommandError> {
    let database_url = storefront_database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
