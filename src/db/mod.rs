//! Database module: connection setup and per-table query functions.

pub mod access_tokens;
pub mod documents;
pub mod fichas;
pub mod field_reviews;
pub mod sections;
pub mod tickets;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Config;
use crate::error::AppResult;

/// Open a connection pool against the configured PostgreSQL database.
pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(&config.database_url);
    options
        .max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    Ok(db)
}
