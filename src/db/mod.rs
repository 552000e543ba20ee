use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::config::Config;

/// Establish a pooled connection to the marketplace database.
///
/// SQL statement logging follows the configured log level so `LOG_LEVEL=debug`
/// surfaces the generated queries.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &Config) -> anyhow::Result<DatabaseConnection> {
    let verbose = matches!(config.log_level.as_str(), "debug" | "trace");

    let mut opts = ConnectOptions::new(config.database_url.as_str());
    opts.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(verbose);

    let db = Database::connect(opts).await?;
    Ok(db)
}
