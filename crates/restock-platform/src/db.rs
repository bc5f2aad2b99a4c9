use restock_core::PipelineError;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::debug;

use crate::config::{DatabaseConfig, redact_url, scrub_secret};

/// Opens a single-connection pool; the caller closes it when done.
pub async fn connect_database(config: &DatabaseConfig) -> Result<PgPool, PipelineError> {
    debug!(target_db = %redact_url(&config.url), "connecting to data store");

    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(config.connect_timeout)
        .connect(&config.url)
        .await
        .map_err(|err| PipelineError::Connection {
            target: redact_url(&config.url),
            reason: scrub_secret(&err.to_string(), &config.url),
        })
}
