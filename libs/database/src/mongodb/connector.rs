use mongodb::{Client, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Build a client from `config` and verify it with a `ping`.
///
/// The driver connects lazily, so without the ping a wrong URL would only
/// surface on the first request.
pub async fn connect_from_config(config: &MongoConfig) -> DatabaseResult<Client> {
    info!(url = %config.redacted_url(), "Connecting to MongoDB");

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// [`connect_from_config`] with exponential backoff.
///
/// Only an unanswered ping is retried; a URL or option the driver rejects
/// fails on the first attempt. `None` uses [`RetryConfig::default`].
///
/// ```ignore
/// let retry = RetryConfig { max_retries: 5, ..Default::default() };
/// let client = connect_from_config_with_retry(&config, Some(retry)).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<Client> {
    let policy = retry_config.unwrap_or_default();
    retry_with_backoff(
        || connect_from_config(config),
        policy,
        DatabaseError::is_transient,
    )
    .await
}
