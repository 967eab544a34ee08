//! Periodic cleanup of spent activation tokens.
//!
//! Deletes rows from `tokens` that have expired or were already validated.
//! Neither can ever be presented successfully again.

use std::time::Duration;

use booknet_db::repositories::TokenRepo;
use booknet_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Run the token purge loop until `cancel` is triggered.
pub async fn run(pool: DbPool, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Token purge job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token purge job stopping");
                break;
            }
            _ = interval.tick() => {
                match TokenRepo::delete_stale(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Token purge: removed stale tokens");
                    }
                    Ok(_) => tracing::debug!("Token purge: nothing to remove"),
                    Err(e) => tracing::error!(error = %e, "Token purge: cleanup failed"),
                }
            }
        }
    }
}
