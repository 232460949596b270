//! Time limits on store calls.

use std::time::Duration;

use tempo_core::error::{TempoError, TempoResult};
use tracing::error;

/// Run a store call, giving up after `limit`. An elapsed limit is
/// reported as [`TempoError::Database`], like any other store failure.
pub async fn within<T>(
    limit: Duration,
    call: impl Future<Output = TempoResult<T>>,
) -> TempoResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            error!(timeout_ms = limit.as_millis() as u64, "Store call timed out");
            Err(TempoError::Database("store call timed out".into()))
        }
    }
}
