//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::SwitchboardError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, SwitchboardError>>,
) -> Result<T, SwitchboardError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(SwitchboardError::Timeout(duration_millis(duration))),
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
