//! Bounded retry of transient storage failures.

use std::time::Duration;

use tracing::warn;

use crate::error::DbError;

pub(crate) const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(20);

/// Run `op` up to [`MAX_ATTEMPTS`] times while it fails with a transient
/// error, doubling the delay between attempts. The last error is returned
/// unchanged.
pub(crate) async fn with_retry<T, F, Fut>(operation: &'static str, mut op: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                let delay = BASE_DELAY * 2u32.pow(attempt - 1);
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient storage failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
