//! # Conflict Retry
//!
//! Bounded, immediate retry for units of work that lose a write race.
//!
//! ```text
//! attempt 1 ──► Conflict ──► attempt 2 ──► Conflict ──► attempt 3 ──► Conflict ──► Err
//!     │                          │                          │
//!     └── Ok / other Err ──► returned as is, no further attempts
//! ```
//!
//! There is no backoff: SQLite's own busy timeout already waits for the lock.

use std::future::Future;
use tracing::{info, warn};

use crate::error::DbResult;

/// Runs `op` until it succeeds, fails with a non-transient error, or has
/// been attempted `max_attempts` times.
///
/// `op` receives the 1-based attempt number. Each attempt must open its own
/// transaction; a failed attempt's transaction has already rolled back.
///
/// ## Example
/// ```rust,ignore
/// let count = retry_on_conflict(MAX_COMMIT_ATTEMPTS, |_attempt| {
///     commit_batch(&pool, &plan)
/// })
/// .await?;
/// ```
pub async fn retry_on_conflict<T, F, Fut>(max_attempts: u32, mut op: F) -> DbResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "Unit of work succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() && attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %err, "Write conflict, retrying");
                attempt += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    warn!(attempt, error = %err, "Write conflict, giving up");
                }
                return Err(err);
            }
        }
    }
}
