//! Optimistic concurrency retry.

use std::future::Future;

use crate::error::Result;

/// Runs `attempt` until it commits or fails with something other than a
/// version conflict.
///
/// Each attempt must re-read the records it writes, so a retry always works
/// from the state the winning writer left behind. Conflicts never reach the
/// caller.
pub(crate) async fn retry_on_conflict<T, F, Fut>(
    operation: &'static str,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts: u32 = 1;
    loop {
        match attempt().await {
            Err(e) if e.is_conflict() => {
                metrics::counter!("ledger_commit_conflicts_total", "operation" => operation)
                    .increment(1);
                tracing::debug!(operation, attempts, error = %e, "Commit conflict, retrying");
                attempts += 1;
                tokio::task::yield_now().await;
            }
            result => return result,
        }
    }
}
