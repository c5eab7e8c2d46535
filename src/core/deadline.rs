// src/core/deadline.rs
//! Optional outer deadline for external calls

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation did not finish within {0:?}")]
pub struct DeadlineExceeded(pub Duration);

/// Await `fut`, giving up after `deadline`. `None` waits indefinitely.
///
/// On expiry the future is dropped, which cancels whatever it was driving.
pub async fn run_with_deadline<F>(
    deadline: Option<Duration>,
    fut: F,
) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    match deadline {
        None => Ok(fut.await),
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DeadlineExceeded(limit)),
    }
}
