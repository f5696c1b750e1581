//! Async timeout wrappers.
//!
//! Every read and write on a session socket goes through [`with_timeout`],
//! in every protocol phase, the identifier/proof exchange included, so a
//! client cannot hold a connection slot open by stalling before it
//! authenticates.

use crate::error::{Result, ServerError};
use std::future::Future;
use std::time::Duration;

/// Fallback deadline when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `fut` under a deadline, mapping expiry to [`ServerError::Timeout`].
pub async fn with_timeout<F, T>(duration: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(ServerError::Timeout),
    }
}
