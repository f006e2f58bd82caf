// client.rs — The remote reference data call.
//
// One call per category, awaited in line by the fetcher. Implementations must
// not retry internally: the lifecycle owns the retry policy, and a client
// that retried on its own would stretch the worst-case cycle duration.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

/// Client for the reference data service.
#[async_trait]
pub trait RefDataClient: Send + Sync {
    /// Fetch the identifiers for one category.
    ///
    /// Transport problems map to [`FetchError::Transport`], service-side
    /// rejections to [`FetchError::Rejected`], undecodable answers to
    /// [`FetchError::Malformed`].
    async fn get_identifiers(&self, category: &str) -> Result<Value, FetchError>;
}
