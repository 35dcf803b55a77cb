//! Per-operation cache policy over a single-key fetch.
//!
//! The policy is fixed where each client operation is defined rather than
//! inferred from the shape of the endpoint string, so a URL change cannot
//! silently flip an operation in or out of the cache.

use std::future::Future;

use serde_json::Value;

use crate::cache::ResponseCache;
use crate::error::ClimateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Serve from the store when present; populate it after a miss.
    ReadThrough,
    /// Always go to the network; never touch the store.
    Bypass,
}

/// Run `fetch` under the given policy, keyed by the raw endpoint path.
///
/// Store failures propagate; they are not downgraded to network-only
/// operation.
pub async fn fetch_with_policy<F, Fut>(
    policy: CachePolicy,
    cache: &ResponseCache,
    key: &str,
    fetch: F,
) -> Result<Value, ClimateError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ClimateError>>,
{
    match policy {
        CachePolicy::Bypass => fetch().await,
        CachePolicy::ReadThrough => {
            if let Some(document) = cache.get(key)? {
                tracing::debug!(key, "cache hit");
                return Ok(document);
            }

            let document = fetch().await?;
            cache.insert(key, &document)?;
            Ok(document)
        }
    }
}
