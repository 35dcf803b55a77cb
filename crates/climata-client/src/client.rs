//! Climate API client with rate-limit-aware transport.

use std::time::Duration;

use futures::stream::{self, Stream};
use futures::TryStreamExt;
use serde_json::Value;
use tracing::instrument;

use crate::cache::ResponseCache;
use crate::error::ClimateError;
use crate::policy::{fetch_with_policy, CachePolicy};
use crate::types::{City, CityPage, NearestCityResponse};

/// Ceiling on transparent 429 retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryLimit {
    /// Trust the server's `Retry-After` indefinitely.
    #[default]
    Unbounded,
    /// Give up after this many rate-limited responses, surfacing the 429
    /// as an HTTP error.
    Max(u32),
}

/// How non-2xx statuses other than 429 are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    /// Fail with [`ClimateError::Http`] on any non-success status.
    Strict,
    /// Parse and return the body regardless of status.
    Permissive,
}

/// Client for the climate-data API.
///
/// The HTTP session is built eagerly at construction and reused for every
/// request, so concurrent first use cannot race its creation. Dropping the
/// client releases the session, whether or not a request was ever issued.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
    retry_limit: RetryLimit,
}

impl Client {
    /// Create a client for the public API with the given token.
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: climata_core::config::DEFAULT_BASE_URL.to_string(),
            token: token.to_string(),
            retry_limit: RetryLimit::Unbounded,
        }
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &climata_core::Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            token: config.api_token.clone(),
            retry_limit: RetryLimit::Unbounded,
        }
    }

    #[cfg(test)]
    pub fn new_with_base_url(token: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            token: token.to_string(),
            retry_limit: RetryLimit::Unbounded,
        }
    }

    /// Cap transparent 429 retries. The default is unbounded.
    pub fn with_retry_limit(mut self, limit: RetryLimit) -> Self {
        self.retry_limit = limit;
        self
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    /// Issue a GET against `endpoint`, sleeping and re-issuing the request
    /// whenever the service answers 429 with a `Retry-After` delay. A 429
    /// without a parseable `Retry-After` falls back to a one-second delay.
    ///
    /// The sleep is a suspension point; other in-flight requests on the
    /// same client keep running.
    pub async fn fetch_raw(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        mode: StatusMode,
    ) -> Result<Value, ClimateError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut rate_limited = 0u32;

        loop {
            tracing::debug!(endpoint, "GET");
            let mut request = self.http.get(&url).header("Authorization", self.auth_header());
            if !query.is_empty() {
                request = request.query(query);
            }
            let response = request.send().await?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                rate_limited += 1;
                if let RetryLimit::Max(max) = self.retry_limit {
                    if rate_limited > max {
                        return Err(ClimateError::Http { status: status.as_u16() });
                    }
                }

                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);

                tracing::warn!(retry_after, "rate limited; retrying after delay");
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if mode == StatusMode::Strict && !status.is_success() {
                return Err(ClimateError::Http { status: status.as_u16() });
            }

            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }
    }

    async fn cached(&self, cache: &ResponseCache, endpoint: String) -> Result<Value, ClimateError> {
        fetch_with_policy(CachePolicy::ReadThrough, cache, &endpoint, || async {
            self.fetch_raw(&endpoint, &[], StatusMode::Strict).await
        })
        .await
    }

    /// All available cities, as a lazy stream walking the paginated
    /// listing one page at a time. Each page's features are yielded in
    /// order; the walk stops after a page without a `next` pointer.
    /// Never cached.
    pub fn cities(&self) -> impl Stream<Item = Result<City, ClimateError>> + '_ {
        stream::try_unfold(Some(1u32), move |state| async move {
            let Some(page) = state else {
                return Ok::<_, ClimateError>(None);
            };

            let document = self
                .fetch_raw("/city", &[("page", page.to_string())], StatusMode::Strict)
                .await?;
            let listing: CityPage = serde_json::from_value(document)?;

            let next = listing.next.is_some().then_some(page + 1);
            let cities: Vec<Result<City, ClimateError>> =
                listing.features.into_iter().map(|feature| Ok(City::from(feature))).collect();

            Ok(Some((stream::iter(cities), next)))
        })
        .try_flatten()
    }

    /// The city nearest to the given coordinates, or `None` when the
    /// service reports no result. Keyed by caller coordinates, so never
    /// cached.
    #[instrument(skip(self), level = "info")]
    pub async fn get_nearest_city(&self, lat: f64, lon: f64) -> Result<Option<City>, ClimateError> {
        let query = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("limit", "1".to_string()),
        ];

        let document = self.fetch_raw("/city/nearest", &query, StatusMode::Strict).await?;
        let nearest: NearestCityResponse = serde_json::from_value(document)?;

        if nearest.count == 0 {
            return Ok(None);
        }

        Ok(nearest.features.into_iter().next().map(City::from))
    }

    /// All available scenarios.
    #[instrument(skip(self, cache), level = "info")]
    pub async fn get_scenarios(&self, cache: &ResponseCache) -> Result<Value, ClimateError> {
        self.cached(cache, "/scenario".to_string()).await
    }

    /// The full list of indicators.
    #[instrument(skip(self, cache), level = "info")]
    pub async fn get_indicators(&self, cache: &ResponseCache) -> Result<Value, ClimateError> {
        self.cached(cache, "/indicator".to_string()).await
    }

    /// Description and parameters of the specified indicator.
    #[instrument(skip(self, cache), level = "info")]
    pub async fn get_indicator_details(
        &self,
        cache: &ResponseCache,
        indicator: &str,
    ) -> Result<Value, ClimateError> {
        self.cached(cache, format!("/indicator/{indicator}")).await
    }

    /// Derived climate indicator data for a city under a scenario.
    #[instrument(skip(self, cache), level = "info")]
    pub async fn get_indicator_data(
        &self,
        cache: &ResponseCache,
        city: i64,
        scenario: &str,
        indicator: &str,
    ) -> Result<Value, ClimateError> {
        self.cached(cache, format!("/climate-data/{city}/{scenario}/indicator/{indicator}"))
            .await
    }
}
