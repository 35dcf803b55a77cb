//! Async client for a remote climate-data API.
//!
//! Provides a rate-limit-aware transport, explicit per-operation cache
//! policy, and a SQLite-backed cache for idempotent responses.

pub mod cache;
pub mod client;
pub mod error;
pub mod policy;
pub mod types;

pub use cache::ResponseCache;
pub use client::{Client, RetryLimit, StatusMode};
pub use error::ClimateError;
pub use policy::{fetch_with_policy, CachePolicy};
pub use types::{City, CityFeature, CityPage, NearestCityResponse};
