//! Client Module
//!
//! HTTP execution and rate limit state.

pub mod http;
pub mod rate_limiter;

pub use http::{ApiRequest, HttpClient, RequestBody, MAX_CONNECTION_RETRIES};
pub use rate_limiter::RateLimitState;
