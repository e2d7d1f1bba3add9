//! Rate-limit aware HTTP client for the catalog API.
//!
//! Every request waits a short settle delay before going out, then retries
//! HTTP 429 responses with exponential backoff until the retry budget is spent.
//! Other failures are returned immediately.

mod error;
mod retry;
mod sanitize;
mod service;
mod user_agent;

pub use error::{FetchError, RATE_LIMIT_MESSAGE};
pub use retry::{
    RetryPolicy, RetryState, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_SETTLE_DELAY,
};
pub use sanitize::{has_significant_chars, sanitize_query, strip_significant_chars, SanitizedQuery};
pub use service::{CatalogService, SearchOutcome, DEFAULT_PAGE_SIZE};
pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client that absorbs upstream rate limiting.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    policy: RetryPolicy,
}

impl FetchClient {
    /// Create a client with the default user agent.
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self, FetchError> {
        Self::with_user_agent(timeout, policy, None)
    }

    /// Create a client with a custom user agent (None => default).
    pub fn with_user_agent(
        timeout: Duration,
        policy: RetryPolicy,
        user_agent_config: Option<&str>,
    ) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` and return the decoded JSON body.
    ///
    /// 429 responses are retried after `base_delay * 2^retry_count`; once the
    /// budget is spent the call fails with [`FetchError::RateLimitExceeded`].
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, FetchError> {
        // Desynchronize requests fired in the same instant
        tokio::time::sleep(self.policy.settle_delay).await;

        let mut retry = RetryState::new(&self.policy);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            debug!("GET {} (attempt {})", url, attempts);

            let start = Instant::now();
            let response = self.client.get(url).query(params).send().await?;
            let status = response.status();
            debug!("{} from {} in {:?}", status.as_u16(), url, start.elapsed());

            if status.is_success() {
                let body = response.bytes().await?;
                return Ok(serde_json::from_slice(&body)?);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                match retry.record_rate_limit(&self.policy) {
                    Some(delay) => {
                        warn!(
                            "Rate limited by {} (HTTP 429), retry {}/{} in {:?}",
                            url,
                            retry.retry_count(),
                            self.policy.max_retries,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    None => {
                        warn!(
                            "Rate limited by {} after {} attempts, giving up",
                            url, attempts
                        );
                        return Err(FetchError::RateLimitExceeded { attempts });
                    }
                }
            }

            return Err(FetchError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
    }

    /// GET `url` and deserialize the body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let body = self.get(url, params).await?;
        Ok(serde_json::from_value(body)?)
    }
}
