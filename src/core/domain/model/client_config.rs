//! Transport and fan-out settings for [`crate::OneClient`].

use crate::core::domain::error::{OneError, OneResult};
use std::time::Duration;

/// Client-side request quota applied before every RPC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Settings that shape how the endpoint is called, not what is collected.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Maximum number of detail fetches in flight. `1` is strictly sequential.
    pub detail_concurrency: usize,
    /// Per-request timeout handed to the HTTP transport.
    pub request_timeout: Option<Duration>,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
    /// Optional client-side rate limit.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            detail_concurrency: 4,
            request_timeout: None,
            accept_invalid_certs: false,
            rate_limit: None,
        }
    }
}

impl ClientConfig {
    /// Rejects settings the transport cannot honor.
    pub fn validate(&self) -> OneResult<()> {
        if self.detail_concurrency == 0 {
            return Err(OneError::Configuration(
                "detail_concurrency must be at least 1".to_string(),
            ));
        }
        if let Some(rl) = self.rate_limit {
            if rl.requests_per_second == 0 || rl.burst_size == 0 {
                return Err(OneError::Configuration(
                    "rate limit requests_per_second and burst_size must be at least 1"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}
