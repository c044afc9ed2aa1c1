//! Blocking GET with retries and a circuit breaker.
//!
//! Shared by the Binance and CoinGecko clients. 429, 5xx, connect errors
//! and timeouts are retried with exponential backoff; 403 trips the breaker
//! immediately; other 4xx are returned as `DataError::Http` without retry.

use super::circuit_breaker::CircuitBreaker;
use super::provider::DataError;
use crate::clock::Sleeper;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("moverscan/", env!("CARGO_PKG_VERSION"));

pub struct JsonClient {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    sleeper: Arc<dyn Sleeper>,
    max_retries: u32,
    base_delay: Duration,
}

impl JsonClient {
    pub fn new(
        timeout: Duration,
        circuit_breaker: Arc<CircuitBreaker>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            sleeper,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// GET `url` and return the raw body of the first successful response.
    pub fn get_text(&self, url: &str) -> Result<String, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt);
                tracing::debug!(url, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                self.sleeper.sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    let err = DataError::NetworkUnreachable(e.to_string());
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            };

            let status = resp.status();

            if status == StatusCode::FORBIDDEN {
                tracing::warn!(url, "403 from provider, tripping circuit breaker");
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status.is_server_error() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
                continue;
            }

            if !status.is_success() {
                return Err(DataError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = resp.text().map_err(|e| {
                DataError::NetworkUnreachable(format!("failed to read response from {url}: {e}"))
            })?;
            self.circuit_breaker.record_success();
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Delay before retry `attempt` (1-based): base, 2×base, 4×base, …
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    base.saturating_mul(2u32.pow(exp))
}
