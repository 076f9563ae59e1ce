use anyhow::{anyhow, Result};
use std::future::Future;
use rand::Rng;

/// Upper bound for a single backoff delay
const MAX_DELAY_MS: u64 = 10_000;

/// Exponential backoff retry handler with jitter
#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetry {
    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum number of retry attempts
    max_retries: u32,

    /// Current attempt number (for calculating delay)
    current_attempt: u32,
}

impl ExponentialBackoffRetry {
    /// Create a new retry handler
    pub fn new(base_delay_ms: u64, max_retries: u32) -> Self {
        Self {
            base_delay_ms,
            max_retries,
            current_attempt: 0,
        }
    }

    /// Execute an operation with exponential backoff retry logic
    pub async fn execute<F, Fut, T>(&mut self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            self.current_attempt = attempt;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt < self.max_retries {
                        let delay_ms = self.calculate_delay(attempt);
                        tracing::warn!(
                            operation = label,
                            attempt = attempt + 1,
                            max_attempts = self.max_retries + 1,
                            delay_ms,
                            error = %e,
                            "upstream call failed, retrying"
                        );

                        tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms))
                            .await;
                    }
                    last_error = Some(e);
                }
            }
        }

        // one past the last attempt marks exhaustion
        self.current_attempt = self.max_retries + 1;

        Err(anyhow!(
            "{} failed after {} attempts: {:#}",
            label,
            self.max_retries + 1,
            last_error.unwrap_or_else(|| anyhow!("unknown error"))
        ))
    }

    /// Calculate delay for current attempt using exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let exponential_delay = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(MAX_DELAY_MS);
        let jitter_range = exponential_delay / 10; // ±10% jitter

        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(0..=jitter_range * 2) as i64 - jitter_range as i64;

        (exponential_delay as i64 + jitter).clamp(0, MAX_DELAY_MS as i64) as u64
    }

    /// Get the current attempt number
    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    /// Check if we've exhausted retries
    pub fn exhausted(&self) -> bool {
        self.current_attempt > self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_operation() -> Result<()> {
        let mut retry = ExponentialBackoffRetry::new(10, 3);
        let result = retry
            .execute("price", || async { Ok::<i32, anyhow::Error>(42) })
            .await?;

        assert_eq!(result, 42);
        assert_eq!(retry.current_attempt(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_operation_with_retries() -> Result<()> {
        let mut retry = ExponentialBackoffRetry::new(10, 3);
        let mut attempt_count = 0;

        let result = retry
            .execute("bridge feed", || {
                attempt_count += 1;
                let current = attempt_count;
                async move {
                    if current < 3 {
                        Err(anyhow!("Temporary failure"))
                    } else {
                        Ok::<i32, anyhow::Error>(42)
                    }
                }
            })
            .await?;

        assert_eq!(result, 42);
        assert_eq!(attempt_count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_operation_exhausts_retries() {
        let mut retry = ExponentialBackoffRetry::new(10, 2);

        let result = retry
            .execute("swap feed", || async { Err::<i32, _>(anyhow!("Permanent failure")) })
            .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("swap feed failed after 3 attempts"));
        assert!(err.contains("Permanent failure"));
        assert!(retry.exhausted());
    }

    #[test]
    fn test_delay_calculation() {
        let retry = ExponentialBackoffRetry::new(100, 3);

        // Verify exponential growth (without jitter precision)
        let delay_0 = retry.calculate_delay(0);
        assert!(delay_0 >= 90 && delay_0 <= 110); // 100 ± 10%

        let delay_1 = retry.calculate_delay(1);
        assert!(delay_1 >= 180 && delay_1 <= 220); // 200 ± 10%

        let delay_2 = retry.calculate_delay(2);
        assert!(delay_2 >= 360 && delay_2 <= 440); // 400 ± 10%

        let capped = ExponentialBackoffRetry::new(5_000, 5).calculate_delay(4);
        assert!(capped >= 9_000 && capped <= 10_000);
    }

    #[test]
    fn test_saturated_delay_stays_at_cap() {
        let retry = ExponentialBackoffRetry::new(u64::MAX, 100);

        for attempt in [0, 10, 63, 64, 99] {
            let delay = retry.calculate_delay(attempt);
            assert!(delay >= 9_000 && delay <= 10_000, "attempt {} gave {}", attempt, delay);
        }
    }
}
