//! Retry logic with exponential backoff for management API calls.
//!
//! Retries only on transport errors (connection failures, timeouts).
//! Responses of any status are returned to the caller without retry.

use std::time::Duration;

/// Maximum number of retry attempts after the initial request.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Send a blocking request, retrying transport failures.
///
/// `f` is called up to `MAX_RETRIES + 1` times.
pub(crate) fn retry_send<F>(f: F) -> Result<reqwest::blocking::Response, reqwest::Error>
where
    F: Fn() -> Result<reqwest::blocking::Response, reqwest::Error>,
{
    for attempt in 0..MAX_RETRIES {
        match f() {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "management API request failed, retrying in {delay:?}: {e}"
                );
                std::thread::sleep(delay);
            }
        }
    }
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn retry_exhausts_all_attempts_on_transport_failure() {
        let call_count = AtomicU32::new(0);
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = retry_send(|| {
            call_count.fetch_add(1, Ordering::SeqCst);
            // Port 1 is closed: connection refused.
            client.get("http://127.0.0.1:1/").send()
        });

        assert!(result.is_err(), "request to closed port must fail");
        assert_eq!(call_count.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }
}
