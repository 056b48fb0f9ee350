use anyhow::Result;
use tracing::warn;

use flowdeck_core::backoff_delays;

/// Imperative half of the backoff policy: call `op`, retrying up to
/// `max_retries` times while `retry_on` accepts the error, sleeping the next
/// scheduled delay between attempts. Errors the predicate rejects propagate
/// immediately; once retries are exhausted the last error is returned.
pub fn with_backoff<T>(
    mut op: impl FnMut() -> Result<T>,
    retry_on: impl Fn(&anyhow::Error) -> bool,
    max_retries: u32,
) -> Result<T> {
    let mut last_err = match op() {
        Ok(v) => return Ok(v),
        Err(err) if retry_on(&err) => err,
        Err(err) => return Err(err),
    };

    let mut delays = backoff_delays();
    for attempt in 1..=max_retries {
        let delay = delays.next().unwrap_or_default();
        warn!(attempt, ?delay, error = %last_err, "retrying after failure");
        std::thread::sleep(delay);
        match op() {
            Ok(v) => return Ok(v),
            Err(err) if retry_on(&err) => last_err = err,
            Err(err) => return Err(err),
        }
    }
    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_first_success_needs_no_retry() {
        let calls = AtomicU32::new(0);
        let out: Result<u32> = with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            },
            |_| true,
            4,
        );
        assert_eq!(out.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retries_then_succeeds() {
        let calls = AtomicU32::new(0);
        let out: Result<&str> = with_backoff(
            || {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(anyhow!("transient"))
                } else {
                    Ok("done")
                }
            },
            |_| true,
            4,
        );
        assert_eq!(out.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_exhausted_retries_return_last_error() {
        let calls = AtomicU32::new(0);
        let out: Result<()> = with_backoff(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow!("boom {}", n))
            },
            |_| true,
            2,
        );
        assert_eq!(out.unwrap_err().to_string(), "boom 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_non_retryable_error_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let out: Result<()> = with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow!("fatal"))
            },
            |_| false,
            4,
        );
        assert_eq!(out.unwrap_err().to_string(), "fatal");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_max_retries_means_single_attempt() {
        let calls = AtomicU32::new(0);
        let out: Result<()> = with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow!("nope"))
            },
            |_| true,
            0,
        );
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
