//! Client-side request pacing: a token bucket sized from
//! `PING_MAX_REQUESTS_PER_SECOND`, plus `Retry-After` header parsing.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Upper bound on how long a `Retry-After` header may push the next attempt.
const RETRY_AFTER_CAP: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket limiter shared by every outbound API request.
///
/// The bucket starts full (a burst up to one second's allowance) and refills
/// continuously at `rate` tokens per second.
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    capacity: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        let rate = f64::from(requests_per_second.max(1));
        Self {
            rate,
            capacity: rate,
            bucket: Mutex::new(Bucket {
                tokens: rate,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Wait until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate)
            };
            // Lock released before sleeping so other tasks can refill too.
            tokio::time::sleep(wait).await;
        }
    }
}

/// Parse a `Retry-After` header value into a wait duration.
///
/// Accepts the integer-seconds form and the HTTP-date form; anything else
/// yields `None`. Waits beyond five minutes are treated as absent so the
/// caller falls back to its own backoff instead of honoring a hostile header.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    let wait = if let Ok(secs) = value.parse::<u64>() {
        Duration::from_secs(secs)
    } else {
        let when = chrono::DateTime::parse_from_rfc2822(value).ok()?;
        let delta = when.signed_duration_since(chrono::Utc::now());
        delta.to_std().unwrap_or(Duration::ZERO)
    };
    if wait > RETRY_AFTER_CAP {
        return None;
    }
    Some(wait)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_integer_seconds() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 10 "), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_retry_after_above_cap_is_ignored() {
        assert_eq!(parse_retry_after("900"), None);
        assert_eq!(parse_retry_after("300"), Some(RETRY_AFTER_CAP));
        let far_future = chrono::Utc::now() + chrono::Duration::hours(2);
        assert_eq!(parse_retry_after(&far_future.to_rfc2822()), None);
    }

    #[test]
    fn test_retry_after_http_date() {
        let future = chrono::Utc::now() + chrono::Duration::seconds(30);
        let header = future.to_rfc2822();
        let wait = parse_retry_after(&header).unwrap();
        assert!(wait <= Duration::from_secs(30));
        assert!(wait >= Duration::from_secs(25));
    }

    #[test]
    fn test_retry_after_past_date_is_zero() {
        let past = chrono::Utc::now() - chrono::Duration::seconds(30);
        assert_eq!(parse_retry_after(&past.to_rfc2822()), Some(Duration::ZERO));
    }

    #[test]
    fn test_retry_after_garbage() {
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after(""), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_pacing() {
        let limiter = RateLimiter::new(2);
        // Initial burst: capacity tokens available immediately.
        limiter.acquire().await;
        limiter.acquire().await;

        // Bucket empty; the next acquire must wait ~500ms at 2 rps.
        let before = Instant::now();
        limiter.acquire().await;
        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(400), "waited {waited:?}");
    }
}
