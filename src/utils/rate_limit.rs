use once_cell::sync::OnceCell;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

// SEC allows 10 requests per second; keep a little headroom.
const MIN_REQUEST_SPACING: Duration = Duration::from_millis(110);

/// Enforces a minimum spacing between consecutive requests, process-wide.
pub struct RateLimiter {
    min_spacing: Duration,
    last_request: Mutex<Option<Instant>>,
}

static EDGAR_RATE_LIMITER: OnceCell<RateLimiter> = OnceCell::new();

impl RateLimiter {
    pub fn new(min_spacing: Duration) -> Self {
        RateLimiter {
            min_spacing,
            last_request: Mutex::new(None),
        }
    }

    /// Sleeps until at least `min_spacing` has elapsed since the previous
    /// call, then records the current instant as the new reference point.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let ready = prev + self.min_spacing;
            let now = Instant::now();
            if ready > now {
                tokio::time::sleep(ready - now).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn edgar() -> &'static RateLimiter {
        EDGAR_RATE_LIMITER.get_or_init(|| RateLimiter::new(MIN_REQUEST_SPACING))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spaces_out_consecutive_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(30));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn first_request_is_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
