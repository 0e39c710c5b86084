//! Token bucket used to pace outbound nutrition-analysis requests.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

pub struct TokenBucket {
    state: Mutex<BucketState>,
    rate_per_second: f64,
    capacity: f64,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// `burst` tokens are available immediately; afterwards tokens refill at
    /// `rate_per_second`.
    pub fn new(rate_per_second: f64, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            rate_per_second: rate_per_second.max(f64::EPSILON),
            capacity,
        }
    }

    /// Take a token, or report how long until one is available.
    fn try_take_at(&self, now: Instant) -> Result<(), Duration> {
        let mut state = self.state.lock();

        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate_per_second).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - state.tokens;
            Err(Duration::from_secs_f64(missing / self.rate_per_second))
        }
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        loop {
            // The lock is released before sleeping
            let wait = match self.try_take_at(Instant::now()) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            tracing::trace!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
            tokio::time::sleep(wait).await;
        }
    }
}
