use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// Suspension point awaited before every dispatched request.
#[async_trait]
pub trait RateLimitHook: Send + Sync {
    async fn before_request(&self);
}

/// Spaces dispatched requests at least `min_interval` apart.
pub struct IntervalRateLimiter {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl IntervalRateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimitHook for IntervalRateLimiter {
    async fn before_request(&self) {
        // Held across the sleep so waiters queue up in arrival order.
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();

        let slot = match *next_slot {
            Some(slot) if slot > now => {
                trace!("Rate limiter delaying request by {:?}", slot - now);
                sleep_until(slot).await;
                slot
            }
            _ => now,
        };

        *next_slot = Some(slot + self.min_interval);
    }
}
