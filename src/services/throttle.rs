//! Per-partner action throttling
//!
//! An explicit, injected capability keyed by partner id. State is in-memory
//! and non-durable; losing it on restart is acceptable for the actions it
//! guards (dashboard test emails).

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use uuid::Uuid;

/// Keyed limiter allowing one action per period per partner.
pub struct ActionThrottle {
    limiter: RateLimiter<Uuid, DefaultKeyedStateStore<Uuid>, DefaultClock>,
    clock: DefaultClock,
}

impl ActionThrottle {
    pub fn new(period: Duration) -> Self {
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_minute(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::MIN);

        Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }

    /// Try to take the slot for `key`. On denial, returns the seconds to
    /// wait before the next attempt can succeed.
    pub fn check(&self, key: Uuid) -> Result<(), u64> {
        self.limiter.check_key(&key).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            wait.as_secs().max(1)
        })
    }
}
