//! Rate Limit State
//!
//! Counts 429 responses and holds the delay applied after each one.

use crate::api::AccountTier;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Throttling state owned by one client.
///
/// Only `HttpClient::execute` records 429s; tier changes go through
/// `apply_tier`.
#[derive(Debug)]
pub struct RateLimitState {
    /// 429 responses seen since creation or the last tier change
    count: AtomicU64,

    tier: RwLock<AccountTier>,

    /// Delay applied after each 429
    sleep: RwLock<Duration>,

    /// Whether the delay was pinned by configuration
    pinned: bool,
}

impl RateLimitState {
    /// State whose delay follows the account tier
    pub fn for_tier(tier: AccountTier) -> Self {
        Self {
            count: AtomicU64::new(0),
            tier: RwLock::new(tier),
            sleep: RwLock::new(tier.rate_limit_delay()),
            pinned: false,
        }
    }

    /// State with a fixed delay that tier changes leave alone
    pub fn fixed(tier: AccountTier, sleep: Duration) -> Self {
        Self {
            count: AtomicU64::new(0),
            tier: RwLock::new(tier),
            sleep: RwLock::new(sleep),
            pinned: true,
        }
    }

    /// Tier the delay was last derived from
    pub fn tier(&self) -> AccountTier {
        *self.tier.read()
    }

    /// Number of 429 responses observed
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Current delay after a 429
    pub fn sleep_duration(&self) -> Duration {
        *self.sleep.read()
    }

    /// Record a 429, returning its ordinal and the delay to apply
    pub fn record(&self) -> (u64, Duration) {
        let ordinal = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        (ordinal, self.sleep_duration())
    }

    /// Adopt the tier reported by the server.
    ///
    /// A different tier restarts the 429 count; the same tier changes nothing.
    pub fn apply_tier(&self, tier: AccountTier) {
        let mut current = self.tier.write();
        if *current == tier {
            return;
        }
        *current = tier;

        if !self.pinned {
            *self.sleep.write() = tier.rate_limit_delay();
        }
        self.count.store(0, Ordering::Relaxed);
    }
}
