//! Online drain-rate estimation, updated only while the link stays
//! continuously backlogged and only when the operator hasn't pinned a fixed
//! rate via configuration.

use crate::credit::n_pow2;

/// Exponentially-weighted byte/time sums used to estimate the drain rate `C`.
#[derive(Debug, Clone, Default)]
pub struct RateEstimator {
    /// Current drain rate estimate, bytes/sec. Authoritative value read by
    /// the linear-devaluation branch and exposed in stats.
    rate: u64,
    s_b: u64,
    s_t: u64,
    last_rate_update: u64,
    last_packet_dequeue: u64,
    last_packet_size: u64,
    backlogged: bool,
}

impl RateEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.rate
    }

    pub fn s_b(&self) -> u64 {
        self.s_b
    }

    pub fn s_t(&self) -> u64 {
        self.s_t
    }

    /// A fixed rate was configured; overrides the estimate immediately and
    /// stops `on_dequeue` from touching `S_b`/`S_t` until it is cleared.
    pub fn set_fixed_rate(&mut self, rate: u64) {
        self.rate = rate;
    }

    pub fn reset(&mut self, rate_config: u64) {
        *self = Self::default();
        self.rate = rate_config;
    }

    /// Called on every dequeue, after the packet has been chosen.
    ///
    /// `now` is the dequeue timestamp, `dequeued_len` the chosen packet's
    /// length, `remaining_qlen_before_decrement` the combined flow-queue
    /// length *before* this packet was removed, and `rate_config` the
    /// operator-pinned rate (0 meaning "estimate").
    pub fn on_dequeue(
        &mut self,
        now: u64,
        dequeued_len: u32,
        remaining_qlen_before_decrement: usize,
        rate_config: u64,
        rate_memory_ns: u64,
    ) {
        if rate_config == 0 && self.backlogged {
            let diff_r = now.saturating_sub(self.last_rate_update);
            let diff_d = now.saturating_sub(self.last_packet_dequeue);
            let memory = rate_memory_ns.max(1);
            let y = (((diff_r as u128) * 5909) << 8) / (memory as u128);
            let y = y.min(u64::MAX as u128) as u64;

            self.s_b = n_pow2(self.s_b, y, 20) + self.last_packet_size;
            self.s_t = n_pow2(self.s_t, y, 20) + diff_d;
            self.rate = if self.s_t == 0 {
                0
            } else {
                ((self.s_b as u128 * 1_000_000_000u128) / self.s_t as u128) as u64
            };
            self.last_rate_update = now;
        }

        if rate_config != 0 {
            self.rate = rate_config;
        }

        self.last_packet_dequeue = now;
        // "> 1" rather than "> 0": the flow queue hasn't been decremented yet
        // at the point this is called, so a single-packet queue reads as 1.
        self.backlogged = remaining_qlen_before_decrement > 1;
        self.last_packet_size = dequeued_len as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rate_never_updates_from_traffic() {
        let mut r = RateEstimator::new();
        r.set_fixed_rate(5_000_000);
        r.on_dequeue(1_000_000, 1000, 5, 5_000_000, 100_000_000);
        assert_eq!(r.current(), 5_000_000);
        assert_eq!(r.s_b(), 0);
        assert_eq!(r.s_t(), 0);
    }

    #[test]
    fn estimator_converges_to_steady_rate() {
        // 1000 bytes every 1ms => 1,000,000 bytes/sec.
        let mut r = RateEstimator::new();
        let mut now = 0u64;
        // First dequeue establishes backlogged=true with no estimate update.
        r.on_dequeue(now, 1000, 5, 0, 100_000_000);
        for _ in 0..1000 {
            now += 1_000_000;
            r.on_dequeue(now, 1000, 5, 0, 100_000_000);
        }
        let target = 1_000_000u64;
        let delta = r.current().abs_diff(target);
        assert!(
            delta <= target / 100,
            "expected ~{target} B/s within 1%, got {}",
            r.current()
        );
    }

    #[test]
    fn not_backlogged_skips_update() {
        let mut r = RateEstimator::new();
        r.on_dequeue(0, 1000, 1, 0, 100_000_000); // qlen 1 => not backlogged after
        r.on_dequeue(1_000_000, 1000, 1, 0, 100_000_000);
        assert_eq!(r.s_b(), 0);
        assert_eq!(r.s_t(), 0);
    }

    #[test]
    fn reset_restores_configured_rate_or_zero() {
        let mut r = RateEstimator::new();
        r.on_dequeue(0, 1000, 5, 0, 100_000_000);
        r.reset(0);
        assert_eq!(r.current(), 0);
        assert_eq!(r.s_b(), 0);

        r.reset(42);
        assert_eq!(r.current(), 42);
    }
}
