//! Exact integer credit arithmetic: the scaled ABE counter, its linear and
//! exponential devaluation, and the `n_pow2` decay kernel they both rely on.
//!
//! None of this module uses floating point. `n_pow2` in particular must
//! reproduce its source constants exactly — any other representation
//! diverges in the stats output and in ABE admission timing.

/// Computes `n * 2^(-y / 2^s)` using only integer arithmetic, for `s >= 12`.
///
/// Widens intermediate products to `u128` so large `n`/`y` inputs (as seen in
/// the rate estimator's byte/nanosecond sums) don't overflow before the
/// final divide.
pub fn n_pow2(n: u64, y: u64, s: u32) -> u64 {
    debug_assert!(s >= 12);
    let n128 = n as u128;
    let y128 = y as u128;
    let threshold: u128 = 1u128 << (s + 12);

    if y128 * 9219 <= threshold {
        let term = (n128 * y128) >> (s - 12);
        (n128 - term / 5909) as u64
    } else {
        let y_unscaled = y >> s;
        if y_unscaled >= 20 {
            return 0;
        }
        let numerator = n128 * (2 + y_unscaled as u128) - ((n128 * y128) >> s);
        (numerator / (1u128 << (1 + y_unscaled))) as u64
    }
}

/// The precision shift applied to `CC_abe`. Chosen so exponential decay keeps
/// ~1e-3 byte precision; the unscaled byte view is always `CC_abe >> SHIFT`.
pub const SHIFT: u32 = 10;

/// The three credit counters plus the devaluation timestamps that gate which
/// decay branch runs. `CC_cq` is not tracked here — it is always equal to
/// [`crate::service_queue::ServiceQueue::total_bytes`], so the scheduler reads
/// it from there rather than keeping a second copy in sync.
#[derive(Debug, Clone, Default)]
pub struct CreditAccountant {
    cc_abe: u64,
    cc_be: u64,
    last_devaluation: u64,
    last_exp_devaluation: u64,
}

impl CreditAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abe_credit_bytes(&self) -> u64 {
        self.cc_abe >> SHIFT
    }

    pub fn be_credit_bytes(&self) -> u64 {
        self.cc_be
    }

    pub fn incr_abe(&mut self, bytes: u64) {
        self.cc_abe += bytes << SHIFT;
    }

    pub fn decr_abe(&mut self, bytes: u64) {
        if (bytes + 1) << SHIFT > self.cc_abe {
            self.cc_abe = 0;
        } else {
            self.cc_abe -= bytes << SHIFT;
        }
    }

    pub fn incr_be(&mut self, bytes: u64) {
        self.cc_be += bytes;
    }

    pub fn decr_be(&mut self, bytes: u64) {
        debug_assert!(bytes <= self.cc_be, "decr_be called without sufficient credit");
        self.cc_be = self.cc_be.saturating_sub(bytes);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies devaluation for one enqueue/dequeue call. `both_flows_empty`
    /// selects the branch; the service-queue drain that accompanies the
    /// both-empty branch is the caller's responsibility (this type owns only
    /// the credit counters, not the service queue).
    pub fn devaluate(
        &mut self,
        now: u64,
        both_flows_empty: bool,
        rate_bytes_per_sec: u64,
        credit_half_life_ns: u64,
    ) {
        if both_flows_empty {
            if self.last_devaluation != 0 {
                let elapsed = now.saturating_sub(self.last_devaluation);
                let bytes = ((elapsed as u128 * rate_bytes_per_sec as u128) / 1_000_000_000u128)
                    .min(u64::MAX as u128) as u64;
                self.decr_abe(bytes);
            }
        } else if self.last_exp_devaluation == 0 {
            self.last_exp_devaluation = now;
        } else {
            let diff = now.saturating_sub(self.last_exp_devaluation);
            let half_life = credit_half_life_ns.max(1);
            let y = ((diff as u128) << 20) / (half_life as u128);
            let y = y.min(u64::MAX as u128) as u64;
            let new_cc_abe = n_pow2(self.cc_abe, y, 20);
            if !(new_cc_abe == self.cc_abe && new_cc_abe != 0) {
                self.last_exp_devaluation = now;
            }
            self.cc_abe = new_cc_abe;
        }
        self.last_devaluation = now;
    }
}
