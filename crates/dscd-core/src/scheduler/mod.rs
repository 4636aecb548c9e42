//! The DSCD scheduling engine: enqueue/dequeue state machine, admission
//! control, and the ABE head-of-line timeout drop loop, built on top of the
//! flow/service queues and the credit accountant.

use std::sync::Once;

use tracing::{debug, warn};

use crate::config::DscdConfig;
use crate::credit::CreditAccountant;
use crate::error::EnqueueError;
use crate::flow_queue::FlowQueue;
use crate::packet::{Class, Packet};
use crate::rate::RateEstimator;
use crate::service_queue::ServiceQueue;
use crate::stats::{ClassStats, QueueStats, StatsSnapshot};

/// One scheduler instance: two real flow queues, the virtual service queue,
/// the credit accountant, the rate estimator, live configuration, and
/// per-class/per-queue counters.
///
/// This type performs no internal locking — per §5, the single-lock contract
/// is the caller's responsibility (see [`crate::runtime::DscdHandle`] for a
/// ready-made `Mutex` wrapper).
pub struct Scheduler<P> {
    flow_abe: FlowQueue<P>,
    flow_be: FlowQueue<P>,
    service_queue: ServiceQueue,
    credit: CreditAccountant,
    rate: RateEstimator,
    config: DscdConfig,

    abe_stats: ClassStats,
    be_stats: ClassStats,
    all_stats: ClassStats,
}

impl<P: Packet> Scheduler<P> {
    pub fn new(config: DscdConfig) -> Self {
        let rate_config = config.rate_config;
        let mut rate = RateEstimator::new();
        rate.reset(rate_config);
        Self {
            flow_abe: FlowQueue::new(),
            flow_be: FlowQueue::new(),
            service_queue: ServiceQueue::new(),
            credit: CreditAccountant::new(),
            rate,
            config,
            abe_stats: ClassStats::default(),
            be_stats: ClassStats::default(),
            all_stats: ClassStats::default(),
        }
    }

    pub fn config(&self) -> &DscdConfig {
        &self.config
    }

    /// `CC_cq`: always the service queue's running byte total (invariant 1).
    pub fn cc_cq(&self) -> u64 {
        self.service_queue.total_bytes()
    }

    fn both_flows_empty(&self) -> bool {
        self.flow_abe.is_empty() && self.flow_be.is_empty()
    }

    fn devaluate_credit(&mut self, now: u64) {
        let both_empty = self.both_flows_empty();
        if both_empty {
            self.service_queue.drain();
        }
        self.credit
            .devaluate(now, both_empty, self.rate.current(), self.config.credit_half_life);
    }

    /// Admits `packet` at time `now`, or refuses it per §4.5.
    pub fn enqueue(&mut self, packet: P, now: u64) -> Result<(), (P, EnqueueError)> {
        self.devaluate_credit(now);

        let len = packet.len() as u64;
        let accounted =
            len + self.cc_cq() + self.credit.abe_credit_bytes() + self.credit.be_credit_bytes();
        if accounted > self.config.limit as u64 {
            self.record_enqueue_drop(packet.is_abe());
            return Err((packet, EnqueueError::AdmissionExceeded));
        }

        if self
            .service_queue
            .append(packet.len(), packet.is_abe())
            .is_err()
        {
            self.record_enqueue_drop(packet.is_abe());
            warn_alloc_failed_once();
            return Err((packet, EnqueueError::AllocFailed));
        }

        let class = Class::of(packet.is_abe());
        match class {
            Class::Abe => self.flow_abe.push_tail(packet, now),
            Class::Be => self.flow_be.push_tail(packet, now),
        }

        self.class_stats_mut(class).record_enqueue();
        self.all_stats.record_enqueue();
        Ok(())
    }

    /// Pops the next packet to transmit, or `None` if both queues are empty
    /// after the timeout-drop loop runs.
    pub fn dequeue(&mut self, now: u64) -> Option<P> {
        self.devaluate_credit(now);
        self.drop_overdue_abe(now);

        if self.both_flows_empty() {
            return None;
        }

        let (packet, class, q_time) = self.select(now);

        let remaining_qlen_before_decrement =
            self.flow_abe.len_pkts() + self.flow_be.len_pkts() + 1;
        self.rate.on_dequeue(
            now,
            packet.len(),
            remaining_qlen_before_decrement,
            self.config.rate_config,
            self.config.rate_memory,
        );

        let q_delay = now.saturating_sub(q_time);
        self.class_stats_mut(class).record_dequeue(q_delay);
        self.all_stats.record_dequeue(q_delay);

        Some(packet)
    }

    /// Drops ABE head packets that have waited longer than `T_d`, as long as
    /// the ABE queue length exceeds `T_q`. The matching service element is
    /// intentionally left in place (§9): it is consumed later by the
    /// selection loop and hands its credit to whichever class is being
    /// serviced at that point.
    fn drop_overdue_abe(&mut self, now: u64) {
        while self.flow_abe.len_pkts() as u64 > self.config.t_q {
            let Some(head_q_time) = self.flow_abe.peek_head_q_time() else {
                break;
            };
            if head_q_time + self.config.t_d >= now {
                break;
            }
            self.flow_abe.pop_head();
            self.abe_stats.record_dequeue_drop();
            self.all_stats.record_dequeue_drop();
            debug!(q_time = head_q_time, now, "dropped overdue ABE packet");
        }
    }

    /// The dequeue selection loop (§4.5 step 4): releases a packet from
    /// whichever class head already has enough credit, pulling credit out of
    /// the service queue one element at a time until one does. Terminates
    /// because each iteration strictly reduces `CC_cq`, and a non-empty flow
    /// queue always has a matching service element ahead of it.
    fn select(&mut self, _now: u64) -> (P, Class, u64) {
        loop {
            if let Some(head) = self.flow_abe.peek_head() {
                if self.credit.abe_credit_bytes() >= head.len() as u64 {
                    let (packet, q_time) = self.flow_abe.pop_head_with_time().expect("just peeked");
                    self.credit.decr_abe(packet.len() as u64);
                    return (packet, Class::Abe, q_time);
                }
            }
            if let Some(head) = self.flow_be.peek_head() {
                if self.credit.be_credit_bytes() >= head.len() as u64 {
                    let (packet, q_time) = self.flow_be.pop_head_with_time().expect("just peeked");
                    self.credit.decr_be(packet.len() as u64);
                    return (packet, Class::Be, q_time);
                }
            }
            let element = self
                .service_queue
                .take_front()
                .expect("selection loop invariant: a matching element always exists");
            if element.is_abe {
                self.credit.incr_abe(element.pkt_len as u64);
            } else {
                self.credit.incr_be(element.pkt_len as u64);
            }
        }
    }

    fn record_enqueue_drop(&mut self, is_abe: bool) {
        self.class_stats_mut(Class::of(is_abe)).record_enqueue_drop();
        self.all_stats.record_enqueue_drop();
    }

    fn class_stats_mut(&mut self, class: Class) -> &mut ClassStats {
        match class {
            Class::Abe => &mut self.abe_stats,
            Class::Be => &mut self.be_stats,
        }
    }

    /// Purges both flow queues and the service queue, clearing all counters
    /// and estimator state. If `rate_config == 0`, also resets `C` to 0.
    pub fn reset(&mut self) {
        self.flow_abe.drain();
        self.flow_be.drain();
        self.service_queue.drain();
        self.credit.reset();
        self.rate.reset(self.config.rate_config);
        self.abe_stats = ClassStats::default();
        self.be_stats = ClassStats::default();
        self.all_stats = ClassStats::default();
    }

    /// Frees the service queue only — stats, credit counters, and the rate
    /// estimator are left untouched, unlike [`Scheduler::reset`]. Callers
    /// must have already purged both flow queues via a preceding `reset`;
    /// this type does not re-check that (external collaborator contract,
    /// §4.5).
    pub fn destroy(&mut self) {
        self.service_queue.drain();
    }

    /// Applies a sparse configuration change atomically. If `rate_config` is
    /// set to non-zero, `C` is immediately overwritten.
    pub fn apply_config(&mut self, new_config: DscdConfig) {
        if new_config.rate_config != 0 {
            self.rate.set_fixed_rate(new_config.rate_config);
        }
        self.config = new_config;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            rate_bytes_per_sec: self.rate.current(),
            s_b: self.rate.s_b(),
            s_t: self.rate.s_t(),
            abe_stats: self.abe_stats,
            be_stats: self.be_stats,
            all_stats: self.all_stats,
            abe_queue_stats: QueueStats {
                length: self.flow_abe.len_pkts() as u64,
                credit: self.credit.abe_credit_bytes(),
            },
            be_queue_stats: QueueStats {
                length: self.flow_be.len_pkts() as u64,
                credit: self.credit.be_credit_bytes(),
            },
            service_queue_stats: QueueStats {
                length: self.service_queue.len() as u64,
                credit: self.cc_cq(),
            },
        }
    }
}

/// Logs the `AllocFailed` warning at most once per process, since under
/// sustained memory pressure every subsequent enqueue would otherwise repeat
/// it at the packet rate.
fn warn_alloc_failed_once() {
    static WARNED: Once = Once::new();
    WARNED.call_once(|| {
        warn!("service queue allocation failed; admitted packets may be undercounted");
    });
}
