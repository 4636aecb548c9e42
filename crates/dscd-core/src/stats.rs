use serde::{Deserialize, Serialize};

/// Counters kept per traffic class (ABE, BE) and for the combined `all` view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStats {
    pub sum_delay_ns: u64,
    pub received_packets: u64,
    pub sent_packets: u64,
    pub enqueue_drops: u64,
    pub dequeue_drops: u64,
}

impl ClassStats {
    pub fn record_enqueue(&mut self) {
        self.received_packets += 1;
    }

    pub fn record_enqueue_drop(&mut self) {
        self.enqueue_drops += 1;
    }

    pub fn record_dequeue(&mut self, q_delay_ns: u64) {
        self.sent_packets += 1;
        self.sum_delay_ns += q_delay_ns;
    }

    pub fn record_dequeue_drop(&mut self) {
        self.dequeue_drops += 1;
    }
}

/// Length/credit pair kept per queue (ABE flow, BE flow, service queue).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub length: u64,
    /// Unscaled byte view; for the ABE queue this is `CC_abe >> SHIFT`.
    pub credit: u64,
}

/// Single fixed-shape stats snapshot, matching the qdisc's dump payload.
/// Both the binary TLV dump (§6) and the CLI's `--json` output are built
/// from this one struct so they can never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub rate_bytes_per_sec: u64,
    pub s_b: u64,
    pub s_t: u64,
    pub abe_stats: ClassStats,
    pub be_stats: ClassStats,
    pub all_stats: ClassStats,
    pub abe_queue_stats: QueueStats,
    pub be_queue_stats: QueueStats,
    pub service_queue_stats: QueueStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_stats_tracks_counts_and_delay() {
        let mut c = ClassStats::default();
        c.record_enqueue();
        c.record_dequeue(500);
        c.record_dequeue(1500);
        c.record_enqueue_drop();
        c.record_dequeue_drop();

        assert_eq!(c.received_packets, 1);
        assert_eq!(c.sent_packets, 2);
        assert_eq!(c.sum_delay_ns, 2000);
        assert_eq!(c.enqueue_drops, 1);
        assert_eq!(c.dequeue_drops, 1);
    }

    #[test]
    fn json_round_trip_preserves_all_fields() {
        let mut snap = StatsSnapshot {
            rate_bytes_per_sec: 1_000_000,
            s_b: 42,
            s_t: 84,
            ..Default::default()
        };
        snap.abe_stats.received_packets = 7;
        snap.service_queue_stats.credit = 99;

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"rate_bytes_per_sec\":1000000"));

        let round_tripped: StatsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, snap);
    }

    #[test]
    fn default_snapshot_is_all_zero() {
        let snap = StatsSnapshot::default();
        assert_eq!(snap.rate_bytes_per_sec, 0);
        assert_eq!(snap.abe_stats, ClassStats::default());
        assert_eq!(snap.service_queue_stats, QueueStats::default());
    }
}
