use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::stats::{ClassStats, QueueStats, StatsSnapshot};

/// Fixed size of the binary stats dump: 24 `u64` fields, 8 bytes each.
pub const WIRE_SIZE: usize = 24 * 8;

impl StatsSnapshot {
    /// Serializes to the fixed-layout binary record described in §6:
    /// `C, S_b, S_t, abe_stats, be_stats, all_stats, abe_q_stats, be_q_stats,
    /// service_q_stats`, all big-endian `u64`.
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(WIRE_SIZE);
        buf.put_u64(self.rate_bytes_per_sec);
        buf.put_u64(self.s_b);
        buf.put_u64(self.s_t);
        put_class_stats(&mut buf, &self.abe_stats);
        put_class_stats(&mut buf, &self.be_stats);
        put_class_stats(&mut buf, &self.all_stats);
        put_queue_stats(&mut buf, &self.abe_queue_stats);
        put_queue_stats(&mut buf, &self.be_queue_stats);
        put_queue_stats(&mut buf, &self.service_queue_stats);
        buf.freeze()
    }

    pub fn from_wire(mut buf: Bytes) -> Option<Self> {
        if buf.len() != WIRE_SIZE {
            return None;
        }
        Some(StatsSnapshot {
            rate_bytes_per_sec: buf.get_u64(),
            s_b: buf.get_u64(),
            s_t: buf.get_u64(),
            abe_stats: get_class_stats(&mut buf),
            be_stats: get_class_stats(&mut buf),
            all_stats: get_class_stats(&mut buf),
            abe_queue_stats: get_queue_stats(&mut buf),
            be_queue_stats: get_queue_stats(&mut buf),
            service_queue_stats: get_queue_stats(&mut buf),
        })
    }
}

fn put_class_stats(buf: &mut BytesMut, stats: &ClassStats) {
    buf.put_u64(stats.sum_delay_ns);
    buf.put_u64(stats.received_packets);
    buf.put_u64(stats.sent_packets);
    buf.put_u64(stats.enqueue_drops);
    buf.put_u64(stats.dequeue_drops);
}

fn get_class_stats(buf: &mut Bytes) -> ClassStats {
    ClassStats {
        sum_delay_ns: buf.get_u64(),
        received_packets: buf.get_u64(),
        sent_packets: buf.get_u64(),
        enqueue_drops: buf.get_u64(),
        dequeue_drops: buf.get_u64(),
    }
}

fn put_queue_stats(buf: &mut BytesMut, stats: &QueueStats) {
    buf.put_u64(stats.length);
    buf.put_u64(stats.credit);
}

fn get_queue_stats(buf: &mut Bytes) -> QueueStats {
    QueueStats {
        length: buf.get_u64(),
        credit: buf.get_u64(),
    }
}
