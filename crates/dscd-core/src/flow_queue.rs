use std::collections::VecDeque;

use crate::packet::Packet;

/// A packet sitting in a [`FlowQueue`], stamped with the time it entered.
///
/// `q_time` is the scheduler-owned field the spec calls a "settable per-packet
/// field"; rather than requiring `P` itself to expose mutable scheduler state,
/// the queue wraps each packet in this entry.
struct Entry<P> {
    packet: P,
    q_time: u64,
}

/// FIFO of packets belonging to a single traffic class.
///
/// O(1) push-tail / pop-head via a `VecDeque`; `len_pkts` and `size_bytes` are
/// maintained incrementally so the admission and selection paths never need
/// to walk the queue.
pub struct FlowQueue<P> {
    entries: VecDeque<Entry<P>>,
    size_bytes: u64,
}

impl<P: Packet> FlowQueue<P> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            size_bytes: 0,
        }
    }

    pub fn push_tail(&mut self, packet: P, q_time: u64) {
        self.size_bytes += packet.len() as u64;
        self.entries.push_back(Entry { packet, q_time });
    }

    /// Pops the head packet, returning it without its `q_time` stamp.
    pub fn pop_head(&mut self) -> Option<P> {
        self.pop_head_with_time().map(|(p, _)| p)
    }

    pub fn pop_head_with_time(&mut self) -> Option<(P, u64)> {
        let entry = self.entries.pop_front()?;
        self.size_bytes -= entry.packet.len() as u64;
        Some((entry.packet, entry.q_time))
    }

    pub fn peek_head(&self) -> Option<&P> {
        self.entries.front().map(|e| &e.packet)
    }

    pub fn peek_head_q_time(&self) -> Option<u64> {
        self.entries.front().map(|e| e.q_time)
    }

    pub fn len_pkts(&self) -> usize {
        self.entries.len()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) {
        self.entries.clear();
        self.size_bytes = 0;
    }
}

impl<P: Packet> Default for FlowQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}
