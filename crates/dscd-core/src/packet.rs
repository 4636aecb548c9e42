/// A network packet handle as seen by the scheduler.
///
/// The scheduler never inspects payload; it only needs a byte length and a
/// class bit, both of which are expected to have been set by upstream
/// classifier logic before the packet reaches `enqueue`.
pub trait Packet {
    /// Length in bytes, as accounted against `limit` and all credit counters.
    fn len(&self) -> u32;

    /// `true` iff this packet belongs to the accelerated best-effort class.
    fn is_abe(&self) -> bool;
}

/// Traffic class a packet (or a service element) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Abe,
    Be,
}

impl Class {
    pub fn of(is_abe: bool) -> Self {
        if is_abe { Class::Abe } else { Class::Be }
    }

    pub fn is_abe(self) -> bool {
        matches!(self, Class::Abe)
    }
}
