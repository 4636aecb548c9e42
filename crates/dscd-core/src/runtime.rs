//! A thin `Mutex` wrapper realizing the single-lock concurrency contract of
//! §5: the host stack is expected to hold one lock across `enqueue`,
//! `dequeue`, `reset`, `change`, `dump`/`dump_stats`, and `destroy`. This is
//! deliberately not a channel-and-worker-thread runtime — the scheduler
//! never suspends or performs I/O, so there is nothing for a background
//! thread to buy here; the lock just needs to exist and be held for short,
//! non-suspending critical sections.

use std::sync::Mutex;

use crate::config::{DscdConfig, DscdConfigInput};
use crate::error::{ChangeError, EnqueueError};
use crate::packet::Packet;
use crate::protocol::attr::{decode_attrs, encode_attrs};
use crate::scheduler::Scheduler;
use crate::stats::StatsSnapshot;

/// Owns a [`Scheduler`] behind a `Mutex`, exposing the same operations as
/// short, non-suspending critical sections.
pub struct DscdHandle<P> {
    inner: Mutex<Scheduler<P>>,
}

impl<P: Packet> DscdHandle<P> {
    pub fn new(config: DscdConfig) -> Self {
        Self {
            inner: Mutex::new(Scheduler::new(config)),
        }
    }

    /// Loads a fully-resolved configuration from a TOML string and builds a
    /// handle from it.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config = DscdConfigInput::from_toml_str(s)?.resolve()?;
        Ok(Self::new(config))
    }

    pub fn enqueue(&self, packet: P, now: u64) -> Result<(), (P, EnqueueError)> {
        self.inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .enqueue(packet, now)
    }

    pub fn dequeue(&self, now: u64) -> Option<P> {
        self.inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .dequeue(now)
    }

    pub fn reset(&self) {
        self.inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .reset();
    }

    /// Applies a sparse config change, merged onto the live configuration.
    ///
    /// The `T_q`/`T_d` cross-field rule is checked against `input` itself,
    /// before merging: once merged onto the live config, `t_q` would always
    /// read as `Some` (inherited from the base), hiding a request that set
    /// `t_d` without `t_q`.
    pub fn change(&self, input: &DscdConfigInput) -> Result<(), ChangeError> {
        input.validate_t_q_t_d()?;
        let mut guard = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        let merged = input.merged_onto(guard.config()).resolve()?;
        guard.apply_config(merged);
        Ok(())
    }

    /// Applies a sparse config change encoded as TLV control attributes
    /// (§6), as would arrive over the wire from the control tool.
    pub fn change_from_wire(&self, attrs: bytes::Bytes) -> Result<(), ChangeError> {
        let input = decode_attrs(attrs)?;
        self.change(&input)
    }

    /// Encodes the live configuration's set fields back out as TLV
    /// attributes, for round-tripping through the control tool.
    pub fn dump_config_wire(&self) -> bytes::Bytes {
        let guard = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        let config = *guard.config();
        encode_attrs(&DscdConfigInput {
            limit: Some(config.limit),
            rate: Some(config.rate_config),
            credit_half_life: Some(config.credit_half_life),
            rate_memory: Some(config.rate_memory),
            t_d: Some(config.t_d),
            t_q: Some(config.t_q),
        })
    }

    pub fn dump_stats(&self) -> StatsSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .snapshot()
    }

    /// Frees the service queue only. Callers must have already purged both
    /// flow queues via `reset` — the scheduler does not re-check that here,
    /// matching the host-stack contract in §4.5. Unlike `reset`, credit
    /// counters and stats survive, so a stats dump taken right after
    /// `destroy` still reports the live counters at teardown.
    pub fn destroy(&self) {
        self.inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .destroy();
    }
}
