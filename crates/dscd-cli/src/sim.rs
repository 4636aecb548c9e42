//! Drives an in-process scheduler over a scripted sequence of timestamped
//! enqueue/dequeue events and reports the resulting stats snapshot. Stands
//! in for the out-of-scope host networking stack so the scheduler can be
//! exercised end-to-end without a real link.

use serde::Deserialize;

use dscd_core::runtime::DscdHandle;
use dscd_core::{DscdConfigInput, Packet, StatsSnapshot};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Event {
    Enqueue { at: u64, len: u32, abe: bool },
    Dequeue { at: u64 },
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Scenario {
    #[serde(default)]
    pub config: DscdConfigInput,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SimPacket {
    len: u32,
    abe: bool,
}

impl Packet for SimPacket {
    fn len(&self) -> u32 {
        self.len
    }
    fn is_abe(&self) -> bool {
        self.abe
    }
}

/// Runs `scenario` to completion and returns the final stats snapshot.
/// Enqueue failures (admission/alloc) are silently counted in the returned
/// snapshot's drop counters, matching the scheduler's own silent-drop
/// semantics (§7) — the scenario runner does not treat them as fatal.
pub fn run(scenario: &Scenario) -> anyhow::Result<StatsSnapshot> {
    let config = scenario.config.resolve()?;
    let handle: DscdHandle<SimPacket> = DscdHandle::new(config);

    for event in &scenario.events {
        match *event {
            Event::Enqueue { at, len, abe } => {
                let _ = handle.enqueue(SimPacket { len, abe }, at);
            }
            Event::Dequeue { at } => {
                let _ = handle.dequeue(at);
            }
        }
    }

    Ok(handle.dump_stats())
}
