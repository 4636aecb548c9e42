//! Dynamic Service-Credit Distribution (DSCD) packet scheduler.
//!
//! A qdisc-style egress scheduler that gives a latency-sensitive ABE
//! (accelerated best-effort) class bounded in-queue delay without starving a
//! bulk BE (best-effort) class, adapting to a drain rate that is either
//! configured or estimated online.
//!
//! Key components:
//! - [`scheduler`] — the enqueue/dequeue state machine, admission control,
//!   and ABE timeout drops
//! - [`credit`] — the scaled credit counters and their linear/exponential
//!   devaluation
//! - [`rate`] — online drain-rate estimation
//! - [`flow_queue`] / [`service_queue`] — the two real queues and the
//!   virtual service queue
//! - [`config`] — sparse input, resolved configuration
//! - [`protocol`] — wire encoding of control attributes and the stats dump
//! - [`runtime`] — a `Mutex`-guarded handle realizing the single-lock
//!   concurrency contract

pub mod config;
pub mod credit;
pub mod error;
pub mod flow_queue;
pub mod packet;
pub mod protocol;
pub mod rate;
pub mod runtime;
pub mod scheduler;
pub mod service_queue;
pub mod stats;

pub use config::{DscdConfig, DscdConfigInput};
pub use error::{ChangeError, EnqueueError};
pub use packet::{Class, Packet};
pub use scheduler::Scheduler;
pub use stats::StatsSnapshot;

/// Installs a default `tracing` subscriber (env-filter based) if no
/// subscriber is already set. Safe to call multiple times — subsequent calls
/// are no-ops. Controlled by `RUST_LOG` (e.g. `RUST_LOG=dscd_core=debug`).
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if tracing::dispatcher::has_been_set() {
            tracing::info!("dscd-core: tracing subscriber already set");
            return;
        }
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_target(true)
            .with_thread_names(true)
            .compact()
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::info!("dscd-core initialized");
        }
    });
}
