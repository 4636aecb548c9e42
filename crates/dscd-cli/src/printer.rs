use dscd_core::StatsSnapshot;

/// Renders the bytes/sec rate the way the historical tool's `sprint_rate`
/// helper did: alongside a bits/sec figure for operators used to link-speed
/// units. The wire protocol and `--json` output always stay in bytes/sec
/// (see SPEC_FULL.md §9) — this conversion is display-only.
fn sprint_rate(bytes_per_sec: u64) -> String {
    let bits_per_sec = bytes_per_sec.saturating_mul(8);
    format!("{bytes_per_sec} B/s ({bits_per_sec} bit/s)")
}

/// Human-readable stats table, grounded on the original tool's per-class and
/// per-queue tabular printer.
pub fn print_human(stats: &StatsSnapshot) {
    println!("rate: {}", sprint_rate(stats.rate_bytes_per_sec));
    println!("S_b: {}  S_t: {}", stats.s_b, stats.s_t);
    println!();
    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>12} {:>12}",
        "class", "recv", "sent", "sum_delay", "enq_drops", "deq_drops"
    );
    for (name, c) in [
        ("abe", &stats.abe_stats),
        ("be", &stats.be_stats),
        ("all", &stats.all_stats),
    ] {
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>12} {:>12}",
            name, c.received_packets, c.sent_packets, c.sum_delay_ns, c.enqueue_drops, c.dequeue_drops
        );
    }
    println!();
    println!("{:<8} {:>10} {:>10}", "queue", "length", "credit");
    for (name, q) in [
        ("abe", &stats.abe_queue_stats),
        ("be", &stats.be_queue_stats),
        ("service", &stats.service_queue_stats),
    ] {
        println!("{:<8} {:>10} {:>10}", name, q.length, q.credit);
    }
}

pub fn print_json(stats: &StatsSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}
