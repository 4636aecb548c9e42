//! Control tool for the DSCD qdisc.
//!
//! Stands in for the out-of-scope kernel control tool described in
//! SPEC_FULL.md §6: encodes/decodes the TLV control attributes and prints
//! the binary stats dump, plus a `sim` command that drives an in-process
//! scheduler over a scripted scenario for local experimentation.

mod attrs;
mod printer;
mod sim;

use std::fs;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attrs::AttrArgs;
use dscd_core::protocol::attr::{decode_attrs, encode_attrs};
use dscd_core::StatsSnapshot;

#[derive(Parser, Debug)]
#[command(name = "dscd-cli", about = "Control tool for the DSCD qdisc")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode control attributes to a hex-printed TLV blob.
    Encode(AttrArgs),

    /// Decode a hex-printed TLV blob and print it.
    Decode {
        /// Hex-encoded bytes (as produced by `encode` or a `dump`).
        hex: String,

        /// Interpret the bytes as a fixed-layout stats dump rather than a
        /// control-attribute TLV blob.
        #[arg(long)]
        stats: bool,

        /// Print as JSON instead of the human-readable table/list.
        #[arg(long)]
        json: bool,
    },

    /// Run a scripted enqueue/dequeue scenario and print the resulting stats.
    Sim {
        /// Path to a JSON scenario file (see `sim::Scenario`).
        scenario: String,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode(attrs) => {
            let input = attrs.into();
            let encoded = encode_attrs(&input);
            tracing::info!(bytes = encoded.len(), "encoded control attributes");
            println!("{}", hex_encode(&encoded));
        }
        Command::Decode { hex, stats, json } => {
            let bytes = hex_decode(&hex)?;
            if stats {
                let snapshot = StatsSnapshot::from_wire(bytes)
                    .ok_or_else(|| anyhow::anyhow!("malformed stats dump"))?;
                if json {
                    printer::print_json(&snapshot)?;
                } else {
                    printer::print_human(&snapshot);
                }
            } else {
                let input = decode_attrs(bytes)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&ConfigInputView::from(input))?);
                } else {
                    println!("{:#?}", input);
                }
            }
        }
        Command::Sim { scenario, json } => {
            let text = fs::read_to_string(&scenario)?;
            let parsed: sim::Scenario = serde_json::from_str(&text)?;
            let stats = sim::run(&parsed)?;
            if json {
                printer::print_json(&stats)?;
            } else {
                printer::print_human(&stats);
            }
        }
    }

    Ok(())
}

/// Serde-friendly mirror of `DscdConfigInput` for JSON printing — the core
/// type itself derives `Deserialize` only, since JSON output is a CLI-only
/// concern.
#[derive(serde::Serialize)]
struct ConfigInputView {
    limit: Option<u32>,
    rate: Option<u64>,
    credit_half_life: Option<u64>,
    rate_memory: Option<u64>,
    t_d: Option<u64>,
    t_q: Option<u64>,
}

impl From<dscd_core::DscdConfigInput> for ConfigInputView {
    fn from(input: dscd_core::DscdConfigInput) -> Self {
        Self {
            limit: input.limit,
            rate: input.rate,
            credit_half_life: input.credit_half_life,
            rate_memory: input.rate_memory,
            t_d: input.t_d,
            t_q: input.t_q,
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> anyhow::Result<bytes::Bytes> {
    if s.len() % 2 != 0 {
        anyhow::bail!("hex string must have an even number of digits");
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for chunk in bytes.chunks(2) {
        let pair = std::str::from_utf8(chunk).map_err(|e| anyhow::anyhow!(e))?;
        out.push(u8::from_str_radix(pair, 16)?);
    }
    Ok(bytes::Bytes::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let bytes = vec![0x00, 0x02, 0xab, 0xff];
        let encoded = hex_encode(&bytes);
        assert_eq!(encoded, "0002abff");
        let decoded = hex_decode(&encoded).unwrap();
        assert_eq!(decoded.as_ref(), bytes.as_slice());
    }

    #[test]
    fn odd_length_hex_is_rejected() {
        assert!(hex_decode("abc").is_err());
    }
}
