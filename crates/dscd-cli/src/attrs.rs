use clap::Args;
use dscd_core::DscdConfigInput;

/// The six control attributes, exposed under their canonical names with the
/// historical `q_dscd.c` spellings accepted as hidden aliases so operators
/// porting old scripts aren't broken (see DESIGN.md).
#[derive(Args, Debug, Clone, Default)]
pub struct AttrArgs {
    /// Admission limit in bytes.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Configured drain rate in bytes/sec; 0 means "estimate online".
    #[arg(long)]
    pub rate: Option<u64>,

    /// Exponential decay half-life for ABE credit, in nanoseconds.
    #[arg(long, visible_alias = "halftime")]
    pub credit_half_life: Option<u64>,

    /// Exponential memory of the rate estimator, in nanoseconds.
    #[arg(long)]
    pub rate_memory: Option<u64>,

    /// ABE head-of-line delay threshold, in nanoseconds.
    #[arg(long = "t-d", visible_alias = "dmax-abe")]
    pub t_d: Option<u64>,

    /// ABE queue length below which timeout drops are suppressed.
    #[arg(long = "t-q", visible_alias = "abe-drop-threshold")]
    pub t_q: Option<u64>,
}

impl From<AttrArgs> for DscdConfigInput {
    fn from(args: AttrArgs) -> Self {
        DscdConfigInput {
            limit: args.limit,
            rate: args.rate,
            credit_half_life: args.credit_half_life,
            rate_memory: args.rate_memory,
            t_d: args.t_d,
            t_q: args.t_q,
        }
    }
}
