//! Wire encoding for the control interface: TLV-encoded configuration
//! attributes in, a fixed-layout binary stats record out.

pub mod attr;
pub mod dump;
