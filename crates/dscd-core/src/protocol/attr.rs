use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::DscdConfigInput;
use crate::error::ChangeError;

/// Attribute IDs, numbered to match the original `TCA_DSCD_*` enum (which
/// reserves 0 for UNSPEC and 1 for a padding attribute neither of which this
/// crate needs to encode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
enum AttrId {
    Limit = 2,
    Rate = 3,
    CreditHalfLife = 4,
    RateMemory = 5,
    TD = 6,
    TQ = 7,
}

impl AttrId {
    fn from_u16(id: u16) -> Option<Self> {
        match id {
            2 => Some(Self::Limit),
            3 => Some(Self::Rate),
            4 => Some(Self::CreditHalfLife),
            5 => Some(Self::RateMemory),
            6 => Some(Self::TD),
            7 => Some(Self::TQ),
            _ => None,
        }
    }

    /// Value width in bytes: `LIMIT` is a `u32`, everything else a `u64`.
    fn value_len(self) -> usize {
        match self {
            AttrId::Limit => 4,
            _ => 8,
        }
    }
}

/// Encodes the set fields of `input` as a concatenation of TLV records:
/// `u16` id, `u16` length, big-endian value.
pub fn encode_attrs(input: &DscdConfigInput) -> Bytes {
    let mut buf = BytesMut::new();
    if let Some(v) = input.limit {
        put_attr_u32(&mut buf, AttrId::Limit, v);
    }
    if let Some(v) = input.rate {
        put_attr_u64(&mut buf, AttrId::Rate, v);
    }
    if let Some(v) = input.credit_half_life {
        put_attr_u64(&mut buf, AttrId::CreditHalfLife, v);
    }
    if let Some(v) = input.rate_memory {
        put_attr_u64(&mut buf, AttrId::RateMemory, v);
    }
    if let Some(v) = input.t_d {
        put_attr_u64(&mut buf, AttrId::TD, v);
    }
    if let Some(v) = input.t_q {
        put_attr_u64(&mut buf, AttrId::TQ, v);
    }
    buf.freeze()
}

fn put_attr_u32(buf: &mut BytesMut, id: AttrId, value: u32) {
    buf.put_u16(id as u16);
    buf.put_u16(4);
    buf.put_u32(value);
}

fn put_attr_u64(buf: &mut BytesMut, id: AttrId, value: u64) {
    buf.put_u16(id as u16);
    buf.put_u16(8);
    buf.put_u64(value);
}

/// Decodes a concatenation of TLV records into a sparse config set. Rejects
/// (as [`ChangeError::InvalidConfig`]) any unknown attribute ID, any record
/// whose declared length doesn't match the width expected for its ID, and
/// any truncated trailing record.
pub fn decode_attrs(mut buf: Bytes) -> Result<DscdConfigInput, ChangeError> {
    let mut input = DscdConfigInput::default();

    while buf.has_remaining() {
        if buf.remaining() < 4 {
            return Err(ChangeError::InvalidConfig(
                "truncated attribute header".into(),
            ));
        }
        let id = buf.get_u16();
        let len = buf.get_u16() as usize;

        let attr = AttrId::from_u16(id)
            .ok_or_else(|| ChangeError::InvalidConfig(format!("unknown attribute id {id}")))?;
        if len != attr.value_len() {
            return Err(ChangeError::InvalidConfig(format!(
                "attribute {id} has wrong length {len}"
            )));
        }
        if buf.remaining() < len {
            return Err(ChangeError::InvalidConfig(
                "truncated attribute value".into(),
            ));
        }

        match attr {
            AttrId::Limit => input.limit = Some(buf.get_u32()),
            AttrId::Rate => input.rate = Some(buf.get_u64()),
            AttrId::CreditHalfLife => input.credit_half_life = Some(buf.get_u64()),
            AttrId::RateMemory => input.rate_memory = Some(buf.get_u64()),
            AttrId::TD => input.t_d = Some(buf.get_u64()),
            AttrId::TQ => input.t_q = Some(buf.get_u64()),
        }
    }

    Ok(input)
}
