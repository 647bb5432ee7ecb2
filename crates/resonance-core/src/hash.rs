//! Word encoding and the one-way hash (SHA-256).

use primitive_types::U256;
use sha2::{Digest, Sha256};

use crate::constants::{DOMAIN_TAG, VERSION_TAG};
use crate::error::{CalcError, CalcResult};

const HALF_BITS: usize = 128;

/// 32-byte big-endian encoding.
pub fn to_be_bytes(value: U256) -> [u8; 32] {
    value.to_big_endian()
}

pub fn from_be_bytes(bytes: &[u8; 32]) -> U256 {
    U256::from_big_endian(bytes)
}

/// SHA-256 of `data`, read as a big-endian word.
pub fn hash_bytes(data: &[u8]) -> U256 {
    let digest = Sha256::digest(data);
    U256::from_big_endian(digest.as_slice())
}

pub fn hash_value(value: U256) -> U256 {
    hash_bytes(&to_be_bytes(value))
}

pub fn hash_pair(a: U256, b: U256) -> U256 {
    hash_bytes(&encode_packed(&[a, b]))
}

/// Words laid end to end, 32 bytes each.
pub fn encode_packed(values: &[U256]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 32);
    for &v in values {
        out.extend_from_slice(&to_be_bytes(v));
    }
    out
}

/// `hi` in the upper 128 bits, `lo` in the lower. Either half wider than
/// 128 bits is an overflow.
pub fn pack_halves(hi: U256, lo: U256) -> CalcResult<U256> {
    if hi.bits() > HALF_BITS || lo.bits() > HALF_BITS {
        return Err(CalcError::ArithmeticOverflow);
    }
    Ok((hi << HALF_BITS) | lo)
}

pub fn unpack_halves(value: U256) -> (U256, U256) {
    (value >> HALF_BITS, U256([value.0[0], value.0[1], 0, 0]))
}

pub fn domain_id() -> U256 {
    hash_bytes(DOMAIN_TAG.as_bytes())
}

pub fn version_id() -> U256 {
    hash_bytes(VERSION_TAG.as_bytes())
}
