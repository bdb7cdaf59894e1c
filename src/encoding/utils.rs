use std::str::FromStr;

use alloy_primitives::{Address, FixedBytes};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::encoding::{constants::TICK_WIDTH, errors::EncodingError};

/// Parses a hex encoded address, with or without the `0x` prefix.
pub fn parse_address(address: &str) -> Result<Address, EncodingError> {
    Address::from_str(address.trim())
        .map_err(|_| EncodingError::InvalidAddress(format!("Malformed address: {:?}", address)))
}

/// Safely converts a byte slice to an `Address`.
///
/// Checks the length before attempting to convert, and returns an `EncodingError` if not 20 bytes
/// long.
pub fn bytes_to_address(address: &[u8]) -> Result<Address, EncodingError> {
    if address.len() == 20 {
        Ok(Address::from_slice(address))
    } else {
        Err(EncodingError::InvalidAddress(format!(
            "Invalid address bytes: 0x{}",
            hex::encode(address)
        )))
    }
}

/// Converts a 128 bit operand, failing instead of truncating when the value is wider.
pub fn biguint_to_u128(value: &BigUint, field: &'static str) -> Result<u128, EncodingError> {
    value
        .to_u128()
        .ok_or(EncodingError::OperandOutOfRange { field, bits: 128 })
}

/// Price helper for callers that think in whole tokens: `whole * 10^decimals`.
pub fn scale_amount(whole: u64, decimals: u32) -> BigUint {
    BigUint::from(whole) * BigUint::from(10u32).pow(decimals)
}

/// Writes `value` as an `N` byte big-endian unsigned integer. `N` is at most 8.
pub fn uint_to_fixed<const N: usize>(
    value: u64,
    field: &'static str,
) -> Result<FixedBytes<N>, EncodingError> {
    let bits = N * 8;
    if N == 0 || N > 8 || (bits < 64 && value >> bits != 0) {
        return Err(EncodingError::OperandOutOfRange { field, bits });
    }
    Ok(FixedBytes::from_slice(&value.to_be_bytes()[8 - N..]))
}

/// Reads an unsigned big-endian integer of at most 8 bytes.
pub fn fixed_to_uint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | *byte as u64)
}

/// Writes a tick as 24 bit two's complement. The caller guarantees the tick is within
/// `[MIN_TICK, MAX_TICK]`, which fits 24 bits.
pub fn tick_to_fixed(tick: i32) -> FixedBytes<TICK_WIDTH> {
    FixedBytes::from_slice(&tick.to_be_bytes()[1..])
}

/// Sign extends a 24 bit two's complement tick.
pub fn fixed_to_tick(bytes: [u8; TICK_WIDTH]) -> i32 {
    let sign = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    i32::from_be_bytes([sign, bytes[0], bytes[1], bytes[2]])
}
