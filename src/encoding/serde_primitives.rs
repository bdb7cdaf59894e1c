use num_bigint::BigUint;
use num_traits::Num;
use serde::{self, Deserialize, Deserializer, Serializer};

/// Parses a decimal string, or a hex string when prefixed with `0x`. Underscores are allowed as
/// digit separators.
pub fn parse_biguint(value: &str) -> Result<BigUint, String> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let parsed = match cleaned.strip_prefix("0x") {
        Some(hex_digits) => BigUint::from_str_radix(hex_digits, 16),
        None => BigUint::from_str_radix(&cleaned, 10),
    };
    parsed.map_err(|e| format!("Invalid integer {:?}: {}", value, e))
}

/// Big integers travel as strings so JSON consumers never lose precision.
pub mod biguint_string {
    use super::*;

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_biguint(&s).map_err(serde::de::Error::custom)
    }
}
