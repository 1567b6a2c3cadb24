//! Text and fixed-width byte encodings for big integers.
//!
//! Text form is `0x`-prefixed lowercase hex. Parsing also accepts plain
//! decimal, which is how published parameters are often written down.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{Result, SignatureError};

pub fn format_biguint(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

pub fn parse_biguint(text: &str) -> Result<BigUint> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace() && *c != '_').collect();
    let (digits, radix) = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (cleaned.as_str(), 10),
    };
    if digits.is_empty() {
        return Err(SignatureError::encoding("empty integer literal"));
    }
    BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| SignatureError::encoding(format!("not a base-{} integer: {}", radix, text)))
}

/// Big-endian bytes left-padded to `width`. Fails if the value needs more room.
pub fn to_fixed_be(value: &BigUint, width: usize) -> Result<Vec<u8>> {
    if value.is_zero() {
        return Ok(vec![0u8; width]);
    }
    let raw = value.to_bytes_be();
    if raw.len() > width {
        return Err(SignatureError::encoding(format!(
            "value needs {} bytes, field holds {}",
            raw.len(),
            width
        )));
    }
    let mut out = vec![0u8; width - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

/// `#[serde(with = "elsig_crypto::encoding::biguint_text")]`
pub mod biguint_text {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_biguint(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_biguint(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_biguint("0x1d3").unwrap(), BigUint::from(467u32));
        assert_eq!(parse_biguint("0X1D3").unwrap(), BigUint::from(467u32));
        assert_eq!(parse_biguint("467").unwrap(), BigUint::from(467u32));
        assert_eq!(parse_biguint(" 1_000 ").unwrap(), BigUint::from(1000u32));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_biguint("").is_err());
        assert!(parse_biguint("0x").is_err());
        assert!(parse_biguint("12ab").is_err());
        assert!(parse_biguint("-5").is_err());
    }

    #[test]
    fn text_form_is_prefixed_hex() {
        assert_eq!(format_biguint(&BigUint::from(467u32)), "0x1d3");
        assert_eq!(format_biguint(&BigUint::zero()), "0x0");
    }

    #[test]
    fn fixed_width_pads_and_refuses_overflow() {
        assert_eq!(to_fixed_be(&BigUint::from(0x1d3u32), 4).unwrap(), vec![0, 0, 1, 0xd3]);
        assert_eq!(to_fixed_be(&BigUint::zero(), 2).unwrap(), vec![0, 0]);
        assert!(to_fixed_be(&BigUint::from(0x10000u32), 2).is_err());
    }
}
