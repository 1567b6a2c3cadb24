use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::encoding::{biguint_text, format_biguint, to_fixed_be};
use crate::error::{Result, SignatureError};
use crate::params::DomainParameters;

/// ElGamal signature pair. Well-formed pairs have `r` in `[1, p-1]` and `s` in `[0, p-2]`;
/// anything else simply fails verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "biguint_text")]
    r: BigUint,
    #[serde(with = "biguint_text")]
    s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// `r || s`, each left-padded to the byte width of `p`.
    pub fn to_fixed_bytes(&self, params: &DomainParameters) -> Result<Vec<u8>> {
        let width = params.byte_len();
        let mut out = to_fixed_be(&self.r, width)?;
        out.extend(to_fixed_be(&self.s, width)?);
        Ok(out)
    }

    pub fn from_fixed_bytes(params: &DomainParameters, bytes: &[u8]) -> Result<Self> {
        let width = params.byte_len();
        if bytes.len() != width * 2 {
            return Err(SignatureError::encoding(format!(
                "expected {} signature bytes, got {}",
                width * 2,
                bytes.len()
            )));
        }
        let (r, s) = bytes.split_at(width);
        Ok(Self {
            r: BigUint::from_bytes_be(r),
            s: BigUint::from_bytes_be(s),
        })
    }

    pub fn to_hex(&self, params: &DomainParameters) -> Result<String> {
        Ok(hex::encode(self.to_fixed_bytes(params)?))
    }

    pub fn from_hex(params: &DomainParameters, text: &str) -> Result<Self> {
        Self::from_fixed_bytes(params, &hex::decode(text.trim())?)
    }

    /// `(r, s)` as prefixed hex, for display.
    pub fn display_pair(&self) -> (String, String) {
        (format_biguint(&self.r), format_biguint(&self.s))
    }
}
