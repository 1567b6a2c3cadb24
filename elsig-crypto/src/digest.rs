//! Message digests as integers, plus adapters for the hash functions we ship.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use md5::Md5;
use sha2::{Digest as _, Sha256, Sha512};

use crate::encoding::format_biguint;
use crate::error::{Result, SignatureError};

/// Hash output read as a big-endian unsigned integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDigest(BigUint);

impl MessageDigest {
    pub fn from_bytes_be(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(SignatureError::digest("digest has no bytes"));
        }
        Ok(Self(BigUint::from_bytes_be(bytes)))
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn bits(&self) -> u64 {
        self.0.bits()
    }
}

impl From<BigUint> for MessageDigest {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for MessageDigest {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_biguint(&self.0))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Blake3,
    /// Broken for collision resistance. Kept so older demo runs can be reproduced;
    /// never the default.
    Md5,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Blake3,
        HashAlgorithm::Md5,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Md5 => "md5",
        }
    }

    pub fn output_bits(self) -> u64 {
        match self {
            HashAlgorithm::Sha256 | HashAlgorithm::Blake3 => 256,
            HashAlgorithm::Sha512 => 512,
            HashAlgorithm::Md5 => 128,
        }
    }

    pub fn hash(self, message: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(message).to_vec(),
            HashAlgorithm::Blake3 => blake3::hash(message).as_bytes().to_vec(),
            HashAlgorithm::Md5 => Md5::digest(message).to_vec(),
        }
    }

    pub fn digest(self, message: &[u8]) -> MessageDigest {
        MessageDigest(BigUint::from_bytes_be(&self.hash(message)))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self> {
        HashAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SignatureError::encoding(format!("unknown hash algorithm: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_digest_is_big_endian() {
        let d = HashAlgorithm::Sha256.digest(b"abc");
        assert_eq!(
            d.value().to_str_radix(16),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_width_matches_algorithm() {
        for alg in HashAlgorithm::ALL {
            assert_eq!(alg.hash(b"message").len() as u64 * 8, alg.output_bits());
            assert!(alg.digest(b"message").bits() <= alg.output_bits());
        }
    }

    #[test]
    fn parses_algorithm_names() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert_eq!("md5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert!(matches!(
            "sha1".parse::<HashAlgorithm>(),
            Err(SignatureError::Encoding(_))
        ));
    }

    #[test]
    fn md5_is_available_but_not_default() {
        let d = HashAlgorithm::Md5.digest(b"abc");
        assert_eq!(d.value().to_str_radix(16), "900150983cd24fb0d6963f7d28e17f72");
        assert_ne!(HashAlgorithm::default(), HashAlgorithm::Md5);
    }

    #[test]
    fn empty_digest_bytes_rejected() {
        assert!(MessageDigest::from_bytes_be(&[]).is_err());
        assert_eq!(MessageDigest::from_bytes_be(&[0, 1]).unwrap().value(), &BigUint::from(1u32));
    }
}
