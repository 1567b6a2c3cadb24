//! Domain parameters `(p, g)` and the policy they are validated against.

use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arith::is_probable_prime;
use crate::encoding::biguint_text;
use crate::error::{Result, SignatureError};

pub const DEFAULT_MIN_PRIME_BITS: u64 = 2048;
pub const DEFAULT_PRIMALITY_ROUNDS: u32 = 40;

/// How strictly a candidate `(p, g)` is checked before it is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterPolicy {
    pub min_prime_bits: u64,
    /// Miller–Rabin witnesses per primality test.
    pub primality_rounds: u32,
    /// Also require `(p - 1) / 2` to be prime.
    pub require_safe_prime: bool,
}

impl Default for ParameterPolicy {
    fn default() -> Self {
        Self {
            min_prime_bits: DEFAULT_MIN_PRIME_BITS,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
            require_safe_prime: false,
        }
    }
}

/// Unvalidated parameters as read from a file or the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(with = "biguint_text")]
    pub prime: BigUint,
    #[serde(with = "biguint_text")]
    pub generator: BigUint,
}

impl ParameterSpec {
    pub fn validate(self, policy: &ParameterPolicy) -> Result<DomainParameters> {
        DomainParameters::new(self.prime, self.generator, policy)
    }
}

/// Validated group description. Only obtainable through [`DomainParameters::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DomainParameters {
    #[serde(with = "biguint_text")]
    prime: BigUint,
    #[serde(with = "biguint_text")]
    generator: BigUint,
    #[serde(skip)]
    order: BigUint,
}

impl DomainParameters {
    /// Validates `(prime, generator)`, drawing Miller–Rabin witnesses from the thread RNG.
    pub fn new(prime: BigUint, generator: BigUint, policy: &ParameterPolicy) -> Result<Self> {
        Self::new_with_rng(prime, generator, policy, &mut rand::thread_rng())
    }

    pub fn new_with_rng<R>(
        prime: BigUint,
        generator: BigUint,
        policy: &ParameterPolicy,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let bits = prime.bits();
        if bits < policy.min_prime_bits {
            return Err(SignatureError::parameters(format!(
                "modulus has {} bits, policy requires at least {}",
                bits, policy.min_prime_bits
            )));
        }
        if !prime.bit(0) {
            return Err(SignatureError::parameters("modulus must be odd"));
        }
        if generator <= BigUint::one() || generator >= prime {
            return Err(SignatureError::parameters("generator must satisfy 1 < g < p"));
        }
        if !is_probable_prime(&prime, policy.primality_rounds, rng)? {
            return Err(SignatureError::parameters("modulus is not prime"));
        }
        let order = &prime - BigUint::one();
        if policy.require_safe_prime {
            let q = &order >> 1u32;
            if !is_probable_prime(&q, policy.primality_rounds, rng)? {
                return Err(SignatureError::parameters("modulus is not a safe prime"));
            }
        }
        debug!(
            bits,
            rounds = policy.primality_rounds,
            safe_prime_checked = policy.require_safe_prime,
            "domain parameters accepted"
        );
        Ok(Self {
            prime,
            generator,
            order,
        })
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// `p - 1`, the modulus for exponents and for `s`.
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    pub fn bits(&self) -> u64 {
        self.prime.bits()
    }

    /// Bytes needed to hold any residue mod `p`.
    pub fn byte_len(&self) -> usize {
        self.prime.bits().div_ceil(8) as usize
    }

    /// Short blake3 tag of `(p, g)`, used to tie stored keys to their group.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.prime.to_bytes_be());
        hasher.update(&[0u8]);
        hasher.update(&self.generator.to_bytes_be());
        hex::encode(&hasher.finalize().as_bytes()[..8])
    }

    pub fn to_spec(&self) -> ParameterSpec {
        ParameterSpec {
            prime: self.prime.clone(),
            generator: self.generator.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::encoding::parse_biguint;

    /// Policy that lets toy groups through; never use outside tests.
    pub fn toy_policy() -> ParameterPolicy {
        ParameterPolicy {
            min_prime_bits: 8,
            primality_rounds: 20,
            require_safe_prime: false,
        }
    }

    /// p = 467, g = 2.
    pub fn tiny() -> DomainParameters {
        DomainParameters::new(BigUint::from(467u32), BigUint::from(2u32), &toy_policy()).unwrap()
    }

    /// 256-bit safe prime with primitive root 5.
    pub fn medium() -> DomainParameters {
        let p = parse_biguint("0xc998ff967972196995c8de6284b5bf11a36ae4d26bd3767468e33bd0e61a5a7f")
            .unwrap();
        DomainParameters::new(p, BigUint::from(5u32), &toy_policy()).unwrap()
    }

    /// RFC 7919 ffdhe2048 prime.
    pub const FFDHE2048_HEX: &str = "0xffffffffffffffffadf85458a2bb4a9aafdc5620273d3cf1d8b9c583ce2d3695a9e13641146433fbcc939dce249b3ef97d2fe363630c75d8f681b202aec4617ad3df1ed5d5fd65612433f51f5f066ed0856365553ded1af3b557135e7f57c935984f0c70e0e68b77e2a689daf3efe8721df158a136ade73530acca4f483a797abc0ab182b324fb61d108a94bb2c8e3fbb96adab760d7f4681d4f42a3de394df4ae56ede76372bb190b07a7c8ee0a6d709e02fce1cdf7e2ecc03404cd28342f619172fe9ce98583ff8e4f1232eef28183c3fe3b1b4c6fad733bb5fcbc2ec22005c58ef1837d1683b2c6f34a26c1b2effa886b423861285c97ffffffffffffffff";
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::encoding::parse_biguint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn accepts_small_prime_under_toy_policy() {
        let params = tiny();
        assert_eq!(params.order(), &BigUint::from(466u32));
        assert_eq!(params.byte_len(), 2);
    }

    #[test]
    fn default_policy_rejects_short_modulus() {
        let err = DomainParameters::new(
            BigUint::from(467u32),
            BigUint::from(2u32),
            &ParameterPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SignatureError::InvalidParameters(_)));
    }

    #[test]
    fn rejects_composite_and_even_moduli() {
        for p in [561u32, 465, 468] {
            let err = DomainParameters::new(BigUint::from(p), BigUint::from(2u32), &toy_policy())
                .unwrap_err();
            assert!(matches!(err, SignatureError::InvalidParameters(_)), "{p}");
        }
    }

    #[test]
    fn rejects_generator_out_of_range() {
        for g in [0u32, 1, 467, 500] {
            let err = DomainParameters::new(BigUint::from(467u32), BigUint::from(g), &toy_policy())
                .unwrap_err();
            assert!(matches!(err, SignatureError::InvalidParameters(_)), "{g}");
        }
    }

    #[test]
    fn safe_prime_requirement() {
        let policy = ParameterPolicy {
            require_safe_prime: true,
            ..toy_policy()
        };
        // 467 = 2 * 233 + 1
        assert!(DomainParameters::new(BigUint::from(467u32), BigUint::from(2u32), &policy).is_ok());
        // 461 - 1 = 4 * 115
        let err = DomainParameters::new(BigUint::from(461u32), BigUint::from(2u32), &policy)
            .unwrap_err();
        assert!(matches!(err, SignatureError::InvalidParameters(_)));
    }

    #[test]
    fn published_2048_bit_group_passes_default_policy() {
        let mut rng = StdRng::seed_from_u64(2048);
        let policy = ParameterPolicy {
            primality_rounds: 4,
            require_safe_prime: true,
            ..ParameterPolicy::default()
        };
        let p = parse_biguint(FFDHE2048_HEX).unwrap();
        let params = DomainParameters::new_with_rng(p, BigUint::from(2u32), &policy, &mut rng).unwrap();
        assert_eq!(params.bits(), 2048);
        assert_eq!(params.byte_len(), 256);
    }

    #[test]
    fn fingerprint_depends_on_both_values() {
        let a = tiny();
        let b = DomainParameters::new(BigUint::from(467u32), BigUint::from(5u32), &toy_policy()).unwrap();
        assert_eq!(a.fingerprint(), tiny().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 16);
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec: ParameterSpec =
            serde_json::from_str(r#"{ "prime": "467", "generator": "0x2" }"#).unwrap();
        let params = spec.validate(&toy_policy()).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"prime":"0x1d3","generator":"0x2"}"#);
        let back: ParameterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params.to_spec());
    }
}
