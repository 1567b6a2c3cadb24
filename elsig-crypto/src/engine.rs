//! ElGamal signing over `Z_p^*`.
//!
//! - keygen: `x <- [2, p-2]`, `y = g^x mod p`
//! - sign:   `k <- [2, p-2]` with `gcd(k, p-1) = 1`, `r = g^k mod p`,
//!           `s = (h - x*r) * k^-1 mod (p-1)`
//! - verify: `g^h == y^r * r^s (mod p)`
//!
//! The nonce `k` only ever lives on the stack of [`ElGamalEngine::sign`].

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::{debug, trace};

use crate::arith::{is_coprime, mod_inverse, mod_sub, random_in_range};
use crate::digest::MessageDigest;
use crate::error::{Result, SignatureError};
use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::params::DomainParameters;
use crate::signature::Signature;

/// Upper bound on nonce draws per signature. Any group has at least one nonce
/// coprime to `p - 1` in range, so running out means the source is broken.
/// `s = 0` is a valid signature and is returned as is.
pub const MAX_NONCE_DRAWS: usize = 4096;

#[derive(Clone, Debug)]
pub struct ElGamalEngine {
    params: DomainParameters,
}

impl ElGamalEngine {
    pub fn new(params: DomainParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DomainParameters {
        &self.params
    }

    pub fn generate_keypair<R>(&self, rng: &mut R) -> Result<KeyPair>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let x = random_in_range(&BigUint::from(2u32), &self.exponent_high(), rng)?;
        let pair = KeyPair::from_private(&self.params, x)?;
        debug!(bits = self.params.bits(), "generated keypair");
        Ok(pair)
    }

    pub fn sign<R>(&self, private_key: &PrivateKey, digest: &MessageDigest, rng: &mut R) -> Result<Signature>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        self.check_private_key(private_key)?;
        self.check_digest(digest)?;

        let low = BigUint::from(2u32);
        let high = self.exponent_high();
        let order = self.params.order();

        for draw in 1..=MAX_NONCE_DRAWS {
            let k = random_in_range(&low, &high, rng)?;
            if !is_coprime(&k, order) {
                continue;
            }
            let signature = self.sign_with_nonce(private_key, digest, &k)?;
            trace!(draws = draw, "nonce accepted");
            return Ok(signature);
        }
        Err(SignatureError::rng(format!(
            "no usable nonce after {} draws",
            MAX_NONCE_DRAWS
        )))
    }

    /// Signs with a caller-chosen nonce. Only reachable from tests; a fixed
    /// nonce reused across two digests reveals the private key.
    pub(crate) fn sign_with_nonce(
        &self,
        private_key: &PrivateKey,
        digest: &MessageDigest,
        k: &BigUint,
    ) -> Result<Signature> {
        let p = self.params.prime();
        let order = self.params.order();

        let k_inv = mod_inverse(k, order)
            .ok_or_else(|| SignatureError::rng("nonce is not invertible mod p-1"))?;
        let r = self.params.generator().modpow(k, p);
        let xr = (private_key.expose() * &r) % order;
        let s = (mod_sub(digest.value(), &xr, order) * k_inv) % order;
        Ok(Signature::new(r, s))
    }

    /// Never errors: malformed input of any kind is just a failed verification.
    pub fn verify(&self, public_key: &PublicKey, digest: &MessageDigest, signature: &Signature) -> bool {
        let valid = match self.verification_terms(public_key, digest, signature) {
            Some((left, right)) => left == right,
            None => false,
        };
        debug!(valid, "signature verified");
        valid
    }

    /// Both sides of `g^h == y^r * r^s (mod p)`, or `None` when an input is out of range.
    pub fn verification_terms(
        &self,
        public_key: &PublicKey,
        digest: &MessageDigest,
        signature: &Signature,
    ) -> Option<(BigUint, BigUint)> {
        let p = self.params.prime();
        let order = self.params.order();

        let (r, s) = (signature.r(), signature.s());
        if r.is_zero() || r >= p || s >= order {
            trace!("signature components out of range");
            return None;
        }
        if !public_key.in_range(&self.params) || digest.bits() > self.params.bits() {
            trace!("public key or digest out of range");
            return None;
        }

        let left = self.params.generator().modpow(digest.value(), p);
        let right = (public_key.value().modpow(r, p) * r.modpow(s, p)) % p;
        Some((left, right))
    }

    /// `p - 2`, the top of the range for exponents and nonces.
    fn exponent_high(&self) -> BigUint {
        self.params.order() - BigUint::one()
    }

    fn check_private_key(&self, key: &PrivateKey) -> Result<()> {
        let x = key.expose();
        if x < &BigUint::from(2u32) || x > &self.exponent_high() {
            return Err(SignatureError::key("private key must lie in [2, p-2] for this group"));
        }
        Ok(())
    }

    fn check_digest(&self, digest: &MessageDigest) -> Result<()> {
        if digest.bits() > self.params.bits() {
            return Err(SignatureError::digest(format!(
                "digest has {} bits, modulus only {}",
                digest.bits(),
                self.params.bits()
            )));
        }
        Ok(())
    }
}
