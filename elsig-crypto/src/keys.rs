use std::fmt;

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::encoding::{biguint_text, format_biguint};
use crate::error::{Result, SignatureError};
use crate::params::DomainParameters;

/// Signing exponent `x` with `2 <= x <= p - 2`.
///
/// `Debug` never prints the value and there is no serde impl;
/// use [`PrivateKey::expose`] where a keystore needs the raw integer.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(BigUint);

impl PrivateKey {
    pub fn new(params: &DomainParameters, value: BigUint) -> Result<Self> {
        let low = BigUint::from(2u32);
        let high = params.prime() - BigUint::from(2u32);
        if value < low || value > high {
            return Err(SignatureError::key("private key must lie in [2, p-2]"));
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &BigUint {
        &self.0
    }

    pub fn public_key(&self, params: &DomainParameters) -> PublicKey {
        PublicKey(params.generator().modpow(&self.0, params.prime()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// `y = g^x mod p`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(#[serde(with = "biguint_text")] BigUint);

impl PublicKey {
    pub fn new(params: &DomainParameters, value: BigUint) -> Result<Self> {
        let key = Self(value);
        if !key.in_range(params) {
            return Err(SignatureError::key("public key must lie in [1, p-1]"));
        }
        Ok(key)
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub(crate) fn in_range(&self, params: &DomainParameters) -> bool {
        self.0 >= BigUint::one() && &self.0 < params.prime()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_biguint(&self.0))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Rebuilds a keypair from a stored exponent, deriving the public half.
    pub fn from_private(params: &DomainParameters, value: BigUint) -> Result<Self> {
        let private_key = PrivateKey::new(params, value)?;
        let public_key = private_key.public_key(params);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Like [`KeyPair::from_private`] but also checks a stored public key against the derived one.
    pub fn from_parts(params: &DomainParameters, private: BigUint, public: BigUint) -> Result<Self> {
        let pair = Self::from_private(params, private)?;
        if pair.public_key.value() != &public {
            return Err(SignatureError::key("public key does not match private key"));
        }
        Ok(pair)
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}
