//! elsig-crypto: ElGamal signatures over the multiplicative group mod a large prime.
//! - Parameters are always supplied by the caller and validated once, up front.
//! - All randomness comes from an injected `RngCore + CryptoRng`.
//! - Verification answers `bool`; only malformed inputs to keygen/sign are errors.

pub mod arith;
pub mod digest;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod keys;
pub mod params;
pub mod signature;

pub use digest::{HashAlgorithm, MessageDigest};
pub use engine::{ElGamalEngine, MAX_NONCE_DRAWS};
pub use error::{Result, SignatureError};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use params::{DomainParameters, ParameterPolicy, ParameterSpec};
pub use signature::Signature;

/// Re-exported so callers can build keys and digests without naming num-bigint themselves.
pub use num_bigint::BigUint;
