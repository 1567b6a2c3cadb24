//! Number-theory helpers over arbitrary-precision unsigned integers.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::error::{Result, SignatureError};

/// Rejection-sampling cap for a single uniform draw. Each attempt succeeds
/// with probability above one half, so hitting the cap means the source is broken.
pub const MAX_SAMPLE_ATTEMPTS: usize = 256;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97,
];

/// Uniform value in `[0, bound)`.
pub fn random_below<R>(bound: &BigUint, rng: &mut R) -> Result<BigUint>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if bound.is_zero() {
        return Err(SignatureError::rng("empty sampling range"));
    }
    let bits = bound.bits();
    let len = bits.div_ceil(8) as usize;
    let excess = (len as u64 * 8 - bits) as u32;
    let mut buf = vec![0u8; len];

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        rng.try_fill_bytes(&mut buf)?;
        // big-endian, so the surplus bits live in the first byte
        buf[0] &= 0xffu8 >> excess;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
    Err(SignatureError::rng(format!(
        "no value below bound after {} draws",
        MAX_SAMPLE_ATTEMPTS
    )))
}

/// Uniform value in `[low, high]`, both ends inclusive.
pub fn random_in_range<R>(low: &BigUint, high: &BigUint, rng: &mut R) -> Result<BigUint>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if low > high {
        return Err(SignatureError::rng("sampling range is empty"));
    }
    let width = high - low + BigUint::one();
    Ok(low + random_below(&width, rng)?)
}

/// Inverse of `value` modulo `modulus` by the extended Euclidean algorithm.
///
/// Works for composite moduli. Returns `None` when `gcd(value, modulus) != 1`
/// or the modulus is below 2.
pub fn mod_inverse(value: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    if modulus <= &BigUint::one() {
        return None;
    }
    let m = BigInt::from_biguint(Sign::Plus, modulus.clone());
    let mut old_r = BigInt::from_biguint(Sign::Plus, value % modulus);
    let mut r = m.clone();
    let mut old_t = BigInt::one();
    let mut t = BigInt::zero();

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_t = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    if !old_r.is_one() {
        return None;
    }
    old_t.mod_floor(&m).to_biguint()
}

/// `(a - b) mod m` without leaving the unsigned domain.
pub fn mod_sub(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    let a = a % modulus;
    let b = b % modulus;
    if a >= b {
        a - b
    } else {
        modulus - b + a
    }
}

pub fn is_coprime(a: &BigUint, b: &BigUint) -> bool {
    a.gcd(b).is_one()
}

/// Miller–Rabin with `rounds` random witnesses, after trial division by small primes.
///
/// A composite passes with probability at most `4^-rounds`.
pub fn is_probable_prime<R>(n: &BigUint, rounds: u32, rng: &mut R) -> Result<bool>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let two = BigUint::from(2u32);
    if n < &two {
        return Ok(false);
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return Ok(true);
        }
        if (n % &p).is_zero() {
            return Ok(false);
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let shift = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> shift;
    let witness_high = n - &two;

    'witness: for _ in 0..rounds {
        let a = random_in_range(&two, &witness_high, rng)?;
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..shift {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return Ok(false);
    }
    Ok(true)
}
