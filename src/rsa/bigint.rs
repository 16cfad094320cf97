// RSA Big Integer Operations
// Wrapper around num-bigint for the number-theoretic primitives RSA is built on

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use super::error::{Error, Result};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Convert big integer to bytes (big-endian)
pub fn to_bytes(n: &RsaBigInt) -> Vec<u8> {
    n.to_bytes_be()
}

/// Modular exponentiation: base^exp mod modulus
///
/// Square-and-multiply over the exponent bits, least significant first,
/// reducing after every multiplication. The result lies in `[0, modulus)`.
///
/// Fails with [`Error::InvalidModulus`] when `modulus` is zero.
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> Result<RsaBigInt> {
    if modulus.is_zero() {
        return Err(Error::InvalidModulus);
    }
    Ok(square_and_multiply(base, exp, modulus))
}

/// Square-and-multiply core shared by the checked entry points.
/// `modulus` must be non-zero.
pub(crate) fn square_and_multiply(
    base: &RsaBigInt,
    exp: &RsaBigInt,
    modulus: &RsaBigInt,
) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }

    let mut result = RsaBigInt::one();
    let mut base = base % modulus;
    let mut exp = exp.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    result
}

/// Modular exponentiation with a signed base and modulus.
///
/// A negative base is normalized into `[0, modulus)` before exponentiation.
/// Fails with [`Error::InvalidModulus`] when `modulus <= 0`.
pub fn mod_pow_signed(base: &BigInt, exp: &RsaBigInt, modulus: &BigInt) -> Result<RsaBigInt> {
    if !modulus.is_positive() {
        return Err(Error::InvalidModulus);
    }

    let base = base.mod_floor(modulus);
    mod_pow(base.magnitude(), exp, modulus.magnitude())
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x, y) such that a*x + b*y = gcd = gcd(a, b)
///
/// The returned gcd is never negative.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;

        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Compute modular inverse: a^(-1) mod m
///
/// Returns `x` in `[0, m)` with `(a * x) mod m == 1`. For `m == 1` every
/// residue is congruent and the result is 0.
///
/// Fails with [`Error::InvalidModulus`] when `m` is zero and with
/// [`Error::NoInverseExists`] when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &RsaBigInt, m: &RsaBigInt) -> Result<RsaBigInt> {
    if m.is_zero() {
        return Err(Error::InvalidModulus);
    }

    let a = BigInt::from(a % m);
    let m = BigInt::from(m.clone());
    let (gcd, x, _) = extended_gcd(&a, &m);

    if !gcd.is_one() {
        return Err(Error::NoInverseExists);
    }

    // Bézout coefficient may be negative
    Ok(x.mod_floor(&m).magnitude().clone())
}

/// Modular inverse with a signed operand and modulus.
///
/// Fails with [`Error::InvalidModulus`] when `m <= 0`.
pub fn mod_inverse_signed(a: &BigInt, m: &BigInt) -> Result<RsaBigInt> {
    if !m.is_positive() {
        return Err(Error::InvalidModulus);
    }

    let a = a.mod_floor(m);
    mod_inverse(a.magnitude(), m.magnitude())
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}
