// RSA Key Generation
// Produces (n, e, d) key material from random primes

use std::time::{Duration, Instant};

use num_traits::One;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::bigint::{mod_inverse, RsaBigInt};
use super::error::{Error, Result};
use super::prime::{gen_prime_until, Budget, DEFAULT_MAX_PRIME_ATTEMPTS, DEFAULT_MR_ROUNDS};

/// Smallest modulus size accepted. Both factors then have at least 4 bits,
/// which leaves room for two distinct primes.
pub const MIN_KEY_BITS: u64 = 8;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    n: RsaBigInt, // Modulus
    e: RsaBigInt, // Public exponent
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    n: RsaBigInt, // Modulus (same as public)
    d: RsaBigInt, // Private exponent
    p: RsaBigInt, // First prime factor
    q: RsaBigInt, // Second prime factor
    // Pre-computed values for faster decryption
    d_p: RsaBigInt,   // d mod (p-1)
    d_q: RsaBigInt,   // d mod (q-1)
    q_inv: RsaBigInt, // q^(-1) mod p
}

/// The `(n, e, d)` triple. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTriple {
    n: RsaBigInt,
    e: RsaBigInt,
    d: RsaBigInt,
}

/// RSA Key Pair (both public and private keys)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    public_key: RsaPublicKey,
    private_key: RsaPrivateKey,
    bit_length: u64,
}

impl RsaPublicKey {
    pub fn n(&self) -> &RsaBigInt {
        &self.n
    }

    pub fn e(&self) -> &RsaBigInt {
        &self.e
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt an integer in `[0, n)` with this public key
    pub fn encrypt(&self, message: &RsaBigInt) -> Result<RsaBigInt> {
        super::encrypt::encrypt_int(message, &self.e, &self.n)
    }
}

impl RsaPrivateKey {
    pub fn n(&self) -> &RsaBigInt {
        &self.n
    }

    pub fn d(&self) -> &RsaBigInt {
        &self.d
    }

    pub fn p(&self) -> &RsaBigInt {
        &self.p
    }

    pub fn q(&self) -> &RsaBigInt {
        &self.q
    }

    /// Euler's totient (p-1)(q-1)
    pub fn phi(&self) -> RsaBigInt {
        (&self.p - 1u8) * (&self.q - 1u8)
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Decrypt a ciphertext in `[0, n)` using the CRT parameters
    pub fn decrypt(&self, cipher: &RsaBigInt) -> Result<RsaBigInt> {
        super::decrypt::decrypt_crt(cipher, self)
    }

    pub(crate) fn crt_parts(&self) -> (&RsaBigInt, &RsaBigInt, &RsaBigInt) {
        (&self.d_p, &self.d_q, &self.q_inv)
    }
}

impl KeyTriple {
    pub fn n(&self) -> &RsaBigInt {
        &self.n
    }

    pub fn e(&self) -> &RsaBigInt {
        &self.e
    }

    pub fn d(&self) -> &RsaBigInt {
        &self.d
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    pub fn encrypt(&self, message: &RsaBigInt) -> Result<RsaBigInt> {
        super::encrypt::encrypt_int(message, &self.e, &self.n)
    }

    pub fn decrypt(&self, cipher: &RsaBigInt) -> Result<RsaBigInt> {
        super::decrypt::decrypt_int(cipher, &self.d, &self.n)
    }

    /// Split into `(n, e, d)`.
    pub fn into_parts(self) -> (RsaBigInt, RsaBigInt, RsaBigInt) {
        (self.n, self.e, self.d)
    }
}

impl RsaKeyPair {
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Requested bit length, which `n` may undershoot by one bit.
    pub fn bit_length(&self) -> u64 {
        self.bit_length
    }

    pub fn triple(&self) -> KeyTriple {
        KeyTriple {
            n: self.public_key.n.clone(),
            e: self.public_key.e.clone(),
            d: self.private_key.d.clone(),
        }
    }
}

impl From<RsaKeyPair> for KeyTriple {
    fn from(keypair: RsaKeyPair) -> Self {
        KeyTriple {
            n: keypair.public_key.n,
            e: keypair.public_key.e,
            d: keypair.private_key.d,
        }
    }
}

/// Stages reported while a key pair is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGenStage {
    /// The public exponent `e` is ready.
    PublicExponent,
    /// `p` is ready.
    FirstPrime,
    /// `q` is ready.
    SecondPrime,
    /// `d` and the CRT parameters are computed.
    Complete,
}

/// Limits and tuning for key generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGenConfig {
    /// Miller-Rabin rounds per candidate.
    pub rounds: usize,
    /// Candidates drawn per prime search before giving up.
    pub max_prime_attempts: Option<u64>,
    /// Primes discarded for `p mod e == 1`, `q mod e == 1` or `q == p`
    /// before giving up.
    pub max_rejections: Option<u64>,
    /// Full pipeline runs allowed when `e` turns out not to be invertible.
    pub max_pipeline_attempts: u64,
    /// Wall-clock budget for the whole generation.
    pub deadline: Option<Duration>,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_MR_ROUNDS,
            max_prime_attempts: Some(DEFAULT_MAX_PRIME_ATTEMPTS),
            max_rejections: Some(10_000),
            max_pipeline_attempts: 8,
            deadline: None,
        }
    }
}

impl KeyGenConfig {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_max_prime_attempts(mut self, attempts: Option<u64>) -> Self {
        self.max_prime_attempts = attempts;
        self
    }

    pub fn with_max_rejections(mut self, rejections: Option<u64>) -> Self {
        self.max_rejections = rejections;
        self
    }

    pub fn with_max_pipeline_attempts(mut self, attempts: u64) -> Self {
        self.max_pipeline_attempts = attempts;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Generate `(n, e, d)` with the given modulus size.
///
/// With a seed the key is reproducible, which is only meant for tests.
/// Without one the generator is seeded from the operating system.
pub fn generate_key(bit_length: u64, rng_seed: Option<u64>) -> Result<KeyTriple> {
    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    generate_keypair(bit_length, &mut rng).map(KeyTriple::from)
}

/// Generate RSA key pair with specified bit length and default limits
pub fn generate_keypair<R: Rng + ?Sized>(bit_length: u64, rng: &mut R) -> Result<RsaKeyPair> {
    generate_keypair_with(bit_length, rng, &KeyGenConfig::default())
}

/// Generate RSA key pair with explicit limits
pub fn generate_keypair_with<R: Rng + ?Sized>(
    bit_length: u64,
    rng: &mut R,
    config: &KeyGenConfig,
) -> Result<RsaKeyPair> {
    generate_keypair_with_progress(bit_length, rng, config, |_| {})
}

/// Generate RSA key pair, reporting each finished stage to `progress`.
///
/// `e` is itself a random prime of `bit_length` bits rather than a small fixed
/// exponent. `p` has `bit_length / 2` bits and `q` the remaining bits; either is
/// redrawn while it is `1 mod e`, and `q` is redrawn while it equals `p`.
pub fn generate_keypair_with_progress<R, F>(
    bit_length: u64,
    rng: &mut R,
    config: &KeyGenConfig,
    mut progress: F,
) -> Result<RsaKeyPair>
where
    R: Rng + ?Sized,
    F: FnMut(KeyGenStage),
{
    if bit_length < MIN_KEY_BITS {
        return Err(Error::InvalidBitLength {
            min: MIN_KEY_BITS,
            actual: bit_length,
        });
    }

    let deadline = config.deadline.map(|limit| Instant::now() + limit);
    let half_bits = bit_length / 2;

    for _ in 0..config.max_pipeline_attempts.max(1) {
        // Step 1: public exponent
        let e = gen_prime_until(bit_length, rng, config.rounds, config.max_prime_attempts, deadline)?;
        progress(KeyGenStage::PublicExponent);

        // Step 2-3: factors, rejecting those that would share a factor e with φ(n)
        let p = generate_factor(half_bits, &e, None, rng, config, deadline)?;
        progress(KeyGenStage::FirstPrime);

        let q = generate_factor(bit_length - half_bits, &e, Some(&p), rng, config, deadline)?;
        progress(KeyGenStage::SecondPrime);

        // Step 4: modulus and totient
        let n = &p * &q;
        let phi = (&p - 1u8) * (&q - 1u8);

        // Step 5: d = e^(-1) mod φ(n)
        let d = match mod_inverse(&e, &phi) {
            Ok(d) => d,
            Err(Error::NoInverseExists) => continue,
            Err(err) => return Err(err),
        };

        let private_key = build_private_key(n.clone(), d, p, q)?;
        progress(KeyGenStage::Complete);

        return Ok(RsaKeyPair {
            public_key: RsaPublicKey { n, e },
            private_key,
            bit_length,
        });
    }

    Err(Error::KeyGenerationError(format!(
        "e was not invertible modulo φ(n) in {} attempts",
        config.max_pipeline_attempts.max(1)
    )))
}

/// Draw a prime factor of `bits` bits that is not `1 mod e` and differs from `other`.
fn generate_factor<R: Rng + ?Sized>(
    bits: u64,
    e: &RsaBigInt,
    other: Option<&RsaBigInt>,
    rng: &mut R,
    config: &KeyGenConfig,
    deadline: Option<Instant>,
) -> Result<RsaBigInt> {
    let mut budget = Budget::new("factor rejection", config.max_rejections, deadline);
    loop {
        budget.tick()?;

        let candidate = gen_prime_until(bits, rng, config.rounds, config.max_prime_attempts, deadline)?;
        if (&candidate % e).is_one() {
            continue;
        }
        if other == Some(&candidate) {
            continue;
        }
        return Ok(candidate);
    }
}

fn build_private_key(n: RsaBigInt, d: RsaBigInt, p: RsaBigInt, q: RsaBigInt) -> Result<RsaPrivateKey> {
    let d_p = &d % (&p - 1u8);
    let d_q = &d % (&q - 1u8);

    // p and q are distinct primes, so this only fails on a broken invariant
    let q_inv = mod_inverse(&q, &p)
        .map_err(|err| Error::KeyGenerationError(format!("failed to compute q^(-1) mod p: {}", err)))?;

    Ok(RsaPrivateKey {
        n,
        d,
        p,
        q,
        d_p,
        d_q,
        q_inv,
    })
}
