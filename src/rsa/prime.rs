// Prime Testing and Generation
// Miller-Rabin primality testing and random prime generation with attempt limits

use std::time::{Duration, Instant};

use num_bigint::RandBigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::{thread_rng, Rng};

use super::bigint::{square_and_multiply, RsaBigInt};
use super::error::{Error, Result};

/// Default Miller-Rabin rounds: error probability at most 4^-20.
pub const DEFAULT_MR_ROUNDS: usize = 20;

/// Default cap on candidates drawn by a single prime search.
pub const DEFAULT_MAX_PRIME_ATTEMPTS: u64 = 100_000;

/// Smallest bit length a prime search accepts.
pub const MIN_PRIME_BITS: u64 = 2;

/// Primes below 256, used to settle small candidates and reject obvious
/// composites before any modular exponentiation.
const SMALL_PRIMES: &[u32] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Limits for a random prime search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeSearch {
    pub rounds: usize,
    pub max_attempts: Option<u64>,
    pub deadline: Option<Duration>,
}

impl Default for PrimeSearch {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_MR_ROUNDS,
            max_attempts: Some(DEFAULT_MAX_PRIME_ATTEMPTS),
            deadline: None,
        }
    }
}

impl PrimeSearch {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// `None` removes the cap entirely.
    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Counts attempts of a rejection-sampling loop and fails it once the
/// attempt cap or the wall-clock deadline is reached.
#[derive(Debug)]
pub(crate) struct Budget {
    label: &'static str,
    attempts: u64,
    max_attempts: Option<u64>,
    deadline: Option<Instant>,
}

impl Budget {
    pub(crate) fn new(label: &'static str, max_attempts: Option<u64>, deadline: Option<Instant>) -> Self {
        Self {
            label,
            attempts: 0,
            max_attempts,
            deadline,
        }
    }

    /// Account for one more attempt.
    pub(crate) fn tick(&mut self) -> Result<()> {
        if let Some(max) = self.max_attempts {
            if self.attempts >= max {
                return Err(Error::KeyGenerationError(format!(
                    "{} gave up after {} attempts",
                    self.label, max
                )));
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::KeyGenerationError(format!(
                    "{} exceeded its deadline after {} attempts",
                    self.label, self.attempts
                )));
            }
        }

        self.attempts += 1;
        Ok(())
    }
}

/// Trial division against [`SMALL_PRIMES`].
///
/// Returns `Some(true)` for a small prime, `Some(false)` for a number below 2
/// or one with a small factor, and `None` when the question stays open.
fn trial_division(n: &RsaBigInt) -> Option<bool> {
    if let Some(small) = n.to_u32() {
        if small < 2 {
            return Some(false);
        }
        if SMALL_PRIMES.binary_search(&small).is_ok() {
            return Some(true);
        }
    }

    for &prime in SMALL_PRIMES {
        if (n % prime).is_zero() {
            return Some(false);
        }
    }

    None
}

/// Miller-Rabin witness loop without the trial division fast path.
///
/// Writes `n - 1 = 2^s * d` with `d` odd and checks `rounds` witnesses drawn
/// uniformly from `[2, n - 2]`.
pub fn miller_rabin<R: Rng + ?Sized>(n: &RsaBigInt, rounds: usize, rng: &mut R) -> bool {
    let two = RsaBigInt::from(2u8);
    let three = RsaBigInt::from(3u8);

    if n < &two {
        return false;
    }
    if n == &two || n == &three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    'witness: for _ in 0..rounds {
        // Upper bound is exclusive, so this is [2, n-2]
        let a = rng.gen_biguint_range(&two, &n_minus_one);

        let mut x = square_and_multiply(&a, &d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return false;
    }

    // Probably prime
    true
}

/// Probabilistic primality test with an explicit randomness source.
pub fn is_probable_prime_with<R: Rng + ?Sized>(n: &RsaBigInt, rounds: usize, rng: &mut R) -> bool {
    match trial_division(n) {
        Some(settled) => settled,
        None => miller_rabin(n, rounds, rng),
    }
}

/// Miller-Rabin primality test
/// Returns true if n is probably prime. Witnesses come from the thread-local CSPRNG.
pub fn is_probable_prime(n: &RsaBigInt, rounds: usize) -> bool {
    is_probable_prime_with(n, rounds, &mut thread_rng())
}

/// Uniform draw from `[2^(bits-1), 2^bits)` with the low bit forced on.
fn random_candidate<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> RsaBigInt {
    let mut candidate = rng.gen_biguint(bits);

    // Ensure MSB is set (exact bit length)
    candidate |= RsaBigInt::one() << (bits - 1);

    // Ensure LSB is set (odd)
    candidate |= RsaBigInt::one();

    candidate
}

/// Generate a random prime of exactly `bits` bits using default limits.
pub fn gen_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<RsaBigInt> {
    gen_prime_with(bits, rng, &PrimeSearch::default())
}

/// Generate a random prime of exactly `bits` bits.
///
/// The result lies in `[2^(bits-1), 2^bits)`. Fails with
/// [`Error::InvalidBitLength`] below [`MIN_PRIME_BITS`] and with
/// [`Error::KeyGenerationError`] once the search limits are exhausted.
pub fn gen_prime_with<R: Rng + ?Sized>(bits: u64, rng: &mut R, search: &PrimeSearch) -> Result<RsaBigInt> {
    let deadline = search.deadline.map(|limit| Instant::now() + limit);
    gen_prime_until(bits, rng, search.rounds, search.max_attempts, deadline)
}

/// Prime search against an absolute deadline, shared with key generation.
pub(crate) fn gen_prime_until<R: Rng + ?Sized>(
    bits: u64,
    rng: &mut R,
    rounds: usize,
    max_attempts: Option<u64>,
    deadline: Option<Instant>,
) -> Result<RsaBigInt> {
    if bits < MIN_PRIME_BITS {
        return Err(Error::InvalidBitLength {
            min: MIN_PRIME_BITS,
            actual: bits,
        });
    }

    let mut budget = Budget::new("prime search", max_attempts, deadline);
    loop {
        budget.tick()?;

        let candidate = random_candidate(bits, rng);
        if is_probable_prime_with(&candidate, rounds, rng) {
            return Ok(candidate);
        }
    }
}
