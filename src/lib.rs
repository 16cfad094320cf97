//! Textbook RSA over arbitrary-precision integers.
//!
//! Key generation, Miller-Rabin primality testing, square-and-multiply
//! modular exponentiation and extended-Euclid modular inverses, with a thin
//! text encoding layer on top. There is no padding: this is the mathematical
//! core, not a hardened cryptosystem.
//!
//! ```rust,no_run
//! use textbook_rsa::rsa::{generate_key, int_to_str, str_to_int};
//!
//! let key = generate_key(512, None).expect("key generation failed");
//! let cipher = key.encrypt(&str_to_int("Hello, RSA!")).expect("message fits below n");
//! let plain = key.decrypt(&cipher).expect("cipher is below n");
//! assert_eq!(int_to_str(&plain).unwrap(), "Hello, RSA!");
//! ```

pub mod rsa;

pub use rsa::{Error, Result};
