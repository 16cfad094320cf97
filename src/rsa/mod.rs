// RSA Module - Main module file
// Exports all RSA-related functionality

pub mod bigint;
pub mod decrypt;
pub mod encoding;
pub mod encrypt;
pub mod error;
pub mod keygen;
pub mod prime;

pub use bigint::{mod_inverse, mod_inverse_signed, mod_pow, mod_pow_signed, RsaBigInt};
pub use decrypt::{decrypt_crt, decrypt_int, decrypt_str, decrypt_to_bytes};
pub use encoding::{bytes_to_int, int_to_bytes, int_to_str, str_to_int};
pub use encrypt::{encrypt_bytes, encrypt_int, encrypt_str};
pub use error::{Error, Result};
pub use keygen::{
    generate_key, generate_keypair, generate_keypair_with, generate_keypair_with_progress,
    KeyGenConfig, KeyGenStage, KeyTriple, RsaKeyPair, RsaPrivateKey, RsaPublicKey,
};
pub use prime::{gen_prime, gen_prime_with, is_probable_prime, is_probable_prime_with, PrimeSearch};
