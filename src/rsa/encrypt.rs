// RSA Encryption Implementation
// Textbook RSA: c = m^e mod n, no padding

use num_traits::Zero;

use super::bigint::{mod_pow, RsaBigInt};
use super::encoding::{bytes_to_int, str_to_int};
use super::error::{Error, Result};
use super::keygen::RsaPublicKey;

/// Encrypt an integer message: `m^e mod n`.
///
/// Fails with [`Error::InvalidModulus`] when `n` is zero and with
/// [`Error::RangeError`] unless `m < n`.
pub fn encrypt_int(message: &RsaBigInt, e: &RsaBigInt, n: &RsaBigInt) -> Result<RsaBigInt> {
    if n.is_zero() {
        return Err(Error::InvalidModulus);
    }
    if message >= n {
        return Err(Error::RangeError);
    }

    mod_pow(message, e, n)
}

/// Encrypt bytes read as one big-endian integer
pub fn encrypt_bytes(plaintext: &[u8], public_key: &RsaPublicKey) -> Result<RsaBigInt> {
    public_key.encrypt(&bytes_to_int(plaintext))
}

/// Encrypt a string using RSA public key
pub fn encrypt_str(plaintext: &str, public_key: &RsaPublicKey) -> Result<RsaBigInt> {
    public_key.encrypt(&str_to_int(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;
    use crate::rsa::keygen::generate_keypair;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_encrypt_int_textbook() {
        // n = 61 * 53 = 3233, e = 17: 65^17 mod 3233 = 2790
        let c = encrypt_int(&from_u64(65), &from_u64(17), &from_u64(3233)).unwrap();
        assert_eq!(c, from_u64(2790));
    }

    #[test]
    fn test_encrypt_int_range() {
        let n = from_u64(3233);
        let e = from_u64(17);

        assert_eq!(encrypt_int(&from_u64(0), &e, &n).unwrap(), from_u64(0));
        assert_eq!(encrypt_int(&from_u64(1), &e, &n).unwrap(), from_u64(1));
        assert!(encrypt_int(&from_u64(3232), &e, &n).is_ok());
        assert_eq!(encrypt_int(&from_u64(3233), &e, &n), Err(Error::RangeError));
        assert_eq!(encrypt_int(&from_u64(5000), &e, &n), Err(Error::RangeError));
    }

    #[test]
    fn test_encrypt_int_zero_modulus() {
        let result = encrypt_int(&from_u64(0), &from_u64(17), &from_u64(0));
        assert_eq!(result, Err(Error::InvalidModulus));
    }

    #[test]
    fn test_encrypt_str() {
        let keypair = generate_keypair(128, &mut StdRng::seed_from_u64(1)).unwrap();
        let message = "Hello, RSA!";

        let cipher = encrypt_str(message, keypair.public_key()).unwrap();
        assert_ne!(cipher, str_to_int(message));
        assert!(&cipher < keypair.public_key().n());
    }

    #[test]
    fn test_encrypt_message_too_large() {
        let keypair = generate_keypair(64, &mut StdRng::seed_from_u64(2)).unwrap();

        // 9 bytes never fit below a 64-bit modulus
        let result = encrypt_bytes(&[0xFF; 9], keypair.public_key());
        assert_eq!(result, Err(Error::RangeError));
    }
}
