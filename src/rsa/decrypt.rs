// RSA Decryption Implementation
// Plain m = c^d mod n, plus the Chinese Remainder Theorem (CRT) path for private keys

use num_traits::Zero;

use super::bigint::{mod_pow, RsaBigInt};
use super::encoding::{int_to_bytes, int_to_str};
use super::error::{Error, Result};
use super::keygen::RsaPrivateKey;

/// Decrypt an integer ciphertext: `c^d mod n`.
///
/// Fails with [`Error::InvalidModulus`] when `n` is zero and with
/// [`Error::RangeError`] unless `c < n`.
pub fn decrypt_int(cipher: &RsaBigInt, d: &RsaBigInt, n: &RsaBigInt) -> Result<RsaBigInt> {
    if n.is_zero() {
        return Err(Error::InvalidModulus);
    }
    if cipher >= n {
        return Err(Error::RangeError);
    }

    mod_pow(cipher, d, n)
}

/// Decrypt using Chinese Remainder Theorem (CRT)
/// This is faster than regular decryption because we work with smaller numbers
pub fn decrypt_crt(cipher: &RsaBigInt, key: &RsaPrivateKey) -> Result<RsaBigInt> {
    if cipher >= key.n() {
        return Err(Error::RangeError);
    }

    let (d_p, d_q, q_inv) = key.crt_parts();
    let (p, q) = (key.p(), key.q());

    // m1 = c^d_p mod p
    let m1 = mod_pow(cipher, d_p, p)?;

    // m2 = c^d_q mod q
    let m2 = mod_pow(cipher, d_q, q)?;

    // h = (m1 - m2) * q_inv mod p, kept non-negative
    let m2_mod_p = &m2 % p;
    let diff = if m1 >= m2_mod_p {
        m1 - m2_mod_p
    } else {
        m1 + p - m2_mod_p
    };
    let h = (diff * q_inv) % p;

    // m = m2 + q * h, already below n = p * q
    Ok(m2 + q * h)
}

/// Decrypt to the big-endian bytes of the plaintext integer
pub fn decrypt_to_bytes(cipher: &RsaBigInt, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let m = private_key.decrypt(cipher)?;
    Ok(int_to_bytes(&m))
}

/// Decrypt ciphertext to a string
///
/// Fails with [`Error::DecodeError`] when the plaintext integer is not UTF-8
/// text, e.g. when the ciphertext was produced from a numeric payload.
pub fn decrypt_str(cipher: &RsaBigInt, private_key: &RsaPrivateKey) -> Result<String> {
    let m = private_key.decrypt(cipher)?;
    int_to_str(&m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;
    use crate::rsa::encrypt::{encrypt_bytes, encrypt_str};
    use crate::rsa::keygen::{generate_keypair, RsaKeyPair};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn keypair(bits: u64, seed: u64) -> RsaKeyPair {
        generate_keypair(bits, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_decrypt_int_textbook() {
        // n = 3233, d = 2753 undoes e = 17
        let m = decrypt_int(&from_u64(2790), &from_u64(2753), &from_u64(3233)).unwrap();
        assert_eq!(m, from_u64(65));
    }

    #[test]
    fn test_decrypt_int_range() {
        let n = from_u64(3233);
        let d = from_u64(2753);

        assert_eq!(decrypt_int(&from_u64(3233), &d, &n), Err(Error::RangeError));
        assert_eq!(decrypt_int(&from_u64(1), &d, &from_u64(0)), Err(Error::InvalidModulus));
    }

    #[test]
    fn test_decrypt_string() {
        let keypair = keypair(256, 4);
        let message = "Test message 🔐";

        let cipher = encrypt_str(message, keypair.public_key()).unwrap();
        let decrypted = decrypt_str(&cipher, keypair.private_key()).unwrap();

        assert_eq!(message, decrypted);
    }

    #[test]
    fn test_decrypt_bytes() {
        let keypair = keypair(128, 6);
        let message = b"\x01\x02\x03bytes";

        let cipher = encrypt_bytes(message, keypair.public_key()).unwrap();
        let decrypted = decrypt_to_bytes(&cipher, keypair.private_key()).unwrap();

        assert_eq!(message.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_decrypt_numeric_payload_is_not_text() {
        let keypair = keypair(128, 8);

        // 0xFFFE is not a valid UTF-8 sequence
        let cipher = keypair.public_key().encrypt(&from_u64(0xFFFE)).unwrap();
        let result = decrypt_str(&cipher, keypair.private_key());

        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_decrypt_crt_range() {
        let keypair = keypair(64, 10);
        let too_big = keypair.public_key().n().clone();

        assert_eq!(keypair.private_key().decrypt(&too_big), Err(Error::RangeError));
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let keypair1 = keypair(128, 12);
        let keypair2 = keypair(128, 13);
        let message = from_u64(424242);

        let cipher = keypair1.public_key().encrypt(&message).unwrap();
        match keypair2.private_key().decrypt(&cipher) {
            Ok(recovered) => assert_ne!(recovered, message),
            Err(err) => assert_eq!(err, Error::RangeError),
        }
    }

    #[test]
    fn test_crt_agrees_with_plain() {
        let keypair = keypair(96, 14);
        let private = keypair.private_key();
        let n = keypair.public_key().n();

        for seed in 0..32u64 {
            let c = from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)) % n;
            assert_eq!(decrypt_crt(&c, private).unwrap(), decrypt_int(&c, private.d(), n).unwrap());
        }
    }
}
