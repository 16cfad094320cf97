// Message Encoding
// Converts text and bytes to and from a single big-endian integer

use num_traits::Zero;

use super::bigint::{from_bytes, to_bytes, RsaBigInt};
use super::error::Result;

/// Interpret bytes as a big-endian unsigned integer. The empty slice is 0.
pub fn bytes_to_int(bytes: &[u8]) -> RsaBigInt {
    from_bytes(bytes)
}

/// Minimal big-endian bytes of `i`. Zero encodes to the empty byte string.
pub fn int_to_bytes(i: &RsaBigInt) -> Vec<u8> {
    if i.is_zero() {
        return Vec::new();
    }
    to_bytes(i)
}

/// Encode UTF-8 text as a big-endian unsigned integer.
pub fn str_to_int(s: &str) -> RsaBigInt {
    bytes_to_int(s.as_bytes())
}

/// Decode an integer produced by [`str_to_int`] back into text.
///
/// Leading NUL characters do not survive the trip since the integer has no
/// leading zero bytes. Fails with [`Error::DecodeError`](super::error::Error::DecodeError)
/// when the bytes are not valid UTF-8.
pub fn int_to_str(i: &RsaBigInt) -> Result<String> {
    Ok(String::from_utf8(int_to_bytes(i))?)
}
