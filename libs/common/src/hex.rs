//! Hex encoding utility
//!
//! The fireplace wire format carries every payload as ASCII hex, so both
//! directions are needed: uppercase encoding for outgoing payloads, lowercase
//! for diagnostics, and a strict decoder for incoming frames.

const UPPER_DIGITS: &[u8; 16] = b"0123456789ABCDEF";
const LOWER_DIGITS: &[u8; 16] = b"0123456789abcdef";

fn encode_with(data: &[u8], digits: &[u8; 16]) -> String {
    let mut result = String::with_capacity(data.len() * 2);
    for byte in data {
        result.push(digits[(byte >> 4) as usize] as char);
        result.push(digits[(byte & 0x0F) as usize] as char);
    }
    result
}

/// Encode bytes to uppercase hex string
/// Example: [0x12, 0x34, 0xAB] -> "1234AB"
pub fn encode_upper(data: &[u8]) -> String {
    encode_with(data, UPPER_DIGITS)
}

/// Encode bytes to lowercase hex string
/// Example: [0x12, 0x34, 0xAB] -> "1234ab"
pub fn encode_lower(data: &[u8]) -> String {
    encode_with(data, LOWER_DIGITS)
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode ASCII hex (either case) into raw bytes
///
/// Returns `None` for odd-length input or any non-hex character.
pub fn decode(ascii: &[u8]) -> Option<Vec<u8>> {
    if ascii.len() % 2 != 0 {
        return None;
    }

    ascii
        .chunks_exact(2)
        .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_upper_basic() {
        assert_eq!(encode_upper(&[0x12, 0x34, 0xAB]), "1234AB");
    }

    #[test]
    fn test_encode_upper_empty() {
        assert_eq!(encode_upper(&[]), "");
    }

    #[test]
    fn test_encode_single_byte() {
        assert_eq!(encode_upper(&[0x0F]), "0F");
        assert_eq!(encode_lower(&[0xFF]), "ff");
        assert_eq!(encode_lower(&[0x00]), "00");
    }

    #[test]
    fn test_encode_lower_mixed() {
        assert_eq!(
            encode_lower(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]),
            "0123456789abcdef"
        );
    }

    #[test]
    fn test_decode_accepts_both_cases() {
        assert_eq!(decode(b"5c8A"), Some(vec![0x5C, 0x8A]));
        assert_eq!(decode(b"FFff"), Some(vec![0xFF, 0xFF]));
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(b""), Some(vec![]));
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        assert_eq!(decode(b"abc"), None);
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert_eq!(decode(b"GHIJ"), None);
        assert_eq!(decode(b"0x12"), None);
        assert_eq!(decode(b"12 4"), None);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let data = [0x30, 0x30, 0x80, 0x16, 0xBF];
        assert_eq!(decode(encode_upper(&data).as_bytes()), Some(data.to_vec()));
    }
}
