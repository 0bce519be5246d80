//! Comma-separated decimal storage convention for string tables.
//!
//! Tables embedded in application resources are commonly stored as text: every byte of the
//! binary layout written as a decimal number, separated by commas. The file is a storage
//! convention only; [`decode`] recovers the exact byte buffer the decoder operates on.
//!
//! Tables dumped from a JVM carry signed bytes, so values in `-128..=-1` are accepted alongside
//! `0..=255` and mapped to their two's-complement byte.
//!
//! ```text
//! 16,0,0,0,0,0,0,0,6,0,0,0,5,0,0,0,6,0,0,0,72,101,108,108,111,87,111,114,108,100
//! ```

use crate::Result;

/// Decodes comma-separated decimal byte values into a byte buffer.
///
/// Whitespace around each token is ignored, and so are any number of trailing separators.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if the input is not ASCII text, if a token is empty or
/// not an integer, or if a value lies outside `-128..=255`. The message names the position of the
/// offending token.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let Ok(content) = std::str::from_utf8(data) else {
        return Err(malformed_error!("String table text is not valid UTF-8"));
    };

    let tokens: Vec<&str> = content.split(',').map(str::trim).collect();
    // trailing separators carry no value
    let end = tokens
        .iter()
        .rposition(|token| !token.is_empty())
        .map_or(0, |last| last + 1);
    let mut bytes = Vec::with_capacity(end);

    for (position, &token) in tokens[..end].iter().enumerate() {
        if token.is_empty() {
            return Err(malformed_error!("Empty byte value at position {}", position));
        }

        let value: i16 = token.parse().map_err(|_| {
            malformed_error!("Invalid byte value '{}' at position {}", token, position)
        })?;

        let byte = match value {
            0..=255 => value as u8,
            -128..=-1 => (value as i8) as u8,
            _ => {
                return Err(malformed_error!(
                    "Byte value {} out of range at position {}",
                    value,
                    position
                ))
            }
        };
        bytes.push(byte);
    }

    Ok(bytes)
}

/// Encodes a byte buffer as comma-separated unsigned decimal values.
#[must_use]
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 4);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&byte.to_string());
    }
    out
}

/// Returns `true` if `data` only contains characters of the text encoding.
pub(crate) fn looks_like_text(data: &[u8]) -> bool {
    !data.is_empty()
        && data
            .iter()
            .all(|b| b.is_ascii_digit() || b.is_ascii_whitespace() || matches!(b, b',' | b'-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn decode_plain() {
        assert_eq!(decode(b"16,0,0,0").unwrap(), vec![16, 0, 0, 0]);
    }

    #[test]
    fn decode_whitespace_and_trailing_separator() {
        assert_eq!(decode(b" 1, 2 ,\t3,\n").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode(b"1,2,3\n").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode(b"4,0,0,0,,").unwrap(), vec![4, 0, 0, 0]);
        assert_eq!(decode(b"4,0,0,0, ,,\n").unwrap(), vec![4, 0, 0, 0]);
        assert!(decode(b",,").unwrap().is_empty());
    }

    #[test]
    fn decode_signed_bytes() {
        assert_eq!(decode(b"-1,-128,127,255").unwrap(), vec![0xFF, 0x80, 0x7F, 0xFF]);
    }

    #[test]
    fn decode_empty_input() {
        assert!(decode(b"").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_out_of_range() {
        let err = decode(b"1,256").unwrap_err();
        match err {
            Error::Malformed { message, .. } => {
                assert!(message.contains("256"));
                assert!(message.contains("position 1"));
            }
            other => panic!("Expected Malformed, got {other:?}"),
        }
        assert!(matches!(decode(b"-129"), Err(Error::Malformed { .. })));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode(b"1,x,3"), Err(Error::Malformed { .. })));
        assert!(matches!(decode(b"1,,3"), Err(Error::Malformed { .. })));
        assert!(matches!(decode(&[0xFF, 0xFE]), Err(Error::Malformed { .. })));
    }

    #[test]
    fn encode_matches_decode() {
        let data = [16u8, 0, 0, 0, 200, 72];
        let text = encode(&data);
        assert_eq!(text, "16,0,0,0,200,72");
        assert_eq!(decode(text.as_bytes()).unwrap(), data);
    }

    #[test]
    fn detect_text() {
        assert!(looks_like_text(b"1, 2,-3\n"));
        assert!(!looks_like_text(b""));
        assert!(!looks_like_text(&[16, 0, 0, 0]));
        assert!(!looks_like_text(b"Hello"));
    }
}
