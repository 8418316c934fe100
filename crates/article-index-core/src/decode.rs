//! Filename decoder.
//!
//! Archive entries are named after their titles with every byte of the
//! EUC-JP encoded title written as two hex digits, e.g. `a4a2` for `あ`.
//! [`decode_name`] reverses that encoding.
//!
//! # Algorithm
//!
//! 1. Drop a trailing odd character (an incomplete pair).
//! 2. Parse each pair as a base-16 byte; `80`–`ff` are ordinary bytes.
//! 3. Decode the byte sequence as EUC-JP. Malformed sequences become
//!    U+FFFD rather than failing.

use encoding_rs::EUC_JP;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid hex character {found:?} at position {index}")]
    InvalidHex { index: usize, found: char },
}

/// Decode a hex-encoded EUC-JP filename fragment into its title.
///
/// ```rust
/// use article_index_core::decode::decode_name;
///
/// assert_eq!(decode_name("c6fcb5ad").unwrap(), "日記");
/// assert_eq!(decode_name("414").unwrap(), "A");
/// ```
pub fn decode_name(encoded: &str) -> Result<String, DecodeError> {
    let bytes = to_bytes(encoded)?;
    let (text, _, _) = EUC_JP.decode(&bytes);
    Ok(text.into_owned())
}

fn to_bytes(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let chars: Vec<char> = encoded.chars().collect();
    let digit = |index: usize| {
        let found = chars[index];
        found
            .to_digit(16)
            .ok_or(DecodeError::InvalidHex { index, found })
    };

    // `chars.len() / 2` drops a trailing odd character.
    (0..chars.len() / 2)
        .map(|pair| {
            let high = digit(2 * pair)?;
            let low = digit(2 * pair + 1)?;
            Ok((high << 4 | low) as u8)
        })
        .collect()
}

/// Hex-encode a title the way archive entry names are written.
pub fn encode_name(title: &str) -> String {
    let (bytes, _, _) = EUC_JP.encode(title);
    hex::encode(bytes)
}
