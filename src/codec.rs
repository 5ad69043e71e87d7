//! Checksum, hex, and endian-aware integer codec primitives.
//!
//! Every record parser is written against these functions rather than
//! against raw byte-order code, so swapping the endian strategy for a
//! record never touches the parser's field-reading logic.

use crate::error::PcmiError;

/// Sum of bytes modulo 256.
pub fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Appends the uppercase 2-hex-char checksum of `data` to `data` itself.
pub fn append_checksum(data: &[u8]) -> Vec<u8> {
    let checksum = calculate_checksum(data);
    let mut out = data.to_vec();
    out.extend_from_slice(format!("{checksum:02X}").as_bytes());
    out
}

/// Compares the checksum computed over `buffer[..offset]` against the
/// 2-ASCII-hex-char checksum that immediately follows it.
pub fn validate_checksum(buffer: &[u8], offset: usize) -> Result<bool, PcmiError> {
    if buffer.len() < offset + 2 {
        return Err(PcmiError::Frame(
            "buffer too short to contain a checksum".to_string(),
        ));
    }
    let computed = calculate_checksum(&buffer[..offset]);
    let received_hex = std::str::from_utf8(&buffer[offset..offset + 2])
        .map_err(|_| PcmiError::Frame("checksum bytes are not valid ASCII".to_string()))?;
    let received = u8::from_str_radix(received_hex, 16)
        .map_err(|_| PcmiError::Frame(format!("malformed checksum hex: {received_hex:?}")))?;
    Ok(computed == received)
}

/// Decodes an ASCII hex string into bytes. Accepts both upper and lower case.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>, PcmiError> {
    hex::decode(hex).map_err(|e| PcmiError::Frame(format!("invalid hex payload: {e}")))
}

/// Encodes bytes as an uppercase ASCII hex string.
pub fn hex_encode(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Byte order used to interpret a record's multi-byte fields.
///
/// "Swap" is the historical big-endian wire order used by `record_format < 20`;
/// "non-swap" is little-endian, used by `record_format >= 20` and by the
/// handful of response codes that declare it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Swap,
    NonSwap,
}

impl Endian {
    /// Selects the strategy implied by a record-format nibble.
    pub fn from_record_format(record_format: u8) -> Self {
        if record_format < crate::constants::ENDIAN_SWAP_THRESHOLD {
            Endian::Swap
        } else {
            Endian::NonSwap
        }
    }

    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endian::Swap => u16::from_be_bytes(bytes),
            Endian::NonSwap => u16::from_le_bytes(bytes),
        }
    }

    pub fn read_i16(self, bytes: [u8; 2]) -> i16 {
        match self {
            Endian::Swap => i16::from_be_bytes(bytes),
            Endian::NonSwap => i16::from_le_bytes(bytes),
        }
    }

    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Swap => u32::from_be_bytes(bytes),
            Endian::NonSwap => u32::from_le_bytes(bytes),
        }
    }

    pub fn read_i32(self, bytes: [u8; 4]) -> i32 {
        match self {
            Endian::Swap => i32::from_be_bytes(bytes),
            Endian::NonSwap => i32::from_le_bytes(bytes),
        }
    }

    pub fn write_u16(self, value: u16) -> [u8; 2] {
        match self {
            Endian::Swap => value.to_be_bytes(),
            Endian::NonSwap => value.to_le_bytes(),
        }
    }

    pub fn write_i16(self, value: i16) -> [u8; 2] {
        match self {
            Endian::Swap => value.to_be_bytes(),
            Endian::NonSwap => value.to_le_bytes(),
        }
    }

    pub fn write_u32(self, value: u32) -> [u8; 4] {
        match self {
            Endian::Swap => value.to_be_bytes(),
            Endian::NonSwap => value.to_le_bytes(),
        }
    }

    pub fn write_i32(self, value: i32) -> [u8; 4] {
        match self {
            Endian::Swap => value.to_be_bytes(),
            Endian::NonSwap => value.to_le_bytes(),
        }
    }
}
