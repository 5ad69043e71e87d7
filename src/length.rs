//! Length indicator encode/decode: RLI (word counts) and VLI (byte counts).

use crate::command::CommandCode;
use crate::constants::VLI_TWO_BYTE_THRESHOLD;
use crate::error::PcmiError;

fn parse_hex_u16(hex: &str) -> Result<u16, PcmiError> {
    u16::from_str_radix(hex, 16).map_err(|_| PcmiError::Frame(format!("invalid length hex: {hex:?}")))
}

/// Decodes a 1-byte RLI (2 hex chars, plain hex word count) into a byte count.
pub fn decode_1byte_rli(hex: &str) -> Result<usize, PcmiError> {
    if hex.len() != 2 {
        return Err(PcmiError::Frame(format!(
            "1-byte RLI must be exactly 2 hex chars, got {}",
            hex.len()
        )));
    }
    let words = parse_hex_u16(hex)?;
    Ok(words as usize * 2)
}

/// Encodes a byte count as a 1-byte RLI. `byte_count` must be even and fit in a word.
pub fn encode_1byte_rli(byte_count: usize) -> Result<String, PcmiError> {
    if byte_count % 2 != 0 || byte_count > crate::constants::MAX_1BYTE_RLI_BYTES {
        return Err(PcmiError::Frame(format!(
            "byte count {byte_count} cannot be represented as a 1-byte RLI"
        )));
    }
    Ok(format!("{:02X}", byte_count / 2))
}

/// Decodes a 2-byte RLI (4 hex chars, **little-endian**) into a byte count.
pub fn decode_2byte_rli(hex: &str) -> Result<usize, PcmiError> {
    if hex.len() != 4 {
        return Err(PcmiError::Frame(format!(
            "2-byte RLI must be exactly 4 hex chars, got {}",
            hex.len()
        )));
    }
    let low = u8::from_str_radix(&hex[0..2], 16)
        .map_err(|_| PcmiError::Frame(format!("invalid length hex: {hex:?}")))?;
    let high = u8::from_str_radix(&hex[2..4], 16)
        .map_err(|_| PcmiError::Frame(format!("invalid length hex: {hex:?}")))?;
    let words = u16::from_le_bytes([low, high]);
    Ok(words as usize * 2)
}

/// Encodes a byte count as a 2-byte, little-endian RLI.
pub fn encode_2byte_rli(byte_count: usize) -> Result<String, PcmiError> {
    if byte_count % 2 != 0 || byte_count > crate::constants::MAX_2BYTE_RLI_BYTES {
        return Err(PcmiError::Frame(format!(
            "byte count {byte_count} cannot be represented as a 2-byte RLI"
        )));
    }
    let words = (byte_count / 2) as u16;
    let [low, high] = words.to_le_bytes();
    Ok(format!("{low:02X}{high:02X}"))
}

/// Which VLI width a command uses: commands at or above the threshold use a
/// 2-byte (4 hex char) count; everything else uses a 1-byte (2 hex char) count.
pub fn vli_width_for(command: CommandCode) -> usize {
    if command.code() >= VLI_TWO_BYTE_THRESHOLD {
        2
    } else {
        1
    }
}

/// Decodes a VLI (plain hex byte count, not a word count) of the given width.
pub fn decode_vli(hex: &str, width: usize) -> Result<usize, PcmiError> {
    let expected_len = width * 2;
    if hex.len() != expected_len {
        return Err(PcmiError::Frame(format!(
            "VLI must be exactly {expected_len} hex chars, got {}",
            hex.len()
        )));
    }
    match width {
        1 => Ok(u8::from_str_radix(hex, 16)
            .map_err(|_| PcmiError::Frame(format!("invalid VLI hex: {hex:?}")))? as usize),
        2 => Ok(parse_hex_u16(hex)? as usize),
        other => Err(PcmiError::Frame(format!("unsupported VLI width {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_rli_decode_scenarios() {
        assert_eq!(decode_1byte_rli("FF").unwrap(), 510);
        assert_eq!(decode_2byte_rli("B800").unwrap(), 368);
        assert_eq!(decode_2byte_rli("0001").unwrap(), 512);
    }

    #[test]
    fn rli_round_trips() {
        for n in (0..=65535u32).step_by(4111) {
            let bytes = (n * 2) as usize;
            if bytes <= crate::constants::MAX_2BYTE_RLI_BYTES {
                let encoded = encode_2byte_rli(bytes).unwrap();
                assert_eq!(decode_2byte_rli(&encoded).unwrap(), bytes);
            }
        }
        for n in 0..=255u32 {
            let bytes = (n * 2) as usize;
            if bytes <= crate::constants::MAX_1BYTE_RLI_BYTES {
                let encoded = encode_1byte_rli(bytes).unwrap();
                assert_eq!(decode_1byte_rli(&encoded).unwrap(), bytes);
            }
        }
    }
}
