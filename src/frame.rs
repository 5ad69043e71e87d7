//! Frame reader: classifies an inbound buffer by command code and decodes
//! it into a [`ParsedFrame`].
//!
//! The reader never retains state between calls - every `parse` call is a
//! pure function of the buffer it's given.

use crate::codec::{hex_decode, hex_encode, validate_checksum};
use crate::command::CommandCode;
use crate::constants::{ETX, STX};
use crate::error::PcmiError;
use crate::length::{decode_1byte_rli, decode_2byte_rli, decode_vli, vli_width_for};

/// A decoded frame: the command byte plus whatever payload it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    pub command: CommandCode,
    pub payload_bytes: Vec<u8>,
    pub payload_hex: String,
    /// Decoded byte count from the frame's length indicator, if it had one.
    pub length_indicator: Option<usize>,
}

fn ascii_window(buffer: &[u8], range: std::ops::Range<usize>) -> Result<&str, PcmiError> {
    std::str::from_utf8(&buffer[range]).map_err(|_| PcmiError::Frame("non-ASCII frame bytes".to_string()))
}

/// Parses one frame out of `buffer`. An optional leading `STX` is skipped.
///
/// Returns `Err(PcmiError::IncompleteFrame)` when the buffer doesn't yet
/// hold a full frame - callers should read more bytes and retry, not treat
/// this as a hard failure.
pub fn parse(buffer: &[u8]) -> Result<ParsedFrame, PcmiError> {
    if buffer.is_empty() {
        return Err(PcmiError::IncompleteFrame);
    }

    let cmd_pos = if buffer[0] == STX { 1 } else { 0 };
    if buffer.len() <= cmd_pos {
        return Err(PcmiError::IncompleteFrame);
    }

    let command_byte = buffer[cmd_pos];
    let command = CommandCode::from(command_byte);

    if command.is_acknowledgment() {
        return Ok(ParsedFrame {
            command,
            payload_bytes: Vec::new(),
            payload_hex: String::new(),
            length_indicator: None,
        });
    }

    let body_start = cmd_pos + 1;

    if command.is_one_byte_rli() || command.is_two_byte_rli() || command.is_vli() {
        parse_length_prefixed(buffer, cmd_pos, body_start, command)
    } else {
        parse_cr_delimited(buffer, cmd_pos, body_start, command)
    }
}

fn parse_length_prefixed(
    buffer: &[u8],
    cmd_pos: usize,
    body_start: usize,
    command: CommandCode,
) -> Result<ParsedFrame, PcmiError> {
    let rli_chars = if command.is_two_byte_rli() {
        4
    } else if command.is_one_byte_rli() {
        2
    } else {
        vli_width_for(command) * 2
    };

    if buffer.len() < body_start + rli_chars {
        return Err(PcmiError::IncompleteFrame);
    }
    let rli_hex = ascii_window(buffer, body_start..body_start + rli_chars)?;

    let byte_count = if command.is_two_byte_rli() {
        decode_2byte_rli(rli_hex)?
    } else if command.is_one_byte_rli() {
        decode_1byte_rli(rli_hex)?
    } else {
        decode_vli(rli_hex, vli_width_for(command))?
    };

    let payload_start = body_start + rli_chars;
    let payload_end = payload_start + byte_count * 2;
    let checksum_end = payload_end + 2;
    let frame_end = checksum_end + 1;

    if buffer.len() < frame_end {
        return Err(PcmiError::IncompleteFrame);
    }
    if buffer[checksum_end] != ETX {
        return Err(PcmiError::Frame(format!(
            "expected ETX at offset {checksum_end}, found {:#04x}",
            buffer[checksum_end]
        )));
    }

    validate_frame_checksum(buffer, cmd_pos, payload_end)?;

    let payload_hex = ascii_window(buffer, payload_start..payload_end)?.to_string();
    let payload_bytes = hex_decode(&payload_hex)?;

    Ok(ParsedFrame {
        command,
        payload_bytes,
        payload_hex,
        length_indicator: Some(byte_count),
    })
}

fn parse_cr_delimited(
    buffer: &[u8],
    cmd_pos: usize,
    body_start: usize,
    command: CommandCode,
) -> Result<ParsedFrame, PcmiError> {
    let etx_pos = buffer[body_start..]
        .iter()
        .position(|&b| b == ETX)
        .map(|i| i + body_start)
        .ok_or(PcmiError::IncompleteFrame)?;

    if etx_pos < body_start + 2 {
        return Err(PcmiError::Frame(
            "CR-delimited frame too short to contain a checksum".to_string(),
        ));
    }
    let checksum_start = etx_pos - 2;

    validate_frame_checksum(buffer, cmd_pos, checksum_start)?;

    let payload_raw = &buffer[body_start..checksum_start];
    let (payload_bytes, payload_hex) = match ascii_window(buffer, body_start..checksum_start) {
        Ok(text) if text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit()) => {
            (hex_decode(text)?, text.to_string())
        }
        _ => (payload_raw.to_vec(), hex_encode(payload_raw)),
    };

    Ok(ParsedFrame {
        command,
        payload_bytes,
        payload_hex,
        length_indicator: None,
    })
}

fn validate_frame_checksum(buffer: &[u8], cmd_pos: usize, checksum_offset: usize) -> Result<(), PcmiError> {
    let body = &buffer[cmd_pos..checksum_offset + 2];
    if !validate_checksum(body, checksum_offset - cmd_pos)? {
        let computed = crate::codec::calculate_checksum(&body[..checksum_offset - cmd_pos]);
        let received_hex = ascii_window(body, checksum_offset - cmd_pos..checksum_offset - cmd_pos + 2)?;
        let received = u8::from_str_radix(received_hex, 16).unwrap_or(0);
        return Err(PcmiError::ChecksumMismatch {
            expected: computed,
            received,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_an_acknowledgment_frame() {
        let frame = parse(&[0x86]).unwrap();
        assert_eq!(frame.command, CommandCode::SnAck);
        assert!(frame.payload_bytes.is_empty());
    }

    #[test]
    fn incomplete_buffer_is_reported_as_such() {
        let err = parse(&[]).unwrap_err();
        assert!(matches!(err, PcmiError::IncompleteFrame));
    }

    #[test]
    fn one_byte_rli_frame_round_trips() {
        let payload = b"0000";
        let rli_hex = crate::length::encode_1byte_rli(payload.len()).unwrap();
        let mut buf = vec![0x96u8];
        buf.extend_from_slice(rli_hex.as_bytes());
        buf.extend_from_slice(payload);
        let checksummed = crate::codec::append_checksum(&buf);
        let mut full = checksummed;
        full.push(ETX);

        let frame = parse(&full).unwrap();
        assert_eq!(frame.command, CommandCode::ZpStringOne);
        assert_eq!(frame.payload_hex, "0000");
    }

    #[test]
    fn checksum_mismatch_is_detected() {
        let payload = b"0000";
        let rli_hex = crate::length::encode_1byte_rli(payload.len()).unwrap();
        let mut buf = vec![0x96u8];
        buf.extend_from_slice(rli_hex.as_bytes());
        buf.extend_from_slice(payload);
        let mut full = crate::codec::append_checksum(&buf);
        let last = full.len() - 1;
        full[last] = if full[last] == b'0' { b'1' } else { b'0' };
        full.push(ETX);

        let err = parse(&full).unwrap_err();
        assert!(matches!(err, PcmiError::ChecksumMismatch { .. }));
    }
}
