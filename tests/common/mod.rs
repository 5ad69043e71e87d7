//! Shared helpers for integration tests: hex decoding and frame construction.

#![allow(dead_code)]

use pcmi_client::{CommandCode, MockTransport};

pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("failed to decode hex")
}

/// Builds a complete length-prefixed response frame: command byte, RLI, hex
/// payload, checksum, ETX. No leading STX, matching what `Transport::read_byte`
/// hands `frame::parse` as its first byte.
pub fn length_prefixed_frame(command: CommandCode, rli_hex: &str, payload_hex: &str) -> Vec<u8> {
    let mut body = vec![command.code()];
    body.extend_from_slice(rli_hex.as_bytes());
    body.extend_from_slice(payload_hex.as_bytes());

    let checksum = body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    let mut frame = body;
    frame.extend_from_slice(format!("{checksum:02X}").as_bytes());
    frame.push(0x0D); // ETX
    frame
}

/// Builds a CR-delimited response frame (the version string's shape).
pub fn cr_delimited_frame(command: CommandCode, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![command.code()];
    body.extend_from_slice(payload);

    let checksum = body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    let mut frame = body;
    frame.extend_from_slice(format!("{checksum:02X}").as_bytes());
    frame.push(0x0D); // ETX
    frame
}

/// A `MockTransport` pre-loaded with a successful `SnAck` response, ready for
/// `PcmiClient::connect` to be called against it.
pub fn transport_with_connect_ack() -> MockTransport {
    let mut transport = MockTransport::new();
    transport.queue_inbound(&[CommandCode::SnAck.code()]);
    transport
}
