use std::time::Duration;
use thiserror::Error;

/// The primary error type for the `pcmi-client` library.
#[derive(Error, Debug)]
pub enum PcmiError {
    #[error("transport is closed")]
    TransportClosed,

    #[error("failed to open serial port: {0}")]
    PortOpen(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation timed out after {seconds:.1}s")]
    Timeout { seconds: f64 },

    #[error("client is not in the required state for this operation: {0}")]
    InvalidState(&'static str),

    #[error("transport closed unexpectedly during {0}")]
    UnexpectedDisconnect(&'static str),

    #[error("malformed frame: {0}")]
    Frame(String),

    #[error("incomplete frame: need more bytes")]
    IncompleteFrame,

    #[error("unknown command code: {0:#04x}")]
    UnknownCommand(u8),

    #[error("checksum mismatch: expected {expected:#04x}, received {received:#04x}")]
    ChecksumMismatch { expected: u8, received: u8 },

    #[error("parse error in {record_type} at offset {offset}: {raw_data}")]
    Parse {
        record_type: &'static str,
        offset: usize,
        raw_data: String,
    },

    #[error("controller reported error {code:#04x}: {message}")]
    Controller { code: u8, message: &'static str },

    #[error("invalid serial number {0:?}: must be exactly 8 decimal digits")]
    InvalidSerialNumber(String),
}

impl PcmiError {
    pub fn timeout(duration: Duration) -> Self {
        PcmiError::Timeout {
            seconds: duration.as_secs_f64(),
        }
    }
}

impl From<tokio::time::error::Elapsed> for PcmiError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        PcmiError::Timeout { seconds: 0.0 }
    }
}

/// Human-readable message table for controller-reported error codes.
pub fn controller_error_message(code: u8) -> &'static str {
    match code {
        0xC1 => "generic error",
        0xC2 => "bad password",
        0xC3 => "bad serial number",
        0xC4 => "string or data error",
        0xC8 => "no zone",
        0xCA => "try again",
        0xCB => "hands-off",
        0xCC => "resend upload",
        0xCD => "device not found",
        0xCE => "zone not found during upload",
        0xD9 => "checksum error",
        0xDA => "controller starting up",
        0xDB => "length mismatch",
        _ => "unrecognized controller error",
    }
}
