//! Protocol-wide constants: framing bytes, timing defaults, and size limits.

use std::time::Duration;

/// Start-of-frame byte.
pub const STX: u8 = 0x20;

/// End-of-frame byte.
pub const ETX: u8 = 0x0D;

/// Default per-read timeout for most operations.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout used when waiting for the disconnect acknowledgment.
pub const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Delay between connect retries.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Number of additional connect attempts after the first failure.
pub const MAX_RETRIES: u32 = 6;

/// Default serial baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// Serial data bits (fixed by the protocol).
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Serial stop bits (fixed by the protocol).
pub const DEFAULT_STOP_BITS: u8 = 1;

/// Read buffer size for the serial transport.
pub const COM_BUFFER_SIZE: usize = 2048;

/// Exact length of a serial number, in ASCII decimal digits.
pub const SERIAL_NUMBER_LENGTH: usize = 8;

/// Number of addressable zones per controller.
pub const MAX_ZONES: u8 = 9;

/// Sentinel raw value meaning "temperature not available".
pub const NAN_TEMP: i16 = 0x7FFF;

/// Base calendar year for history/alarm timestamp offsets (1980-01-01 00:00 UTC).
pub const BASE_YEAR_FOR_DATES: i32 = 1980;

/// Record-format threshold below which payloads are big-endian ("swap").
pub const ENDIAN_SWAP_THRESHOLD: u8 = 20;

/// Command-code threshold at or above which a VLI is 2 bytes instead of 1.
pub const VLI_TWO_BYTE_THRESHOLD: u8 = 0xB0;

/// Maximum byte count representable by a 1-byte RLI (word count 0xFF).
pub const MAX_1BYTE_RLI_BYTES: usize = 510;

/// Maximum byte count representable by a 2-byte RLI (word count 0xFFFF).
pub const MAX_2BYTE_RLI_BYTES: usize = 131070;
