//! Command codes carried in the first byte of every frame.
//!
//! The set is closed over the 0x81-0xDB range used by the controller, but
//! the enum keeps a catch-all variant since a future firmware revision could
//! in principle use a code this crate doesn't yet recognize by name - frame
//! classification must still work for it.

use num_enum::{FromPrimitive, IntoPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    Attention = 0x81,
    AtAck = 0x82,
    SerialNumber = 0x85,
    SnAck = 0x86,
    Break = 0x87,
    BrAck = 0x88,
    SendParmData = 0x8F,
    PdStringOne = 0x90,
    SendVarData = 0x91,
    VdStringOne = 0x92,
    SendHistory = 0x93,
    HaString = 0x94,
    SendZoneParm = 0x95,
    ZpStringOne = 0x96,
    SendZoneVar = 0x97,
    ZvStringOne = 0x98,
    OkSendNext = 0x99,
    EndOfRecord = 0x9B,
    SendVersion = 0x9F,
    SvString = 0xA0,
    PdCcStringOne = 0xA1,
    ZpCcStringOne = 0xA2,
    OkCcNext = 0xA3,
    SendAlarm = 0xA4,
    SaString = 0xA5,
    SendPassword = 0xA6,
    PwString = 0xA7,
    PwCcPassword = 0xA8,
    PwCcAck = 0xA9,
    SendDetailAlarm = 0xAA,
    DaString = 0xAB,
    GetInfoRecord = 0xAC,
    SendInfoRecord = 0xAD,
    SendScaleGlobal = 0xAE,
    SgString = 0xAF,
    SendBirdHouse = 0xB0,
    BhString = 0xB1,
    SendInfo1Record = 0xB2,
    SaNonswapString = 0xB3,
    DaNonswapString = 0xB4,
    HaNonswapString = 0xB5,
    SendInfo1NonswapRecord = 0xB6,
    PdStringTwo = 0xB7,
    ZpStringTwo = 0xB8,
    VdStringTwo = 0xB9,
    ZvStringTwo = 0xBA,

    ErrorGeneric = 0xC1,
    ErrorBadPassword = 0xC2,
    ErrorBadSerial = 0xC3,
    ErrorStringData = 0xC4,
    ErrorNoZone = 0xC8,
    ErrorTryAgain = 0xCA,
    ErrorHandsOff = 0xCB,
    ErrorResendUpload = 0xCC,
    ErrorDeviceNotFound = 0xCD,
    ErrorZoneNotFound = 0xCE,
    ErrorChecksum = 0xD9,
    ErrorStartingUp = 0xDA,
    ErrorLengthMismatch = 0xDB,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// `PCMI_SEND_DEVICE_PARM`/`PCMI_DP_STRING_*` and `PCMI_SEND_DEVICE_VAR`/`PCMI_DV_STRING_*`
/// are aliases for the parameter/variable codes above under a different name; same
/// numeric codes, no distinct wire behavior.
pub const SEND_DEVICE_PARM: CommandCode = CommandCode::SendParmData;
pub const DP_STRING_1: CommandCode = CommandCode::PdStringOne;
pub const DP_STRING_2: CommandCode = CommandCode::PdStringTwo;
pub const SEND_DEVICE_VAR: CommandCode = CommandCode::SendVarData;
pub const DV_STRING_1: CommandCode = CommandCode::VdStringOne;
pub const DV_STRING_2: CommandCode = CommandCode::VdStringTwo;

impl CommandCode {
    pub fn code(self) -> u8 {
        self.into()
    }

    /// Single-byte responses carrying no payload, length, or checksum.
    pub fn is_acknowledgment(self) -> bool {
        matches!(
            self,
            CommandCode::AtAck
                | CommandCode::SnAck
                | CommandCode::BrAck
                | CommandCode::OkSendNext
                | CommandCode::EndOfRecord
                | CommandCode::OkCcNext
                | CommandCode::PwCcAck
        )
    }

    /// Data responses framed with a 1-byte (2 hex char) word-count RLI.
    pub fn is_one_byte_rli(self) -> bool {
        matches!(
            self,
            CommandCode::PdStringOne
                | CommandCode::VdStringOne
                | CommandCode::ZpStringOne
                | CommandCode::ZvStringOne
                | CommandCode::PdCcStringOne
                | CommandCode::ZpCcStringOne
        )
    }

    /// Data responses framed with a 2-byte (4 hex char, little-endian) word-count RLI.
    pub fn is_two_byte_rli(self) -> bool {
        matches!(
            self,
            CommandCode::PdStringTwo
                | CommandCode::ZpStringTwo
                | CommandCode::VdStringTwo
                | CommandCode::ZvStringTwo
        )
    }

    /// Data responses framed with a byte-count VLI instead of a word-count RLI.
    pub fn is_vli(self) -> bool {
        matches!(
            self,
            CommandCode::HaString
                | CommandCode::SaString
                | CommandCode::DaString
                | CommandCode::SaNonswapString
                | CommandCode::DaNonswapString
                | CommandCode::HaNonswapString
                | CommandCode::SendInfo1NonswapRecord
        )
    }

    /// Controller-reported error codes (0xC1-0xDB).
    pub fn is_error(self) -> bool {
        let code = self.code();
        (0xC1..=0xDB).contains(&code)
    }

    /// Response codes whose payload is explicitly little-endian regardless of
    /// the record-format byte embedded in the payload itself.
    pub fn is_nonswap_response(self) -> bool {
        matches!(
            self,
            CommandCode::SaNonswapString
                | CommandCode::DaNonswapString
                | CommandCode::HaNonswapString
                | CommandCode::SendInfo1NonswapRecord
                | CommandCode::PdStringTwo
                | CommandCode::ZpStringTwo
                | CommandCode::VdStringTwo
                | CommandCode::ZvStringTwo
        )
    }

    /// Responses whose payload is CR-delimited rather than length-prefixed
    /// (the version string is ASCII, not hex).
    pub fn is_cr_delimited(self) -> bool {
        matches!(self, CommandCode::SvString)
    }
}
