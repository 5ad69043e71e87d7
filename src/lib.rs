//! Client library for the PCMI serial protocol spoken by Valco agricultural
//! climate controllers over RS-485.
//!
//! [`client::PcmiClient`] drives the connect/download conversation over a
//! [`transport::Transport`]; the `records` modules turn the hex payload of a
//! downloaded frame into typed zone, device, history, and alarm records.

pub mod client;
pub mod codec;
pub mod command;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod frame;
pub mod length;
pub mod records;
pub mod transport;
pub mod value;

pub use client::{ClientConfig, ClientState, PcmiClient};
pub use codec::Endian;
pub use command::CommandCode;
pub use error::PcmiError;
pub use records::alarm::{AlarmList, AlarmRecord, AlarmState, AlarmType};
pub use records::device::{DeviceParameterRecord, DeviceRegistry, DeviceVariableRecord};
pub use records::history::{HistoryGroup, HistoryRecord, HistorySample};
pub use records::zone::{ZoneParameters, ZoneVariables};
pub use transport::{MockTransport, SerialTransport, Transport};
pub use value::{DeviceType, Humidity, SerialNumber, Temperature, TemperatureUnit};
