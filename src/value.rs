//! Value objects: temperature, humidity, serial number, device type.

use crate::constants::{NAN_TEMP, SERIAL_NUMBER_LENGTH};
use crate::error::PcmiError;
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

/// Signed 16-bit temperature in tenths of a degree Fahrenheit.
///
/// `0x7FFF` is the controller's "sensor fault / not available" sentinel;
/// every conversion returns `None` for it so callers can never accidentally
/// do arithmetic on an invalid reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature {
    raw: i16,
}

impl Temperature {
    pub fn from_raw(raw: i16) -> Self {
        Self { raw }
    }

    pub fn nan() -> Self {
        Self { raw: NAN_TEMP }
    }

    pub fn from_fahrenheit(fahrenheit: f64) -> Result<Self, PcmiError> {
        let raw = (fahrenheit * 10.0).round() as i32;
        if raw == NAN_TEMP as i32 || raw < i16::MIN as i32 || raw > i16::MAX as i32 {
            return Err(PcmiError::Parse {
                record_type: "Temperature",
                offset: 0,
                raw_data: format!("{fahrenheit} does not fit in a tenths-of-degree i16"),
            });
        }
        Ok(Self { raw: raw as i16 })
    }

    pub fn from_celsius(celsius: f64) -> Result<Self, PcmiError> {
        Self::from_fahrenheit(celsius * 9.0 / 5.0 + 32.0)
    }

    pub fn raw_value(&self) -> i16 {
        self.raw
    }

    pub fn is_nan(&self) -> bool {
        self.raw == NAN_TEMP
    }

    pub fn is_valid(&self) -> bool {
        !self.is_nan()
    }

    pub fn fahrenheit(&self) -> Option<f64> {
        self.is_valid().then(|| self.raw as f64 / 10.0)
    }

    pub fn celsius(&self) -> Option<f64> {
        self.fahrenheit().map(|f| (f - 32.0) * 5.0 / 9.0)
    }

    pub fn format(&self, unit: TemperatureUnit) -> String {
        match (unit, self.is_valid()) {
            (_, false) => "N/A".to_string(),
            (TemperatureUnit::Fahrenheit, true) => format!("{:.1}°F", self.fahrenheit().unwrap()),
            (TemperatureUnit::Celsius, true) => format!("{:.1}°C", self.celsius().unwrap()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Fahrenheit,
    Celsius,
}

/// An 8-digit controller serial number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn parse(value: &str) -> Result<Self, PcmiError> {
        if value.len() != SERIAL_NUMBER_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PcmiError::InvalidSerialNumber(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_int(&self) -> u32 {
        self.0.parse().expect("validated 8-digit serial number")
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Humidity percentage, 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Humidity(u8);

impl Humidity {
    pub fn new(percent: u8) -> Result<Self, PcmiError> {
        if percent > 100 {
            return Err(PcmiError::Parse {
                record_type: "Humidity",
                offset: 0,
                raw_data: format!("{percent} is not a valid percentage"),
            });
        }
        Ok(Self(percent))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

/// Controller-recognized device types. Codes 17-24 are unused by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive, Display)]
#[repr(u8)]
pub enum DeviceType {
    #[num_enum(default)]
    Unknown = 0,
    AirSensor = 1,
    HumiditySensor = 2,
    Inlet = 3,
    Curtain = 4,
    RidgeVent = 5,
    Heater = 6,
    CoolPad = 7,
    Fan = 8,
    Timed = 9,
    FeedSensor = 10,
    WaterSensor = 11,
    StaticSensor = 12,
    DigitalSensor = 13,
    PositionSensor = 14,
    Chimney = 15,
    Switch = 16,
    VariableHeater = 25,
    VfdFan = 26,
    V10Lights = 27,
    GasSensor = 28,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_nan_has_no_value() {
        let t = Temperature::nan();
        assert!(t.is_nan());
        assert_eq!(t.fahrenheit(), None);
        assert_eq!(t.celsius(), None);
    }

    #[test]
    fn temperature_converts_tenths_exactly() {
        let t = Temperature::from_raw(720);
        assert_eq!(t.fahrenheit(), Some(72.0));
    }

    #[test]
    fn serial_number_validation() {
        assert!(SerialNumber::parse("123").is_err());
        assert!(SerialNumber::parse("0000ABCD").is_err());
        assert!(SerialNumber::parse("00009001").is_ok());
    }

    #[test]
    fn unknown_device_type_code_resolves_to_unknown() {
        let dt = DeviceType::from(200u8);
        assert_eq!(dt, DeviceType::Unknown);
    }

    #[test]
    fn device_type_displays_its_name() {
        assert_eq!(DeviceType::AirSensor.to_string(), "AirSensor");
    }
}
