//! Alarm list parser: the set of alarms currently known for a zone.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};

use super::pcmi_epoch;
use crate::codec::Endian;
use crate::cursor::HexCursor;
use crate::error::PcmiError;
use crate::value::Temperature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum AlarmState {
    Inactive = 0,
    Active = 1,
    Acknowledged = 2,
    Cleared = 3,
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// The controller's alarm category taxonomy. Codes with no match resolve to
/// `General` rather than failing the parse — unrecognized alarm codes are
/// still alarms the caller needs to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum AlarmType {
    None = 0,
    HighTemp = 1,
    LowTemp = 2,
    FixedHighTemp = 3,
    FixedLowTemp = 4,
    HighHumidity = 5,
    LowHumidity = 6,
    PowerFailure = 7,
    PowerRestored = 8,
    SensorFailure = 9,
    DeviceFault = 10,
    HighStatic = 11,
    LowStatic = 12,
    HighGas = 13,
    WaterFlow = 14,
    FeedLevel = 15,
    DoorOpen = 16,
    #[num_enum(default)]
    General = 99,
}

impl AlarmType {
    /// Whether `raw_value`/`raw_threshold` on this alarm are tenths-of-degree
    /// temperatures rather than some other unit.
    pub fn is_temperature(self) -> bool {
        matches!(
            self,
            AlarmType::HighTemp | AlarmType::LowTemp | AlarmType::FixedHighTemp | AlarmType::FixedLowTemp
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmRecord {
    pub id: u16,
    pub alarm_type: AlarmType,
    pub zone: u8,
    pub device_index: u16,
    pub state: AlarmState,
    pub triggered: DateTime<Utc>,
    pub cleared: Option<DateTime<Utc>>,
    pub raw_value: i16,
    pub raw_threshold: i16,
}

impl AlarmRecord {
    pub fn temperature_value(&self) -> Option<Temperature> {
        self.alarm_type.is_temperature().then(|| Temperature::from_raw(self.raw_value))
    }

    pub fn temperature_threshold(&self) -> Option<Temperature> {
        self.alarm_type
            .is_temperature()
            .then(|| Temperature::from_raw(self.raw_threshold))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmList {
    pub zone: u8,
    pub total_count: u16,
    pub alarms: Vec<AlarmRecord>,
}

impl AlarmList {
    pub fn active_alarms(&self) -> impl Iterator<Item = &AlarmRecord> {
        self.alarms.iter().filter(|a| a.state == AlarmState::Active)
    }
}

const HEADER_SIZE_BYTES: usize = 4;
const ALARM_RECORD_SIZE_BYTES: usize = 20;

pub fn parse_alarm_list(hex_data: &str, endian: Endian) -> Result<AlarmList, PcmiError> {
    if hex_data.len() / 2 < HEADER_SIZE_BYTES {
        return Err(PcmiError::Parse {
            record_type: "AlarmList",
            offset: 0,
            raw_data: hex_data.to_string(),
        });
    }

    let mut cursor = HexCursor::new(hex_data, endian, "AlarmList");
    let zone = cursor.read_byte()?;
    cursor.skip_bytes(1)?; // reserved
    let total_count = cursor.read_u16()?;

    let mut alarms = Vec::new();
    while cursor.has_bytes(ALARM_RECORD_SIZE_BYTES) {
        let id = cursor.read_u16()?;
        let alarm_type = AlarmType::from(cursor.read_byte()?);
        let record_zone = cursor.read_byte()?;
        let device_index = cursor.read_u16()?;
        let state = AlarmState::from(cursor.read_byte()?);
        cursor.skip_bytes(1)?; // reserved
        let triggered_minutes = cursor.read_u32()?;
        let cleared_minutes = cursor.read_u32()?;
        let raw_value = cursor.read_i16()?;
        let raw_threshold = cursor.read_i16()?;

        alarms.push(AlarmRecord {
            id,
            alarm_type,
            zone: record_zone,
            device_index,
            state,
            triggered: pcmi_epoch() + ChronoDuration::minutes(triggered_minutes as i64),
            cleared: (cleared_minutes != 0).then(|| pcmi_epoch() + ChronoDuration::minutes(cleared_minutes as i64)),
            raw_value,
            raw_threshold,
        });
    }

    Ok(AlarmList {
        zone,
        total_count,
        alarms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_alarm_hex() -> String {
        let header = "01000100"; // zone=1, reserved, total_count=1
        let id = "0100";
        let alarm_type = "01"; // HighTemperature
        let zone = "01";
        let device_index = "0200";
        let state = "01"; // Active
        let reserved = "00";
        let triggered = "00000000";
        let cleared = "00000000";
        let raw_value = "D002"; // 720
        let raw_threshold = "0003"; // 768
        format!("{header}{id}{alarm_type}{zone}{device_index}{state}{reserved}{triggered}{cleared}{raw_value}{raw_threshold}")
    }

    #[test]
    fn parses_high_temperature_alarm() {
        let hex = one_alarm_hex();
        let list = parse_alarm_list(&hex, Endian::NonSwap).unwrap();
        assert_eq!(list.zone, 1);
        assert_eq!(list.total_count, 1);
        assert_eq!(list.alarms.len(), 1);

        let alarm = &list.alarms[0];
        assert_eq!(alarm.alarm_type, AlarmType::HighTemp);
        assert_eq!(alarm.temperature_value().unwrap().fahrenheit(), Some(72.0));
        assert!(alarm.cleared.is_none());
    }

    #[test]
    fn active_alarms_filters_by_state() {
        let hex = one_alarm_hex();
        let list = parse_alarm_list(&hex, Endian::NonSwap).unwrap();
        assert_eq!(list.active_alarms().count(), 1);
    }

    #[test]
    fn non_temperature_alarm_has_no_temperature_value() {
        let mut hex = one_alarm_hex();
        // flip alarm_type byte to DeviceFault (offset 4 bytes in, 2 hex chars each byte: zone,reserved,count(2) -> 8 hex -> id(4) -> type at hex offset 12)
        hex.replace_range(12..14, "0A");
        let list = parse_alarm_list(&hex, Endian::NonSwap).unwrap();
        assert_eq!(list.alarms[0].alarm_type, AlarmType::DeviceFault);
        assert!(list.alarms[0].temperature_value().is_none());
    }

    #[test]
    fn unrecognized_alarm_code_resolves_to_general() {
        let mut hex = one_alarm_hex();
        hex.replace_range(12..14, "C8"); // 200, not in the known taxonomy
        let list = parse_alarm_list(&hex, Endian::NonSwap).unwrap();
        assert_eq!(list.alarms[0].alarm_type, AlarmType::General);
    }
}
