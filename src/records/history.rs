//! History record parser: a time series of samples for one zone/group pair.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};

use super::pcmi_epoch;
use crate::codec::Endian;
use crate::cursor::HexCursor;
use crate::error::PcmiError;

/// Which quantity a history record tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum HistoryGroup {
    Temperature = 1,
    Humidity = 2,
    Setpoint = 3,
    OutsideTemperature = 4,
    StaticPressure = 5,
    Water = 6,
    Feed = 7,
    Mortality = 8,
    Weight = 9,
    #[num_enum(default)]
    Unknown = 0,
}

fn scaled_value(group: HistoryGroup, raw: i16) -> f64 {
    match group {
        HistoryGroup::Temperature | HistoryGroup::Setpoint | HistoryGroup::OutsideTemperature => raw as f64 / 10.0,
        HistoryGroup::StaticPressure => raw as f64 / 100.0,
        _ => raw as f64,
    }
}

/// One time-stamped sample. `value` is `None` for the invalid-sample sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySample {
    pub timestamp: DateTime<Utc>,
    pub raw: i16,
    pub value: Option<f64>,
}

impl HistorySample {
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub zone: u8,
    pub group: HistoryGroup,
    pub interval_minutes: u16,
    pub start: DateTime<Utc>,
    pub samples: Vec<HistorySample>,
}

const MIN_RECORD_SIZE_BYTES: usize = 10;

pub fn parse_history(hex_data: &str, endian: Endian) -> Result<HistoryRecord, PcmiError> {
    if hex_data.len() / 2 < MIN_RECORD_SIZE_BYTES {
        return Err(PcmiError::Parse {
            record_type: "HistoryRecord",
            offset: 0,
            raw_data: hex_data.to_string(),
        });
    }

    let mut cursor = HexCursor::new(hex_data, endian, "HistoryRecord");
    let zone = cursor.read_byte()?;
    let group = HistoryGroup::from(cursor.read_byte()?);
    let interval_minutes = cursor.read_u16()?;
    let sample_count = cursor.read_u16()?;
    let start_minutes = cursor.read_u32()?;
    let start = pcmi_epoch() + ChronoDuration::minutes(start_minutes as i64);

    let mut samples = Vec::with_capacity(sample_count as usize);
    for i in 0..sample_count {
        if !cursor.has_bytes(2) {
            break;
        }
        let raw = cursor.read_i16()?;
        let timestamp = start + ChronoDuration::minutes(i as i64 * interval_minutes as i64);
        let value = (raw != crate::constants::NAN_TEMP).then(|| scaled_value(group, raw));
        samples.push(HistorySample { timestamp, raw, value });
    }

    Ok(HistoryRecord {
        zone,
        group,
        interval_minutes,
        start,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hex() -> String {
        let zone = "01";
        let group = "01"; // Temperature
        let interval = "0F00"; // 15 minutes
        let count = "0300";
        let start_minutes = "00000000";
        let samples = ["D002", "E002", "FF7F"]; // 720, 736, NaN sentinel
        format!("{zone}{group}{interval}{count}{start_minutes}{}", samples.concat())
    }

    #[test]
    fn parses_samples_and_scales_temperature() {
        let hex = sample_hex();
        let record = parse_history(&hex, Endian::NonSwap).unwrap();
        assert_eq!(record.zone, 1);
        assert_eq!(record.group, HistoryGroup::Temperature);
        assert_eq!(record.samples.len(), 3);
        assert_eq!(record.samples[0].value, Some(72.0));
        assert_eq!(record.samples[1].value, Some(73.6));
        assert!(!record.samples[2].is_valid());
    }

    #[test]
    fn sample_timestamps_step_by_interval() {
        let hex = sample_hex();
        let record = parse_history(&hex, Endian::NonSwap).unwrap();
        let gap = record.samples[1].timestamp - record.samples[0].timestamp;
        assert_eq!(gap, ChronoDuration::minutes(15));
    }

    #[test]
    fn short_record_fails_to_parse() {
        let err = parse_history("0001", Endian::NonSwap).unwrap_err();
        assert!(matches!(err, PcmiError::Parse { record_type: "HistoryRecord", .. }));
    }
}
