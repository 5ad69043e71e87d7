//! Zone parameter and zone variable record parsers.

use crate::codec::Endian;
use crate::cursor::HexCursor;
use crate::error::PcmiError;
use crate::value::Temperature;

/// Peeks the record-format nibble out of a raw hex payload without consuming it.
///
/// The format/mode byte sits at byte offset 4 in both zone record shapes, so
/// this works for parameters and variables alike.
fn peek_record_format(hex: &str) -> Result<u8, PcmiError> {
    let probe = HexCursor::new(hex, Endian::Swap, "ZoneRecordHeader");
    let byte = probe.peek_byte(4)?;
    Ok((byte >> 4) & 0x0F)
}

fn resolve_endian(hex: &str, override_endian: Option<Endian>) -> Result<Endian, PcmiError> {
    match override_endian {
        Some(e) => Ok(e),
        // record_format here is a 4-bit nibble (0-15), so it never reaches the
        // non-swap threshold of 20 on its own - zone records always resolve to
        // Swap unless the caller passes an explicit override from the command code.
        None => Ok(Endian::from_record_format(peek_record_format(hex)?)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneParameters {
    pub zone_number: u8,
    pub record_type: u8,
    pub record_format: u8,
    pub temp_control_mode: u8,
    pub setpoint: Temperature,
    pub high_temp_alarm: Temperature,
    pub low_temp_alarm: Temperature,
    pub high_temp_inhibit: Temperature,
    pub low_temp_inhibit: Temperature,
    pub fixed_high_temp: Temperature,
    pub fixed_low_temp: Temperature,
    pub interlock_bits: u16,
    pub zone_bits: u16,
    pub humidity_setpoint: u8,
    pub humidity_off_time_minutes: u16,
    pub humidity_purge_time_minutes: u16,
    pub animal_age_days: u16,
    pub projected_age_days: u16,
    pub weight: u16,
    pub begin_head_count: u32,
    pub mortality_count: u32,
    pub sold_count: u32,
    pub uses_long_head_counts: bool,
    pub raw_data: String,
}

const MIN_RECORD_SIZE_BASIC_BYTES: usize = 42;
const MIN_RECORD_SIZE_EXTENDED_BYTES: usize = 54;

pub fn parse_zone_parameters(hex_data: &str, endian_override: Option<Endian>) -> Result<ZoneParameters, PcmiError> {
    if hex_data.len() / 2 < MIN_RECORD_SIZE_BASIC_BYTES {
        return Err(PcmiError::Parse {
            record_type: "ZoneParameters",
            offset: 0,
            raw_data: hex_data.to_string(),
        });
    }

    let endian = resolve_endian(hex_data, endian_override)?;
    let mut cursor = HexCursor::new(hex_data, endian, "ZoneParameters");

    let _record_size_words = cursor.read_u16()?;
    let zone_number = cursor.read_byte()?;
    let record_type = cursor.read_byte()?;
    let format_byte = cursor.read_byte()?;
    let record_format = (format_byte >> 4) & 0x0F;
    let temp_control_mode = format_byte & 0x0F;
    cursor.skip_bytes(1)?; // reserved

    let setpoint = Temperature::from_raw(cursor.read_i16()?);
    let high_temp_alarm = Temperature::from_raw(cursor.read_i16()?);
    let low_temp_alarm = Temperature::from_raw(cursor.read_i16()?);
    let high_temp_inhibit = Temperature::from_raw(cursor.read_i16()?);
    let low_temp_inhibit = Temperature::from_raw(cursor.read_i16()?);
    let fixed_high_temp = Temperature::from_raw(cursor.read_i16()?);
    let fixed_low_temp = Temperature::from_raw(cursor.read_i16()?);

    let interlock_bits = cursor.read_u16()?;
    let zone_bits = cursor.read_u16()?;

    let humidity_setpoint = cursor.read_byte()?;
    cursor.skip_bytes(1)?; // reserved

    let humidity_off_time_minutes = cursor.read_u16()?;
    let humidity_purge_time_minutes = cursor.read_u16()?;

    let animal_age_days = cursor.read_u16()?;
    let projected_age_days = cursor.read_u16()?;
    let weight = cursor.read_u16()?;
    let begin_head_count_short = cursor.read_u16()?;
    let mortality_count_short = cursor.read_u16()?;
    let sold_count_short = cursor.read_u16()?;

    let (begin_head_count, mortality_count, sold_count, uses_long_head_counts) =
        if record_format >= 3 && hex_data.len() / 2 - cursor.position() / 2 >= 12 {
            (cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?, true)
        } else {
            (
                begin_head_count_short as u32,
                mortality_count_short as u32,
                sold_count_short as u32,
                false,
            )
        };

    Ok(ZoneParameters {
        zone_number,
        record_type,
        record_format,
        temp_control_mode,
        setpoint,
        high_temp_alarm,
        low_temp_alarm,
        high_temp_inhibit,
        low_temp_inhibit,
        fixed_high_temp,
        fixed_low_temp,
        interlock_bits,
        zone_bits,
        humidity_setpoint,
        humidity_off_time_minutes,
        humidity_purge_time_minutes,
        animal_age_days,
        projected_age_days,
        weight,
        begin_head_count,
        mortality_count,
        sold_count,
        uses_long_head_counts,
        raw_data: hex_data.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneVariables {
    pub zone_number: u8,
    pub record_type: u8,
    pub record_format: u8,
    pub actual_temperature: Temperature,
    pub setpoint_temperature: Temperature,
    pub outside_temperature: Temperature,
    pub actual_humidity: u8,
    pub current_age_days: u16,
    pub lights_on_minutes: u16,
    pub lights_off_minutes: u16,
    pub alarm_status: u16,
    pub zone_status: u16,
    pub raw_data: String,
}

const MIN_VARIABLE_RECORD_SIZE_BYTES: usize = 24;

pub fn parse_zone_variables(hex_data: &str, endian_override: Option<Endian>) -> Result<ZoneVariables, PcmiError> {
    if hex_data.len() / 2 < MIN_VARIABLE_RECORD_SIZE_BYTES {
        return Err(PcmiError::Parse {
            record_type: "ZoneVariables",
            offset: 0,
            raw_data: hex_data.to_string(),
        });
    }

    let endian = resolve_endian(hex_data, endian_override)?;
    let mut cursor = HexCursor::new(hex_data, endian, "ZoneVariables");

    let _record_size_words = cursor.read_u16()?;
    let zone_number = cursor.read_byte()?;
    let record_type = cursor.read_byte()?;
    let format_byte = cursor.read_byte()?;
    let record_format = (format_byte >> 4) & 0x0F;
    cursor.skip_bytes(1)?; // padding

    let actual_temperature = Temperature::from_raw(cursor.read_i16()?);
    let setpoint_temperature = Temperature::from_raw(cursor.read_i16()?);
    let outside_temperature = Temperature::from_raw(cursor.read_i16()?);

    let actual_humidity = cursor.read_byte()?;
    cursor.skip_bytes(1)?; // reserved

    let current_age_days = cursor.read_u16()?;
    let lights_on_minutes = cursor.read_u16()?;
    let lights_off_minutes = cursor.read_u16()?;

    let alarm_status = cursor.read_u16()?;
    let zone_status = cursor.read_u16()?;

    Ok(ZoneVariables {
        zone_number,
        record_type,
        record_format,
        actual_temperature,
        setpoint_temperature,
        outside_temperature,
        actual_humidity,
        current_age_days,
        lights_on_minutes,
        lights_off_minutes,
        alarm_status,
        zone_status,
        raw_data: hex_data.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_variables_hex() -> String {
        // record_size, zone=1, record_type=0, format byte, padding (6 bytes)
        let header = "0C0001000000";
        let actual = "D002"; // LE 720 -> 0x02D0
        let setpoint = "2003"; // 800
        let outside = "C800"; // 200
        let humidity = "3200"; // 50, reserved
        let age = "0A00";
        let lights_on = "1E00";
        let lights_off = "3C00";
        let alarm_status = "0000";
        let zone_status = "0100";
        format!(
            "{header}{actual}{setpoint}{outside}{humidity}{age}{lights_on}{lights_off}{alarm_status}{zone_status}"
        )
    }

    #[test]
    fn parses_zone_variables_non_swap() {
        let hex = sample_variables_hex();
        let parsed = parse_zone_variables(&hex, Some(Endian::NonSwap)).unwrap();
        assert_eq!(parsed.zone_number, 1);
        assert_eq!(parsed.actual_temperature.fahrenheit(), Some(72.0));
        assert_eq!(parsed.actual_humidity, 50);
        assert_eq!(parsed.zone_status, 1);
    }

    #[test]
    fn short_record_fails_to_parse() {
        let err = parse_zone_variables("0001", None).unwrap_err();
        assert!(matches!(err, PcmiError::Parse { record_type: "ZoneVariables", .. }));
    }

    fn sample_parameters_hex(extended: bool) -> String {
        // format byte: low nibble 3 for the basic case (temp_control_mode=3);
        // the extended case needs record_format (high nibble) >= 3 instead.
        let header = if extended { "0C0001003000" } else { "0C0001000300" };
        let setpoint = "D002"; // 720
        let high_alarm = "0000";
        let low_alarm = "0000";
        let high_inhibit = "0000";
        let low_inhibit = "0000";
        let fixed_high = "0000";
        let fixed_low = "0000";
        let interlock = "0100";
        let zone_bits = "0200";
        let humidity_setpoint = "3200"; // 50, reserved
        let humidity_off = "0A00";
        let humidity_purge = "0500";
        let age = "0100";
        let projected_age = "0200";
        let weight = "0300";
        let begin = "0400";
        let mortality = "0000";
        let sold = "0000";
        let mut hex = format!(
            "{header}{setpoint}{high_alarm}{low_alarm}{high_inhibit}{low_inhibit}{fixed_high}{fixed_low}\
             {interlock}{zone_bits}{humidity_setpoint}{humidity_off}{humidity_purge}\
             {age}{projected_age}{weight}{begin}{mortality}{sold}"
        );
        if extended {
            hex.push_str("0A000000"); // begin_head_count_long = 10
            hex.push_str("00000000");
            hex.push_str("00000000");
        }
        hex
    }

    #[test]
    fn parses_zone_parameters_basic() {
        let hex = sample_parameters_hex(false);
        let parsed = parse_zone_parameters(&hex, Some(Endian::NonSwap)).unwrap();
        assert_eq!(parsed.zone_number, 1);
        assert_eq!(parsed.temp_control_mode, 3);
        assert_eq!(parsed.setpoint.fahrenheit(), Some(72.0));
        assert!(!parsed.uses_long_head_counts);
        assert_eq!(parsed.begin_head_count, 4);
    }

    #[test]
    fn parses_zone_parameters_extended_head_counts() {
        let hex = sample_parameters_hex(true);
        let parsed = parse_zone_parameters(&hex, Some(Endian::NonSwap)).unwrap();
        assert!(parsed.uses_long_head_counts);
        assert_eq!(parsed.begin_head_count, 10);
    }
}
