//! Device parameter/variable records: an 8-byte header shared by every
//! device type, followed by a type-specific body decoded by a strategy
//! looked up in a [`DeviceRegistry`].
//!
//! Per-device field layouts below are reconstructed from the vendor's device
//! strategy modules rather than invented; see `DESIGN.md` for the mapping
//! from each struct to its grounding.

use std::collections::HashMap;

use crate::codec::Endian;
use crate::cursor::HexCursor;
use crate::error::PcmiError;
use crate::value::{DeviceType, Temperature};

pub const HEADER_SIZE_BYTES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRecordHeader {
    pub record_size_words: u16,
    pub zone_number: u8,
    pub record_type: u8,
    pub record_format: u8,
    pub device_subtype: u8,
    pub device_type: DeviceType,
    pub module_address: u8,
    pub channel_number: u8,
}

fn peek_record_format(hex: &str) -> Result<u8, PcmiError> {
    let probe = HexCursor::new(hex, Endian::Swap, "DeviceRecordHeader");
    let byte = probe.peek_byte(4)?;
    Ok((byte >> 4) & 0x0F)
}

fn resolve_endian(hex: &str, override_endian: Option<Endian>) -> Result<Endian, PcmiError> {
    match override_endian {
        Some(e) => Ok(e),
        None => Ok(Endian::from_record_format(peek_record_format(hex)?)),
    }
}

fn read_header(cursor: &mut HexCursor) -> Result<DeviceRecordHeader, PcmiError> {
    let record_size_words = cursor.read_u16()?;
    let zone_number = cursor.read_byte()?;
    let record_type = cursor.read_byte()?;
    let format_subtype = cursor.read_byte()?;
    let device_type = DeviceType::from(cursor.read_byte()?);
    let module_address = cursor.read_byte()?;
    let channel_number = cursor.read_byte()?;

    Ok(DeviceRecordHeader {
        record_size_words,
        zone_number,
        record_type,
        record_format: (format_subtype >> 4) & 0x0F,
        device_subtype: format_subtype & 0x0F,
        device_type,
        module_address,
        channel_number,
    })
}

/// Fallback payload for a device type with no registered strategy: the
/// header plus whatever's left, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeviceRecord {
    pub header: DeviceRecordHeader,
    pub raw_hex: String,
}

// ---------------------------------------------------------------------------
// Sensors: AirSensor, HumiditySensor, FeedSensor, WaterSensor, StaticSensor,
// DigitalSensor, PositionSensor, GasSensor. Each has its own threshold shape,
// but all follow the sensor family's pattern of a name index, a type/mode
// byte, zero or more calibration/threshold fields, and an alarm delay.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AirSensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub calibration_offset: Temperature,
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirSensorVariables {
    pub header: DeviceRecordHeader,
    pub current_temperature: Temperature,
    pub sensor_status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HumiditySensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub temp_calibration_offset: Temperature,
    pub humidity_calibration_offset: u8,
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HumiditySensorVariables {
    pub header: DeviceRecordHeader,
    pub current_temperature: Temperature,
    pub current_humidity: u8,
    pub sensor_status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub bin_capacity: u32,
    pub low_level_alarm: u8,
    pub sensor_type: u8,
    pub calibration_factor: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSensorVariables {
    pub header: DeviceRecordHeader,
    pub current_level: u8,
    pub consumption_today: u32,
    pub consumption_total: u32,
    pub sensor_status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterSensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub pulses_per_gallon: u16,
    pub high_flow_alarm: u16,
    pub no_flow_alarm_time: u16,
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterSensorVariables {
    pub header: DeviceRecordHeader,
    pub flow_rate: u16,
    pub consumption_today: u32,
    pub consumption_total: u32,
    pub sensor_status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticSensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub calibration_offset: i16,
    pub high_alarm_setpoint: u16,
    pub low_alarm_setpoint: u16,
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticSensorVariables {
    pub header: DeviceRecordHeader,
    pub current_reading: i16,
    pub sensor_status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DigitalSensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub sensor_type: u8,
    pub normally_open: u8,
    pub alarm_delay_minutes: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DigitalSensorVariables {
    pub header: DeviceRecordHeader,
    pub current_state: u8,
    pub status: u16,
    pub raw_value: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub min_raw_value: u16,
    pub max_raw_value: u16,
    pub linked_device: u16,
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSensorVariables {
    pub header: DeviceRecordHeader,
    pub raw_value: u16,
    pub calculated_position: u8,
    pub sensor_status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasSensorParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub gas_type: u8,
    pub high_alarm_level: u16,
    pub ventilation_trigger: u16,
    pub calibration_offset: i16,
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasSensorVariables {
    pub header: DeviceRecordHeader,
    pub current_level: u16,
    pub peak_level_today: u16,
    pub sensor_status: u16,
}

fn parse_air_sensor_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<AirSensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let calibration_offset = Temperature::from_raw(c.read_i16()?);
    let sensor_type = c.read_byte()?;
    Ok(AirSensorParameters {
        header,
        name_index,
        calibration_offset,
        sensor_type,
    })
}

fn parse_air_sensor_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<AirSensorVariables, PcmiError> {
    Ok(AirSensorVariables {
        header,
        current_temperature: Temperature::from_raw(c.read_i16()?),
        sensor_status: c.read_u16()?,
    })
}

fn parse_humidity_sensor_parameters(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<HumiditySensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let temp_calibration_offset = Temperature::from_raw(c.read_i16()?);
    let humidity_calibration_offset = c.read_byte()?;
    let sensor_type = c.read_byte()?;
    Ok(HumiditySensorParameters {
        header,
        name_index,
        temp_calibration_offset,
        humidity_calibration_offset,
        sensor_type,
    })
}

fn parse_humidity_sensor_variables(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<HumiditySensorVariables, PcmiError> {
    let current_temperature = Temperature::from_raw(c.read_i16()?);
    let current_humidity = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(HumiditySensorVariables {
        header,
        current_temperature,
        current_humidity,
        sensor_status: c.read_u16()?,
    })
}

fn parse_feed_sensor_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<FeedSensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let bin_capacity = c.read_u32()?;
    let low_level_alarm = c.read_byte()?;
    let sensor_type = c.read_byte()?;
    let calibration_factor = c.read_u16()?;
    Ok(FeedSensorParameters {
        header,
        name_index,
        bin_capacity,
        low_level_alarm,
        sensor_type,
        calibration_factor,
    })
}

fn parse_feed_sensor_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<FeedSensorVariables, PcmiError> {
    let current_level = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(FeedSensorVariables {
        header,
        current_level,
        consumption_today: c.read_u32()?,
        consumption_total: c.read_u32()?,
        sensor_status: c.read_u16()?,
    })
}

fn parse_water_sensor_parameters(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<WaterSensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let pulses_per_gallon = c.read_u16()?;
    let high_flow_alarm = c.read_u16()?;
    let no_flow_alarm_time = c.read_u16()?;
    let sensor_type = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(WaterSensorParameters {
        header,
        name_index,
        pulses_per_gallon,
        high_flow_alarm,
        no_flow_alarm_time,
        sensor_type,
    })
}

fn parse_water_sensor_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<WaterSensorVariables, PcmiError> {
    Ok(WaterSensorVariables {
        header,
        flow_rate: c.read_u16()?,
        consumption_today: c.read_u32()?,
        consumption_total: c.read_u32()?,
        sensor_status: c.read_u16()?,
    })
}

fn parse_static_sensor_parameters(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<StaticSensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let calibration_offset = c.read_i16()?;
    let high_alarm_setpoint = c.read_u16()?;
    let low_alarm_setpoint = c.read_u16()?;
    let sensor_type = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(StaticSensorParameters {
        header,
        name_index,
        calibration_offset,
        high_alarm_setpoint,
        low_alarm_setpoint,
        sensor_type,
    })
}

fn parse_static_sensor_variables(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<StaticSensorVariables, PcmiError> {
    Ok(StaticSensorVariables {
        header,
        current_reading: c.read_i16()?,
        sensor_status: c.read_u16()?,
    })
}

fn parse_digital_sensor_parameters(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<DigitalSensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let sensor_type = c.read_byte()?;
    let normally_open = c.read_byte()?;
    let alarm_delay_minutes = c.read_u16()?;
    Ok(DigitalSensorParameters {
        header,
        name_index,
        sensor_type,
        normally_open,
        alarm_delay_minutes,
    })
}

fn parse_digital_sensor_variables(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<DigitalSensorVariables, PcmiError> {
    let current_state = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(DigitalSensorVariables {
        header,
        current_state,
        status: c.read_u16()?,
        raw_value: c.read_u16()?,
    })
}

fn parse_position_sensor_parameters(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<PositionSensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let min_raw_value = c.read_u16()?;
    let max_raw_value = c.read_u16()?;
    let linked_device = c.read_u16()?;
    let sensor_type = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(PositionSensorParameters {
        header,
        name_index,
        min_raw_value,
        max_raw_value,
        linked_device,
        sensor_type,
    })
}

fn parse_position_sensor_variables(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<PositionSensorVariables, PcmiError> {
    let raw_value = c.read_u16()?;
    let calculated_position = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(PositionSensorVariables {
        header,
        raw_value,
        calculated_position,
        sensor_status: c.read_u16()?,
    })
}

fn parse_gas_sensor_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<GasSensorParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let gas_type = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let high_alarm_level = c.read_u16()?;
    let ventilation_trigger = c.read_u16()?;
    let calibration_offset = c.read_i16()?;
    let sensor_type = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(GasSensorParameters {
        header,
        name_index,
        gas_type,
        high_alarm_level,
        ventilation_trigger,
        calibration_offset,
        sensor_type,
    })
}

fn parse_gas_sensor_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<GasSensorVariables, PcmiError> {
    Ok(GasSensorVariables {
        header,
        current_level: c.read_u16()?,
        peak_level_today: c.read_u16()?,
        sensor_status: c.read_u16()?,
    })
}

// ---------------------------------------------------------------------------
// Positional devices: Inlet, Curtain, RidgeVent, Chimney. All share a common
// position/timing/control-mode prefix; what follows it differs per device
// (Inlet and Curtain carry a static pressure setpoint, Curtain and Chimney
// replace the second reserved byte with a device-specific trim field, and
// only Inlet variables report a static pressure reading).
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalCore {
    pub name_index: u16,
    pub min_position: u8,
    pub max_position: u8,
    pub open_time_seconds: u16,
    pub close_time_seconds: u16,
    pub control_mode: u8,
}

fn read_positional_core(c: &mut HexCursor) -> Result<PositionalCore, PcmiError> {
    let name_index = c.read_u16()?;
    let min_position = c.read_byte()?;
    let max_position = c.read_byte()?;
    let open_time_seconds = c.read_u16()?;
    let close_time_seconds = c.read_u16()?;
    let control_mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(PositionalCore {
        name_index,
        min_position,
        max_position,
        open_time_seconds,
        close_time_seconds,
        control_mode,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionalVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub current_position: u8,
    pub target_position: u8,
    pub runtime_today_seconds: u16,
}

fn parse_positional_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<PositionalVariables, PcmiError> {
    Ok(PositionalVariables {
        header,
        status: c.read_u16()?,
        current_position: c.read_byte()?,
        target_position: c.read_byte()?,
        runtime_today_seconds: c.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct InletVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub current_position: u8,
    pub target_position: u8,
    pub static_reading: u16,
    pub runtime_today_seconds: u16,
}

fn parse_inlet_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<InletVariables, PcmiError> {
    Ok(InletVariables {
        header,
        status: c.read_u16()?,
        current_position: c.read_byte()?,
        target_position: c.read_byte()?,
        static_reading: c.read_u16()?,
        runtime_today_seconds: c.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct InletParameters {
    pub header: DeviceRecordHeader,
    pub core: PositionalCore,
    pub static_setpoint: u16,
    pub temperature_offset: Temperature,
    pub position_per_degree: u8,
    pub control_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurtainParameters {
    pub header: DeviceRecordHeader,
    pub core: PositionalCore,
    pub static_setpoint: u16,
    pub temperature_offset: Temperature,
    pub position_per_degree: u8,
    pub wind_close_speed: u8,
    pub control_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RidgeVentParameters {
    pub header: DeviceRecordHeader,
    pub core: PositionalCore,
    pub temperature_offset: Temperature,
    pub position_per_degree: u8,
    pub control_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChimneyParameters {
    pub header: DeviceRecordHeader,
    pub core: PositionalCore,
    pub temperature_offset: Temperature,
    pub position_per_degree: u8,
    pub min_vent_position: u8,
    pub control_bits: u16,
}

fn parse_inlet_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<InletParameters, PcmiError> {
    let core = read_positional_core(c)?;
    let static_setpoint = c.read_u16()?;
    let temperature_offset = Temperature::from_raw(c.read_i16()?);
    let position_per_degree = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let control_bits = c.read_u16()?;
    Ok(InletParameters {
        header,
        core,
        static_setpoint,
        temperature_offset,
        position_per_degree,
        control_bits,
    })
}

fn parse_curtain_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<CurtainParameters, PcmiError> {
    let core = read_positional_core(c)?;
    let static_setpoint = c.read_u16()?;
    let temperature_offset = Temperature::from_raw(c.read_i16()?);
    let position_per_degree = c.read_byte()?;
    let wind_close_speed = c.read_byte()?;
    let control_bits = c.read_u16()?;
    Ok(CurtainParameters {
        header,
        core,
        static_setpoint,
        temperature_offset,
        position_per_degree,
        wind_close_speed,
        control_bits,
    })
}

fn parse_ridge_vent_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<RidgeVentParameters, PcmiError> {
    let core = read_positional_core(c)?;
    let temperature_offset = Temperature::from_raw(c.read_i16()?);
    let position_per_degree = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let control_bits = c.read_u16()?;
    Ok(RidgeVentParameters {
        header,
        core,
        temperature_offset,
        position_per_degree,
        control_bits,
    })
}

fn parse_chimney_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<ChimneyParameters, PcmiError> {
    let core = read_positional_core(c)?;
    let temperature_offset = Temperature::from_raw(c.read_i16()?);
    let position_per_degree = c.read_byte()?;
    let min_vent_position = c.read_byte()?;
    let control_bits = c.read_u16()?;
    Ok(ChimneyParameters {
        header,
        core,
        temperature_offset,
        position_per_degree,
        min_vent_position,
        control_bits,
    })
}

// ---------------------------------------------------------------------------
// Climate devices: Heater, VariableHeater, CoolPad, Fan, VfdFan. Each has its
// own rating field (BTU, CFM, or none) and its own variable shape depending
// on whether the device modulates output.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HeaterParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub on_temperature_offset: Temperature,
    pub off_temperature_offset: Temperature,
    pub min_on_time_minutes: u16,
    pub min_off_time_minutes: u16,
    pub mode: u8,
    pub btu_rating: u32,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaterVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub runtime_today_minutes: u16,
    pub runtime_total_hours: u16,
    pub cycles_today: u16,
    pub fuel_usage_today: u16,
}

fn parse_heater_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<HeaterParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let on_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let off_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let min_on_time_minutes = c.read_u16()?;
    let min_off_time_minutes = c.read_u16()?;
    let mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let btu_rating = c.read_u32()?;
    let control_bits = c.read_u16()?;
    let interlock_bits = c.read_u16()?;
    Ok(HeaterParameters {
        header,
        name_index,
        on_temperature_offset,
        off_temperature_offset,
        min_on_time_minutes,
        min_off_time_minutes,
        mode,
        btu_rating,
        control_bits,
        interlock_bits,
    })
}

fn parse_heater_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<HeaterVariables, PcmiError> {
    Ok(HeaterVariables {
        header,
        status: c.read_u16()?,
        runtime_today_minutes: c.read_u16()?,
        runtime_total_hours: c.read_u16()?,
        cycles_today: c.read_u16()?,
        fuel_usage_today: c.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableHeaterParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub on_temperature_offset: Temperature,
    pub off_temperature_offset: Temperature,
    pub min_on_time_minutes: u16,
    pub min_off_time_minutes: u16,
    pub mode: u8,
    pub btu_rating: u32,
    pub min_output_percent: u8,
    pub max_output_percent: u8,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableHeaterVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub current_output_percent: u8,
    pub target_output_percent: u8,
    pub runtime_today_minutes: u16,
    pub cycles_today: u16,
}

fn parse_variable_heater_parameters(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<VariableHeaterParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let on_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let off_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let min_on_time_minutes = c.read_u16()?;
    let min_off_time_minutes = c.read_u16()?;
    let mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let btu_rating = c.read_u32()?;
    let min_output_percent = c.read_byte()?;
    let max_output_percent = c.read_byte()?;
    let control_bits = c.read_u16()?;
    let interlock_bits = c.read_u16()?;
    Ok(VariableHeaterParameters {
        header,
        name_index,
        on_temperature_offset,
        off_temperature_offset,
        min_on_time_minutes,
        min_off_time_minutes,
        mode,
        btu_rating,
        min_output_percent,
        max_output_percent,
        control_bits,
        interlock_bits,
    })
}

fn parse_variable_heater_variables(
    c: &mut HexCursor,
    header: DeviceRecordHeader,
) -> Result<VariableHeaterVariables, PcmiError> {
    Ok(VariableHeaterVariables {
        header,
        status: c.read_u16()?,
        current_output_percent: c.read_byte()?,
        target_output_percent: c.read_byte()?,
        runtime_today_minutes: c.read_u16()?,
        cycles_today: c.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoolPadParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub on_temperature_offset: Temperature,
    pub off_temperature_offset: Temperature,
    pub min_on_time_minutes: u16,
    pub min_off_time_minutes: u16,
    pub mode: u8,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoolPadVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub runtime_today_minutes: u16,
    pub runtime_total_hours: u16,
    pub cycles_today: u16,
}

fn parse_cool_pad_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<CoolPadParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let on_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let off_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let min_on_time_minutes = c.read_u16()?;
    let min_off_time_minutes = c.read_u16()?;
    let mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let control_bits = c.read_u16()?;
    let interlock_bits = c.read_u16()?;
    Ok(CoolPadParameters {
        header,
        name_index,
        on_temperature_offset,
        off_temperature_offset,
        min_on_time_minutes,
        min_off_time_minutes,
        mode,
        control_bits,
        interlock_bits,
    })
}

fn parse_cool_pad_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<CoolPadVariables, PcmiError> {
    Ok(CoolPadVariables {
        header,
        status: c.read_u16()?,
        runtime_today_minutes: c.read_u16()?,
        runtime_total_hours: c.read_u16()?,
        cycles_today: c.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FanParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub on_temperature_offset: Temperature,
    pub off_temperature_offset: Temperature,
    pub min_on_time_minutes: u16,
    pub min_off_time_minutes: u16,
    pub mode: u8,
    pub cfm_rating: u16,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

fn parse_fan_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<FanParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let on_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let off_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let min_on_time_minutes = c.read_u16()?;
    let min_off_time_minutes = c.read_u16()?;
    let mode = c.read_byte()?;
    let cfm_rating = c.read_u16()?;
    let control_bits = c.read_u16()?;
    let interlock_bits = c.read_u16()?;
    Ok(FanParameters {
        header,
        name_index,
        on_temperature_offset,
        off_temperature_offset,
        min_on_time_minutes,
        min_off_time_minutes,
        mode,
        cfm_rating,
        control_bits,
        interlock_bits,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfdFanParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub on_temperature_offset: Temperature,
    pub off_temperature_offset: Temperature,
    pub min_on_time_minutes: u16,
    pub min_off_time_minutes: u16,
    pub mode: u8,
    pub cfm_rating: u16,
    pub min_speed_percent: u8,
    pub max_speed_percent: u8,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfdFanVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub current_speed_percent: u8,
    pub target_speed_percent: u8,
    pub runtime_today_minutes: u16,
    pub cycles_today: u16,
}

fn parse_vfd_fan_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<VfdFanParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let on_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let off_temperature_offset = Temperature::from_raw(c.read_i16()?);
    let min_on_time_minutes = c.read_u16()?;
    let min_off_time_minutes = c.read_u16()?;
    let mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let cfm_rating = c.read_u16()?;
    let min_speed_percent = c.read_byte()?;
    let max_speed_percent = c.read_byte()?;
    let control_bits = c.read_u16()?;
    let interlock_bits = c.read_u16()?;
    Ok(VfdFanParameters {
        header,
        name_index,
        on_temperature_offset,
        off_temperature_offset,
        min_on_time_minutes,
        min_off_time_minutes,
        mode,
        cfm_rating,
        min_speed_percent,
        max_speed_percent,
        control_bits,
        interlock_bits,
    })
}

fn parse_vfd_fan_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<VfdFanVariables, PcmiError> {
    Ok(VfdFanVariables {
        header,
        status: c.read_u16()?,
        current_speed_percent: c.read_byte()?,
        target_speed_percent: c.read_byte()?,
        runtime_today_minutes: c.read_u16()?,
        cycles_today: c.read_u16()?,
    })
}

// ---------------------------------------------------------------------------
// Timed, Switch, V10Lights.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TimedParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub on_minute_of_day: u16,
    pub off_minute_of_day: u16,
    pub mode: u8,
    pub control_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub runtime_today_minutes: u16,
    pub cycles_today: u16,
}

fn parse_timed_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<TimedParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let on_minute_of_day = c.read_u16()?;
    let off_minute_of_day = c.read_u16()?;
    let mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let control_bits = c.read_u16()?;
    Ok(TimedParameters {
        header,
        name_index,
        on_minute_of_day,
        off_minute_of_day,
        mode,
        control_bits,
    })
}

fn parse_timed_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<TimedVariables, PcmiError> {
    Ok(TimedVariables {
        header,
        status: c.read_u16()?,
        runtime_today_minutes: c.read_u16()?,
        cycles_today: c.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub mode: u8,
    pub control_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub runtime_today_minutes: u16,
    pub cycles_today: u16,
}

fn parse_switch_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<SwitchParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let control_bits = c.read_u16()?;
    Ok(SwitchParameters {
        header,
        name_index,
        mode,
        control_bits,
    })
}

fn parse_switch_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<SwitchVariables, PcmiError> {
    Ok(SwitchVariables {
        header,
        status: c.read_u16()?,
        runtime_today_minutes: c.read_u16()?,
        cycles_today: c.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightsParameters {
    pub header: DeviceRecordHeader,
    pub name_index: u16,
    pub on_minute_of_day: u16,
    pub off_minute_of_day: u16,
    pub sunrise_ramp_minutes: u16,
    pub sunset_ramp_minutes: u16,
    pub min_intensity_percent: u8,
    pub max_intensity_percent: u8,
    pub mode: u8,
    pub control_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightsVariables {
    pub header: DeviceRecordHeader,
    pub status: u16,
    pub current_intensity_percent: u8,
    pub runtime_today_minutes: u16,
}

fn parse_lights_parameters(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<LightsParameters, PcmiError> {
    let name_index = c.read_u16()?;
    let on_minute_of_day = c.read_u16()?;
    let off_minute_of_day = c.read_u16()?;
    let sunrise_ramp_minutes = c.read_u16()?;
    let sunset_ramp_minutes = c.read_u16()?;
    let min_intensity_percent = c.read_byte()?;
    let max_intensity_percent = c.read_byte()?;
    let mode = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    let control_bits = c.read_u16()?;
    Ok(LightsParameters {
        header,
        name_index,
        on_minute_of_day,
        off_minute_of_day,
        sunrise_ramp_minutes,
        sunset_ramp_minutes,
        min_intensity_percent,
        max_intensity_percent,
        mode,
        control_bits,
    })
}

fn parse_lights_variables(c: &mut HexCursor, header: DeviceRecordHeader) -> Result<LightsVariables, PcmiError> {
    let status = c.read_u16()?;
    let current_intensity_percent = c.read_byte()?;
    c.skip_bytes(1)?; // reserved
    Ok(LightsVariables {
        header,
        status,
        current_intensity_percent,
        runtime_today_minutes: c.read_u16()?,
    })
}

// ---------------------------------------------------------------------------
// Tagged unions, strategy dispatch, and registry.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceParameterRecord {
    AirSensor(AirSensorParameters),
    HumiditySensor(HumiditySensorParameters),
    FeedSensor(FeedSensorParameters),
    WaterSensor(WaterSensorParameters),
    StaticSensor(StaticSensorParameters),
    DigitalSensor(DigitalSensorParameters),
    PositionSensor(PositionSensorParameters),
    GasSensor(GasSensorParameters),
    Inlet(InletParameters),
    Curtain(CurtainParameters),
    RidgeVent(RidgeVentParameters),
    Chimney(ChimneyParameters),
    Heater(HeaterParameters),
    VariableHeater(VariableHeaterParameters),
    CoolPad(CoolPadParameters),
    Fan(FanParameters),
    VfdFan(VfdFanParameters),
    Timed(TimedParameters),
    Switch(SwitchParameters),
    V10Lights(LightsParameters),
    Generic(RawDeviceRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceVariableRecord {
    AirSensor(AirSensorVariables),
    HumiditySensor(HumiditySensorVariables),
    FeedSensor(FeedSensorVariables),
    WaterSensor(WaterSensorVariables),
    StaticSensor(StaticSensorVariables),
    DigitalSensor(DigitalSensorVariables),
    PositionSensor(PositionSensorVariables),
    GasSensor(GasSensorVariables),
    Inlet(InletVariables),
    Positional(PositionalVariables),
    Heater(HeaterVariables),
    VariableHeater(VariableHeaterVariables),
    CoolPad(CoolPadVariables),
    Fan(CoolPadVariables),
    VfdFan(VfdFanVariables),
    Timed(TimedVariables),
    Switch(SwitchVariables),
    V10Lights(LightsVariables),
    Generic(RawDeviceRecord),
}

/// Decodes the type-specific body following a device record header. Implemented
/// once per device type; the registry maps each of the 20 device type codes
/// onto one of these.
pub trait ParameterStrategy: Send + Sync {
    fn device_type(&self) -> DeviceType;
    fn parse(&self, cursor: &mut HexCursor, header: DeviceRecordHeader) -> Result<DeviceParameterRecord, PcmiError>;
}

pub trait VariableStrategy: Send + Sync {
    fn device_type(&self) -> DeviceType;
    fn parse(&self, cursor: &mut HexCursor, header: DeviceRecordHeader) -> Result<DeviceVariableRecord, PcmiError>;
}

macro_rules! strategy {
    ($name:ident, $dt:expr, param: $parse_param:expr => $param_variant:path, var: $parse_var:expr => $var_variant:path) => {
        pub struct $name;
        impl ParameterStrategy for $name {
            fn device_type(&self) -> DeviceType {
                $dt
            }
            fn parse(&self, cursor: &mut HexCursor, header: DeviceRecordHeader) -> Result<DeviceParameterRecord, PcmiError> {
                Ok($param_variant($parse_param(cursor, header)?))
            }
        }
        impl VariableStrategy for $name {
            fn device_type(&self) -> DeviceType {
                $dt
            }
            fn parse(&self, cursor: &mut HexCursor, header: DeviceRecordHeader) -> Result<DeviceVariableRecord, PcmiError> {
                Ok($var_variant($parse_var(cursor, header)?))
            }
        }
    };
}

strategy!(AirSensorStrategy, DeviceType::AirSensor,
    param: parse_air_sensor_parameters => DeviceParameterRecord::AirSensor,
    var: parse_air_sensor_variables => DeviceVariableRecord::AirSensor);
strategy!(HumiditySensorStrategy, DeviceType::HumiditySensor,
    param: parse_humidity_sensor_parameters => DeviceParameterRecord::HumiditySensor,
    var: parse_humidity_sensor_variables => DeviceVariableRecord::HumiditySensor);
strategy!(FeedSensorStrategy, DeviceType::FeedSensor,
    param: parse_feed_sensor_parameters => DeviceParameterRecord::FeedSensor,
    var: parse_feed_sensor_variables => DeviceVariableRecord::FeedSensor);
strategy!(WaterSensorStrategy, DeviceType::WaterSensor,
    param: parse_water_sensor_parameters => DeviceParameterRecord::WaterSensor,
    var: parse_water_sensor_variables => DeviceVariableRecord::WaterSensor);
strategy!(StaticSensorStrategy, DeviceType::StaticSensor,
    param: parse_static_sensor_parameters => DeviceParameterRecord::StaticSensor,
    var: parse_static_sensor_variables => DeviceVariableRecord::StaticSensor);
strategy!(DigitalSensorStrategy, DeviceType::DigitalSensor,
    param: parse_digital_sensor_parameters => DeviceParameterRecord::DigitalSensor,
    var: parse_digital_sensor_variables => DeviceVariableRecord::DigitalSensor);
strategy!(PositionSensorStrategy, DeviceType::PositionSensor,
    param: parse_position_sensor_parameters => DeviceParameterRecord::PositionSensor,
    var: parse_position_sensor_variables => DeviceVariableRecord::PositionSensor);
strategy!(GasSensorStrategy, DeviceType::GasSensor,
    param: parse_gas_sensor_parameters => DeviceParameterRecord::GasSensor,
    var: parse_gas_sensor_variables => DeviceVariableRecord::GasSensor);

strategy!(InletStrategy, DeviceType::Inlet,
    param: parse_inlet_parameters => DeviceParameterRecord::Inlet,
    var: parse_inlet_variables => DeviceVariableRecord::Inlet);
strategy!(CurtainStrategy, DeviceType::Curtain,
    param: parse_curtain_parameters => DeviceParameterRecord::Curtain,
    var: parse_positional_variables => DeviceVariableRecord::Positional);
strategy!(RidgeVentStrategy, DeviceType::RidgeVent,
    param: parse_ridge_vent_parameters => DeviceParameterRecord::RidgeVent,
    var: parse_positional_variables => DeviceVariableRecord::Positional);
strategy!(ChimneyStrategy, DeviceType::Chimney,
    param: parse_chimney_parameters => DeviceParameterRecord::Chimney,
    var: parse_positional_variables => DeviceVariableRecord::Positional);

strategy!(HeaterStrategy, DeviceType::Heater,
    param: parse_heater_parameters => DeviceParameterRecord::Heater,
    var: parse_heater_variables => DeviceVariableRecord::Heater);
strategy!(VariableHeaterStrategy, DeviceType::VariableHeater,
    param: parse_variable_heater_parameters => DeviceParameterRecord::VariableHeater,
    var: parse_variable_heater_variables => DeviceVariableRecord::VariableHeater);
strategy!(CoolPadStrategy, DeviceType::CoolPad,
    param: parse_cool_pad_parameters => DeviceParameterRecord::CoolPad,
    var: parse_cool_pad_variables => DeviceVariableRecord::CoolPad);
strategy!(FanStrategy, DeviceType::Fan,
    param: parse_fan_parameters => DeviceParameterRecord::Fan,
    var: parse_cool_pad_variables => DeviceVariableRecord::Fan);
strategy!(VfdFanStrategy, DeviceType::VfdFan,
    param: parse_vfd_fan_parameters => DeviceParameterRecord::VfdFan,
    var: parse_vfd_fan_variables => DeviceVariableRecord::VfdFan);

strategy!(TimedStrategy, DeviceType::Timed,
    param: parse_timed_parameters => DeviceParameterRecord::Timed,
    var: parse_timed_variables => DeviceVariableRecord::Timed);
strategy!(SwitchStrategy, DeviceType::Switch,
    param: parse_switch_parameters => DeviceParameterRecord::Switch,
    var: parse_switch_variables => DeviceVariableRecord::Switch);
strategy!(LightsStrategy, DeviceType::V10Lights,
    param: parse_lights_parameters => DeviceParameterRecord::V10Lights,
    var: parse_lights_variables => DeviceVariableRecord::V10Lights);

/// Keyed dispatch from device type code to its parsing strategy. A device
/// type with nothing registered falls back to [`RawDeviceRecord`] rather
/// than failing the whole download.
#[derive(Default)]
pub struct DeviceRegistry {
    parameter_strategies: HashMap<DeviceType, Box<dyn ParameterStrategy>>,
    variable_strategies: HashMap<DeviceType, Box<dyn VariableStrategy>>,
}

impl DeviceRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with strategies for all 20 known device types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        macro_rules! register_all {
            ($($strategy:expr),+ $(,)?) => {
                $(
                    let s = $strategy;
                    registry.register_parameter(Box::new(s));
                    let s = $strategy;
                    registry.register_variable(Box::new(s));
                )+
            };
        }

        register_all!(
            AirSensorStrategy,
            HumiditySensorStrategy,
            FeedSensorStrategy,
            WaterSensorStrategy,
            StaticSensorStrategy,
            DigitalSensorStrategy,
            PositionSensorStrategy,
            GasSensorStrategy,
            InletStrategy,
            CurtainStrategy,
            RidgeVentStrategy,
            ChimneyStrategy,
            HeaterStrategy,
            VariableHeaterStrategy,
            CoolPadStrategy,
            FanStrategy,
            VfdFanStrategy,
            TimedStrategy,
            SwitchStrategy,
            LightsStrategy,
        );

        registry
    }

    pub fn register_parameter(&mut self, strategy: Box<dyn ParameterStrategy>) {
        self.parameter_strategies.insert(strategy.device_type(), strategy);
    }

    pub fn register_variable(&mut self, strategy: Box<dyn VariableStrategy>) {
        self.variable_strategies.insert(strategy.device_type(), strategy);
    }

    pub fn unregister_parameter(&mut self, device_type: DeviceType) -> Option<Box<dyn ParameterStrategy>> {
        self.parameter_strategies.remove(&device_type)
    }

    pub fn unregister_variable(&mut self, device_type: DeviceType) -> Option<Box<dyn VariableStrategy>> {
        self.variable_strategies.remove(&device_type)
    }

    pub fn get_parameter(&self, device_type: DeviceType) -> Option<&dyn ParameterStrategy> {
        self.parameter_strategies.get(&device_type).map(|s| s.as_ref())
    }

    pub fn get_variable(&self, device_type: DeviceType) -> Option<&dyn VariableStrategy> {
        self.variable_strategies.get(&device_type).map(|s| s.as_ref())
    }

    pub fn has_parameter(&self, device_type: DeviceType) -> bool {
        self.parameter_strategies.contains_key(&device_type)
    }

    pub fn has_variable(&self, device_type: DeviceType) -> bool {
        self.variable_strategies.contains_key(&device_type)
    }

    pub fn clear(&mut self) {
        self.parameter_strategies.clear();
        self.variable_strategies.clear();
    }
}

pub fn parse_device_parameter_record(
    hex_data: &str,
    endian_override: Option<Endian>,
    registry: &DeviceRegistry,
) -> Result<DeviceParameterRecord, PcmiError> {
    if hex_data.len() / 2 < HEADER_SIZE_BYTES {
        return Err(PcmiError::Parse {
            record_type: "DeviceParameterRecord",
            offset: 0,
            raw_data: hex_data.to_string(),
        });
    }
    let endian = resolve_endian(hex_data, endian_override)?;
    let mut cursor = HexCursor::new(hex_data, endian, "DeviceParameterRecord");
    let header = read_header(&mut cursor)?;

    match registry.get_parameter(header.device_type) {
        Some(strategy) => strategy.parse(&mut cursor, header),
        None => {
            let raw_hex = cursor.slice(cursor.remaining_bytes())?;
            Ok(DeviceParameterRecord::Generic(RawDeviceRecord { header, raw_hex }))
        }
    }
}

pub fn parse_device_variable_record(
    hex_data: &str,
    endian_override: Option<Endian>,
    registry: &DeviceRegistry,
) -> Result<DeviceVariableRecord, PcmiError> {
    if hex_data.len() / 2 < HEADER_SIZE_BYTES {
        return Err(PcmiError::Parse {
            record_type: "DeviceVariableRecord",
            offset: 0,
            raw_data: hex_data.to_string(),
        });
    }
    let endian = resolve_endian(hex_data, endian_override)?;
    let mut cursor = HexCursor::new(hex_data, endian, "DeviceVariableRecord");
    let header = read_header(&mut cursor)?;

    match registry.get_variable(header.device_type) {
        Some(strategy) => strategy.parse(&mut cursor, header),
        None => {
            let raw_hex = cursor.slice(cursor.remaining_bytes())?;
            Ok(DeviceVariableRecord::Generic(RawDeviceRecord { header, raw_hex }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_hex(device_type: u8) -> String {
        // record_size=6, zone=1, record_type=0, format byte (format 0, subtype 0), device_type, module=1, channel=2
        format!("0600010000{device_type:02X}0102")
    }

    #[test]
    fn default_registry_covers_all_twenty_device_types() {
        let registry = DeviceRegistry::with_defaults();
        let all = [
            DeviceType::AirSensor,
            DeviceType::HumiditySensor,
            DeviceType::Inlet,
            DeviceType::Curtain,
            DeviceType::RidgeVent,
            DeviceType::Heater,
            DeviceType::CoolPad,
            DeviceType::Fan,
            DeviceType::Timed,
            DeviceType::FeedSensor,
            DeviceType::WaterSensor,
            DeviceType::StaticSensor,
            DeviceType::DigitalSensor,
            DeviceType::PositionSensor,
            DeviceType::Chimney,
            DeviceType::Switch,
            DeviceType::VariableHeater,
            DeviceType::VfdFan,
            DeviceType::V10Lights,
            DeviceType::GasSensor,
        ];
        for dt in all {
            assert!(registry.has_parameter(dt), "{dt:?} missing a parameter strategy");
            assert!(registry.has_variable(dt), "{dt:?} missing a variable strategy");
        }
    }

    #[test]
    fn unregistered_device_falls_back_to_generic() {
        let registry = DeviceRegistry::empty();
        let hex = format!("{}{}", header_hex(DeviceType::AirSensor.into()), "0102030405");
        let record = parse_device_parameter_record(&hex, Some(Endian::NonSwap), &registry).unwrap();
        assert!(matches!(record, DeviceParameterRecord::Generic(_)));
    }

    #[test]
    fn air_sensor_parameter_record_round_trips() {
        let registry = DeviceRegistry::with_defaults();
        let hex = format!(
            "{}{}",
            header_hex(DeviceType::AirSensor.into()),
            "0100D00202" // name_index=1, calibration_offset=720 (72F), sensor_type=2
        );
        let record = parse_device_parameter_record(&hex, Some(Endian::NonSwap), &registry).unwrap();
        match record {
            DeviceParameterRecord::AirSensor(s) => {
                assert_eq!(s.header.device_type, DeviceType::AirSensor);
                assert_eq!(s.name_index, 1);
                assert_eq!(s.calibration_offset.fahrenheit(), Some(72.0));
                assert_eq!(s.sensor_type, 2);
            }
            other => panic!("expected AirSensor, got {other:?}"),
        }
    }

    #[test]
    fn inlet_parameters_parse_positional_core_and_static_setpoint() {
        let registry = DeviceRegistry::with_defaults();
        let hex = format!(
            "{}{}",
            header_hex(DeviceType::Inlet.into()),
            // name=1, min=10, max=100, open=30, close=40, mode=0, resv,
            // static_setpoint=0, offset=720 (72F), deg/pct=10, resv, control_bits=0
            "01000A641E00280000000000D0020A000000"
        );
        let record = parse_device_parameter_record(&hex, Some(Endian::NonSwap), &registry).unwrap();
        match record {
            DeviceParameterRecord::Inlet(p) => {
                assert_eq!(p.core.min_position, 10);
                assert_eq!(p.core.max_position, 100);
                assert_eq!(p.temperature_offset.fahrenheit(), Some(72.0));
                assert_eq!(p.position_per_degree, 10);
            }
            other => panic!("expected Inlet, got {other:?}"),
        }
    }

    #[test]
    fn fan_and_cool_pad_share_variable_shape() {
        let registry = DeviceRegistry::with_defaults();
        let hex = format!(
            "{}{}",
            header_hex(DeviceType::Fan.into()),
            "0100" /* status */.to_string() + "1E00" /* runtime */ + "0A00" /* total hours */ + "0200" /* cycles */
        );
        let record = parse_device_variable_record(&hex, Some(Endian::NonSwap), &registry).unwrap();
        match record {
            DeviceVariableRecord::Fan(v) => {
                assert_eq!(v.status, 1);
                assert_eq!(v.cycles_today, 2);
            }
            other => panic!("expected Fan, got {other:?}"),
        }
    }

    #[test]
    fn unregister_removes_a_strategy() {
        let mut registry = DeviceRegistry::with_defaults();
        assert!(registry.unregister_parameter(DeviceType::Heater).is_some());
        assert!(!registry.has_parameter(DeviceType::Heater));
    }
}
