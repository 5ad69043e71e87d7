//! End-to-end device parameter/variable downloads, exercising the registry's
//! per-device-type strategies through the client rather than by calling the
//! parser functions directly.

mod common;

use common::{length_prefixed_frame, transport_with_connect_ack};
use pcmi_client::{ClientState, CommandCode, DeviceParameterRecord, DeviceType, PcmiClient};

fn air_sensor_header_and_body() -> String {
    // record_size=6, zone=1, record_type=0, format(0)/subtype(0), AirSensor=1, module=1, channel=1
    let header = "06000100000101" .to_string() + "01"; // last byte channel
    let body = "0100" // name_index
        .to_string()
        + "D002" // calibration_offset = 720 -> 72F
        + "02"; // sensor_type
    header + &body
}

#[tokio::test]
async fn device_parameter_download_dispatches_to_the_air_sensor_strategy() {
    let mut transport = transport_with_connect_ack();

    let payload = air_sensor_header_and_body();
    let rli = pcmi_client::length::encode_2byte_rli(payload.len() / 2).unwrap();
    transport.queue_inbound(&length_prefixed_frame(CommandCode::PdStringTwo, &rli, &payload));
    transport.queue_inbound(&[CommandCode::EndOfRecord.code()]);

    let mut client = PcmiClient::new(transport);
    client.connect("00009001").await.unwrap();

    let mut seen = Vec::new();
    client.download_device_parameters(1, |r| { seen.push(r); Ok(()) }).await.unwrap();

    assert_eq!(seen.len(), 1);
    match &seen[0] {
        DeviceParameterRecord::AirSensor(s) => {
            assert_eq!(s.header.device_type, DeviceType::AirSensor);
            assert_eq!(s.header.zone_number, 1);
            assert_eq!(s.calibration_offset.fahrenheit(), Some(72.0));
            assert_eq!(s.sensor_type, 2);
        }
        other => panic!("expected AirSensor, got {other:?}"),
    }
    assert_eq!(client.state(), ClientState::Connected);
}

#[tokio::test]
async fn unregistering_a_strategy_falls_back_to_generic_records() {
    let mut transport = transport_with_connect_ack();

    let payload = air_sensor_header_and_body();
    let rli = pcmi_client::length::encode_2byte_rli(payload.len() / 2).unwrap();
    transport.queue_inbound(&length_prefixed_frame(CommandCode::PdStringTwo, &rli, &payload));
    transport.queue_inbound(&[CommandCode::EndOfRecord.code()]);

    let mut client = PcmiClient::new(transport);
    client.connect("00009001").await.unwrap();
    client.registry_mut().unregister_parameter(DeviceType::AirSensor);

    let mut seen = Vec::new();
    client.download_device_parameters(1, |r| { seen.push(r); Ok(()) }).await.unwrap();

    assert_eq!(seen.len(), 1);
    assert!(matches!(seen[0], DeviceParameterRecord::Generic(_)));
}
