//! The PCMI client state machine: connect, disconnect, and the single- and
//! multi-record download conversations built on top of a [`Transport`].

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::codec::{append_checksum, hex_encode, Endian};
use crate::command::CommandCode;
use crate::constants::{DISCONNECT_TIMEOUT, ETX, MAX_RETRIES, RETRY_DELAY, STX};
use crate::error::{controller_error_message, PcmiError};
use crate::frame::{self, ParsedFrame};
use crate::records::alarm::{parse_alarm_list, AlarmList};
use crate::records::device::{
    parse_device_parameter_record, parse_device_variable_record, DeviceParameterRecord, DeviceRegistry,
    DeviceVariableRecord,
};
use crate::records::history::{parse_history, HistoryGroup, HistoryRecord};
use crate::records::zone::{parse_zone_parameters, parse_zone_variables, ZoneParameters, ZoneVariables};
use crate::transport::Transport;
use crate::value::SerialNumber;

/// Timeout, retry, and serial-line settings for a [`PcmiClient`]. Defaults
/// match the protocol's documented values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientConfig {
    pub receive_timeout: Duration,
    pub max_retries: u32,
    pub baud_rate: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            receive_timeout: crate::constants::DEFAULT_RECEIVE_TIMEOUT,
            max_retries: MAX_RETRIES,
            baud_rate: crate::constants::DEFAULT_BAUD_RATE,
        }
    }
}

/// Where the client sits in the connect/download conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,
    Connecting,
    Connected,
    Downloading,
    Disconnecting,
}

fn build_frame(command: u8, length_prefix: Option<&str>, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![command];
    if let Some(prefix) = length_prefix {
        body.extend_from_slice(prefix.as_bytes());
    }
    body.extend_from_slice(payload);

    let mut frame = vec![STX];
    frame.extend(append_checksum(&body));
    frame.push(ETX);
    frame
}

fn zone_selector(zone: u8) -> String {
    hex_encode(&[zone])
}

fn endian_override_for(command: CommandCode) -> Option<Endian> {
    command.is_nonswap_response().then_some(Endian::NonSwap)
}

fn explicit_endian_for(command: CommandCode) -> Endian {
    if command.is_nonswap_response() {
        Endian::NonSwap
    } else {
        Endian::Swap
    }
}

/// Resets `state` back to `Connected` (or `Disconnected`, if the transport
/// turned out to be unusable) when a download ends - by success, by a
/// propagated error, or by the calling future simply being dropped.
struct DownloadGuard<'a> {
    state: &'a mut ClientState,
    transport_closed: bool,
}

impl Drop for DownloadGuard<'_> {
    fn drop(&mut self) {
        if *self.state == ClientState::Downloading {
            *self.state = if self.transport_closed {
                ClientState::Disconnected
            } else {
                ClientState::Connected
            };
        }
    }
}

fn is_transport_fatal(err: &PcmiError) -> bool {
    matches!(err, PcmiError::Io(_) | PcmiError::TransportClosed | PcmiError::PortOpen(_))
}

/// Reads one response off the wire. Acknowledgment-shaped and error-code
/// responses are a single byte with no length, checksum, or ETX; everything
/// else is read out to its terminating ETX and handed to [`frame::parse`].
async fn read_response<Tr: Transport>(transport: &mut Tr, timeout_dur: Duration) -> Result<ParsedFrame, PcmiError> {
    let byte = tokio::time::timeout(timeout_dur, transport.read_byte())
        .await
        .map_err(|_| PcmiError::timeout(timeout_dur))??;
    let command = CommandCode::from(byte);
    if command.is_acknowledgment() || command.is_error() {
        return Ok(ParsedFrame {
            command,
            payload_bytes: Vec::new(),
            payload_hex: String::new(),
            length_indicator: None,
        });
    }

    let rest = tokio::time::timeout(timeout_dur, transport.read_until(ETX))
        .await
        .map_err(|_| PcmiError::timeout(timeout_dur))??;
    let mut full = vec![byte];
    full.extend(rest);
    frame::parse(&full)
}

/// Runs the write-request / read-frames-until-sentinel loop shared by every
/// multi-record download. `state` and `transport` are passed as separate
/// borrows so callers can also hold an immutable borrow of their registry
/// for `parse_record` without fighting the borrow checker over `&mut self`.
async fn run_multi_record_download<Tr, T>(
    state: &mut ClientState,
    transport: &mut Tr,
    timeout_dur: Duration,
    request: Vec<u8>,
    mut parse_record: impl FnMut(CommandCode, &ParsedFrame) -> Result<T, PcmiError>,
    mut on_record: impl FnMut(T) -> Result<(), PcmiError>,
) -> Result<(), PcmiError>
where
    Tr: Transport,
{
    if *state != ClientState::Connected {
        return Err(PcmiError::InvalidState("download requires the Connected state"));
    }
    *state = ClientState::Downloading;
    let mut guard = DownloadGuard {
        state,
        transport_closed: false,
    };

    let result: Result<(), PcmiError> = async {
        transport.write_all(&request).await?;
        loop {
            let parsed = read_response(transport, timeout_dur).await?;

            if parsed.command == CommandCode::EndOfRecord || parsed.command == CommandCode::ErrorNoZone {
                return Ok(());
            }
            if parsed.command.is_error() {
                return Err(PcmiError::Controller {
                    code: parsed.command.code(),
                    message: controller_error_message(parsed.command.code()),
                });
            }

            let record = parse_record(parsed.command, &parsed)?;
            on_record(record)?;
            transport.write_all(&[CommandCode::OkSendNext.code()]).await?;
        }
    }
    .await;

    if let Err(e) = &result {
        if is_transport_fatal(e) {
            guard.transport_closed = true;
        }
    }
    result
}

/// A connected or connecting client driving a PCMI conversation over `T`.
pub struct PcmiClient<T: Transport> {
    transport: T,
    state: ClientState,
    serial_number: Option<SerialNumber>,
    timeout: Duration,
    max_retries: u32,
    registry: DeviceRegistry,
}

impl<T: Transport> PcmiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ClientState::Disconnected,
            serial_number: None,
            timeout: crate::constants::DEFAULT_RECEIVE_TIMEOUT,
            max_retries: MAX_RETRIES,
            registry: DeviceRegistry::with_defaults(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builds a client from a full [`ClientConfig`] in one step.
    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self::new(transport).with_timeout(config.receive_timeout).with_max_retries(config.max_retries)
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn serial_number(&self) -> Option<&SerialNumber> {
        self.serial_number.as_ref()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    /// Connects and authenticates with the controller at `serial`, an
    /// 8-digit decimal serial number. Retries up to `max_retries` additional
    /// times on a read timeout, discarding buffered bytes and resending the
    /// request frame between attempts.
    pub async fn connect(&mut self, serial: &str) -> Result<(), PcmiError> {
        if self.state != ClientState::Disconnected {
            return Err(PcmiError::InvalidState("connect requires the Disconnected state"));
        }
        let serial_number = SerialNumber::parse(serial)?;

        if !self.transport.is_open() {
            self.transport.open().await?;
        }
        self.state = ClientState::Connecting;

        let frame = build_frame(CommandCode::SerialNumber.code(), Some("08"), serial_number.as_str().as_bytes());
        let mut attempt = 0u32;

        loop {
            if let Err(e) = self.transport.write_all(&frame).await {
                self.state = ClientState::Disconnected;
                return Err(e);
            }

            match read_response(&mut self.transport, self.timeout).await {
                Ok(parsed) => {
                    if parsed.command == CommandCode::SnAck {
                        debug!(serial = %serial_number, "connected");
                        self.serial_number = Some(serial_number);
                        self.state = ClientState::Connected;
                        return Ok(());
                    }
                    self.state = ClientState::Disconnected;
                    if parsed.command.is_error() {
                        return Err(PcmiError::Controller {
                            code: parsed.command.code(),
                            message: controller_error_message(parsed.command.code()),
                        });
                    }
                    return Err(PcmiError::Frame(format!(
                        "unexpected response to connect: {:?}",
                        parsed.command
                    )));
                }
                Err(PcmiError::Timeout { .. }) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        self.state = ClientState::Disconnected;
                        return Err(PcmiError::timeout(self.timeout));
                    }
                    warn!(attempt, "connect timed out, retrying");
                    let _ = self.transport.discard_buffers().await;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    self.state = ClientState::Disconnected;
                    return Err(e);
                }
            }
        }
    }

    /// Sends `PCMI_BREAK` and tears down the conversation. A no-op if
    /// already disconnected; tolerant of transport errors on the way out,
    /// since the end state is `Disconnected` either way.
    pub async fn disconnect(&mut self) -> Result<(), PcmiError> {
        if self.state == ClientState::Disconnected {
            return Ok(());
        }
        self.state = ClientState::Disconnecting;

        let frame = build_frame(CommandCode::Break.code(), None, &[]);
        let _ = self.transport.write_all(&frame).await;
        let _ = tokio::time::timeout(DISCONNECT_TIMEOUT, self.transport.read_byte()).await;
        let _ = self.transport.close().await;

        self.state = ClientState::Disconnected;
        self.serial_number = None;
        Ok(())
    }

    /// Reads the controller's version string. The only single-record
    /// download - one request, one response frame, no acknowledgment loop.
    pub async fn download_version(&mut self) -> Result<String, PcmiError> {
        if self.state != ClientState::Connected {
            return Err(PcmiError::InvalidState("download requires the Connected state"));
        }
        self.state = ClientState::Downloading;
        let mut guard = DownloadGuard {
            state: &mut self.state,
            transport_closed: false,
        };

        let result: Result<String, PcmiError> = async {
            let request = build_frame(CommandCode::SendVersion.code(), None, &[]);
            self.transport.write_all(&request).await?;
            let parsed = read_response(&mut self.transport, self.timeout).await?;
            if parsed.command.is_error() {
                return Err(PcmiError::Controller {
                    code: parsed.command.code(),
                    message: controller_error_message(parsed.command.code()),
                });
            }
            trace!(command = ?parsed.command, "received version response");
            Ok(String::from_utf8_lossy(&parsed.payload_bytes).trim().to_string())
        }
        .await;

        if let Err(e) = &result {
            if is_transport_fatal(e) {
                guard.transport_closed = true;
            }
        }
        result
    }

    /// Streams zone parameter records for `zone` (0 = all zones), handing
    /// each one to `on_record` as it arrives.
    pub async fn download_zone_parameters(
        &mut self,
        zone: u8,
        mut on_record: impl FnMut(ZoneParameters) -> Result<(), PcmiError>,
    ) -> Result<(), PcmiError> {
        let request = build_frame(CommandCode::SendZoneParm.code(), None, zone_selector(zone).as_bytes());
        let timeout_dur = self.timeout;
        run_multi_record_download(
            &mut self.state,
            &mut self.transport,
            timeout_dur,
            request,
            |command, parsed| parse_zone_parameters(&parsed.payload_hex, endian_override_for(command)),
            &mut on_record,
        )
        .await
    }

    /// Streams zone variable records for `zone` (0 = all zones).
    pub async fn download_zone_variables(
        &mut self,
        zone: u8,
        mut on_record: impl FnMut(ZoneVariables) -> Result<(), PcmiError>,
    ) -> Result<(), PcmiError> {
        let request = build_frame(CommandCode::SendZoneVar.code(), None, zone_selector(zone).as_bytes());
        let timeout_dur = self.timeout;
        run_multi_record_download(
            &mut self.state,
            &mut self.transport,
            timeout_dur,
            request,
            |command, parsed| parse_zone_variables(&parsed.payload_hex, endian_override_for(command)),
            &mut on_record,
        )
        .await
    }

    /// Streams history records for `zone` (0 = all zones) and `group`.
    pub async fn download_history(
        &mut self,
        zone: u8,
        group: HistoryGroup,
        mut on_record: impl FnMut(HistoryRecord) -> Result<(), PcmiError>,
    ) -> Result<(), PcmiError> {
        let payload = hex_encode(&[zone, group.into()]);
        let request = build_frame(CommandCode::SendHistory.code(), None, payload.as_bytes());
        let timeout_dur = self.timeout;
        run_multi_record_download(
            &mut self.state,
            &mut self.transport,
            timeout_dur,
            request,
            |command, parsed| parse_history(&parsed.payload_hex, explicit_endian_for(command)),
            &mut on_record,
        )
        .await
    }

    /// Streams one [`AlarmList`] per zone for `zone` (0 = all zones).
    pub async fn download_alarms(
        &mut self,
        zone: u8,
        mut on_record: impl FnMut(AlarmList) -> Result<(), PcmiError>,
    ) -> Result<(), PcmiError> {
        let request = build_frame(CommandCode::SendAlarm.code(), None, zone_selector(zone).as_bytes());
        let timeout_dur = self.timeout;
        run_multi_record_download(
            &mut self.state,
            &mut self.transport,
            timeout_dur,
            request,
            |command, parsed| parse_alarm_list(&parsed.payload_hex, explicit_endian_for(command)),
            &mut on_record,
        )
        .await
    }

    /// Streams device parameter records for `zone` (0 = all zones).
    pub async fn download_device_parameters(
        &mut self,
        zone: u8,
        mut on_record: impl FnMut(DeviceParameterRecord) -> Result<(), PcmiError>,
    ) -> Result<(), PcmiError> {
        let request = build_frame(CommandCode::SendParmData.code(), None, zone_selector(zone).as_bytes());
        let timeout_dur = self.timeout;
        let registry = &self.registry;
        run_multi_record_download(
            &mut self.state,
            &mut self.transport,
            timeout_dur,
            request,
            |command, parsed| parse_device_parameter_record(&parsed.payload_hex, endian_override_for(command), registry),
            &mut on_record,
        )
        .await
    }

    /// Streams device variable records for `zone` (0 = all zones).
    pub async fn download_device_variables(
        &mut self,
        zone: u8,
        mut on_record: impl FnMut(DeviceVariableRecord) -> Result<(), PcmiError>,
    ) -> Result<(), PcmiError> {
        let request = build_frame(CommandCode::SendVarData.code(), None, zone_selector(zone).as_bytes());
        let timeout_dur = self.timeout;
        let registry = &self.registry;
        run_multi_record_download(
            &mut self.state,
            &mut self.transport,
            timeout_dur,
            request,
            |command, parsed| parse_device_variable_record(&parsed.payload_hex, endian_override_for(command), registry),
            &mut on_record,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn ack_frame(command: CommandCode) -> Vec<u8> {
        vec![command.code()]
    }

    fn data_frame(command: CommandCode, payload_hex: &str) -> Vec<u8> {
        let byte_count = payload_hex.len() / 2;
        let rli = if command.is_two_byte_rli() {
            crate::length::encode_2byte_rli(byte_count).unwrap()
        } else {
            crate::length::encode_1byte_rli(byte_count).unwrap()
        };
        let mut body = vec![command.code()];
        body.extend_from_slice(rli.as_bytes());
        body.extend_from_slice(payload_hex.as_bytes());
        let mut frame = append_checksum(&body);
        frame.push(ETX);
        frame
    }

    #[tokio::test]
    async fn connect_succeeds_on_sn_ack() {
        let mut transport = MockTransport::new();
        transport.queue_inbound(&ack_frame(CommandCode::SnAck));
        let mut client = PcmiClient::new(transport);

        client.connect("00009001").await.unwrap();
        assert_eq!(client.state(), ClientState::Connected);
        assert_eq!(client.serial_number().unwrap().as_str(), "00009001");
    }

    #[tokio::test]
    async fn connect_rejects_invalid_serial_without_touching_transport() {
        let transport = MockTransport::new();
        let mut client = PcmiClient::new(transport);
        let err = client.connect("bad").await.unwrap_err();
        assert!(matches!(err, PcmiError::InvalidSerialNumber(_)));
        assert_eq!(client.state(), ClientState::Disconnected);
    }

    #[tokio::test]
    async fn connect_surfaces_controller_error() {
        let mut transport = MockTransport::new();
        transport.queue_inbound(&[CommandCode::ErrorBadSerial.code()]);
        let mut client = PcmiClient::new(transport);

        let err = client.connect("00009001").await.unwrap_err();
        assert!(matches!(err, PcmiError::Controller { code, .. } if code == CommandCode::ErrorBadSerial.code()));
        assert_eq!(client.state(), ClientState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_retries_then_fails_after_exhausting_timeouts() {
        let transport = MockTransport::new();
        let mut client = PcmiClient::new(transport).with_timeout(Duration::from_millis(10)).with_max_retries(2);

        let err = client.connect("00009001").await.unwrap_err();
        assert!(matches!(err, PcmiError::Timeout { .. }));
        assert_eq!(client.state(), ClientState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_from_disconnected_is_a_no_op() {
        let transport = MockTransport::new();
        let mut client = PcmiClient::new(transport);
        client.disconnect().await.unwrap();
        assert_eq!(client.state(), ClientState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_resets_state_even_without_an_ack() {
        let mut transport = MockTransport::new();
        transport.queue_inbound(&ack_frame(CommandCode::SnAck));
        let mut client = PcmiClient::new(transport);
        client.connect("00009001").await.unwrap();

        client.disconnect().await.unwrap();
        assert_eq!(client.state(), ClientState::Disconnected);
        assert!(client.serial_number().is_none());
    }

    #[tokio::test]
    async fn download_version_reads_cr_delimited_response() {
        let mut transport = MockTransport::new();
        transport.queue_inbound(&ack_frame(CommandCode::SnAck));
        let mut client = PcmiClient::new(transport);
        client.connect("00009001").await.unwrap();

        let version_frame = {
            let mut body = vec![CommandCode::SvString.code()];
            body.extend_from_slice(b"V2.10");
            let mut f = append_checksum(&body);
            f.push(ETX);
            f
        };
        client.transport.queue_inbound(&version_frame);

        let version = client.download_version().await.unwrap();
        assert_eq!(version, "V2.10");
        assert_eq!(client.state(), ClientState::Connected);
    }

    #[tokio::test]
    async fn zone_parameters_stream_yields_until_end_of_record() {
        let mut transport = MockTransport::new();
        transport.queue_inbound(&ack_frame(CommandCode::SnAck));
        let mut client = PcmiClient::new(transport);
        client.connect("00009001").await.unwrap();

        // Minimal valid ZoneParameters payload: 21 words (42 bytes), little-endian.
        let payload_hex = "0C00".to_string() // record_size
            + "01" // zone
            + "00" // record_type
            + "0300" // format byte (temp_control_mode=3), reserved
            + "D002" // setpoint = 720
            + "0000000000000000" // 4x alarm/inhibit temps
            + "00000000" // fixed high/low
            + "0100" // interlock
            + "0200" // zone_bits
            + "3200" // humidity setpoint, reserved
            + "0A00" // humidity off
            + "0500" // humidity purge
            + "0100" // age
            + "0200" // projected age
            + "0300" // weight
            + "0400" // begin head count
            + "0000" // mortality
            + "0000"; // sold
        client
            .transport
            .queue_inbound(&data_frame(CommandCode::ZpStringTwo, &payload_hex));
        client.transport.queue_inbound(&ack_frame(CommandCode::EndOfRecord));

        let mut seen = Vec::new();
        client.download_zone_parameters(0, |z| { seen.push(z); Ok(()) }).await.unwrap();

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].zone_number, 1);
        assert_eq!(seen[0].setpoint.fahrenheit(), Some(72.0));
        assert_eq!(client.state(), ClientState::Connected);
        // one OK_SEND_NEXT ack between the data frame and the terminal sentinel request
        assert!(client
            .transport
            .writes()
            .iter()
            .any(|w| w == &[CommandCode::OkSendNext.code()]));
    }

    #[tokio::test]
    async fn download_requires_connected_state() {
        let transport = MockTransport::new();
        let mut client = PcmiClient::new(transport);
        let err = client.download_zone_parameters(0, |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, PcmiError::InvalidState(_)));
    }

    #[tokio::test]
    async fn alarm_list_stream_reports_a_controller_error_as_the_terminal_result() {
        let mut transport = MockTransport::new();
        transport.queue_inbound(&ack_frame(CommandCode::SnAck));
        let mut client = PcmiClient::new(transport);
        client.connect("00009001").await.unwrap();

        client.transport.queue_inbound(&ack_frame(CommandCode::ErrorGeneric));

        let err = client.download_alarms(0, |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, PcmiError::Controller { .. }));
        // a non-fatal controller error returns the client to Connected, not Disconnected
        assert_eq!(client.state(), ClientState::Connected);
    }
}
