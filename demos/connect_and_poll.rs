//! Connects to a controller over a real serial port, downloads its zone
//! parameters and variables, and prints a summary.
//!
//! Mirrors the teacher's own `device_info`-style CLI examples: `clap` for
//! argument parsing, `clap-verbosity-flag` + `tracing-subscriber` for
//! logging, one `#[tokio::main]` entry point.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use pcmi_client::{ClientConfig, PcmiClient, SerialTransport, TemperatureUnit};

#[derive(Parser, Debug)]
#[command(version, about = "Connect to a Valco climate controller and print its zone state")]
struct Args {
    /// Serial port path, e.g. /dev/ttyUSB0 or COM3.
    #[arg(long)]
    port: String,

    /// Controller's 8-digit decimal serial number.
    #[arg(long)]
    serial: String,

    /// Zone to query, 0 = all zones.
    #[arg(long, default_value_t = 0)]
    zone: u8,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbosity.tracing_level_filter())
        .init();

    let transport = SerialTransport::new(&args.port);
    let mut client = PcmiClient::with_config(transport, ClientConfig::default());

    client.connect(&args.serial).await?;
    println!("Connected to controller {}", args.serial);

    client
        .download_zone_parameters(args.zone, |record| {
            println!(
                "zone {} setpoint {}",
                record.zone_number,
                record.setpoint.format(TemperatureUnit::Fahrenheit)
            );
            Ok(())
        })
        .await?;

    client
        .download_zone_variables(args.zone, |record| {
            println!(
                "zone {} actual {} humidity {}%",
                record.zone_number,
                record.actual_temperature.format(TemperatureUnit::Fahrenheit),
                record.actual_humidity
            );
            Ok(())
        })
        .await?;

    client.disconnect().await?;
    Ok(())
}
