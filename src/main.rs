use std::path::PathBuf;

use anyhow::Context as _;
use btleplug::api::Manager as _;
use btleplug::platform::Manager;
use clap::{Parser, Subcommand};
use log::info;
use uuid::Uuid;

mod advertisement;
mod battery;
mod classifier;
mod config;
mod decoder;
mod error;
mod manager;
mod mqtt;
mod reading;

use advertisement::Advertisement;
use classifier::DispatchRevision;

/// Decode BLE tire pressure sensors and publish their readings to MQTT
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan for sensors and publish readings (default)
    Monitor,
    /// Decode a single captured advertisement and print the reading as JSON
    Decode {
        /// Manufacturer/company id, decimal or 0x-prefixed hex
        #[arg(long, value_parser = parse_company_id)]
        company: u16,

        /// Manufacturer payload as hex
        #[arg(long)]
        payload: String,

        /// Advertised service UUIDs
        #[arg(long = "service")]
        services: Vec<Uuid>,

        #[arg(long, default_value = "00:00:00:00:00:00")]
        address: String,

        #[arg(long)]
        rssi: Option<i16>,

        #[arg(long, value_enum, default_value_t = DispatchRevision::Current)]
        revision: DispatchRevision,
    },
}

fn parse_company_id(value: &str) -> Result<u16, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid company id {value:?}: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let args = Args::parse();

    match args.command.unwrap_or(Command::Monitor) {
        Command::Monitor => monitor(args.config).await,
        Command::Decode {
            company,
            payload,
            services,
            address,
            rssi,
            revision,
        } => {
            let payload = hex::decode(payload.trim()).context("payload is not valid hex")?;
            let mut adv = Advertisement::new(address).with_manufacturer_data(company, payload);
            if let Some(rssi) = rssi {
                adv = adv.with_rssi(rssi);
            }
            for uuid in services {
                adv = adv.with_service(uuid);
            }

            let outcome = decoder::decode(&adv, revision);
            outcome.emit_diagnostics();
            info!("Variant: {}", outcome.variant);
            let reading = outcome
                .result
                .context("advertisement produced no reading")?;
            println!("{}", serde_json::to_string_pretty(&reading)?);
            Ok(())
        }
    }
}

async fn monitor(config_path: PathBuf) -> anyhow::Result<()> {
    let config = config::AppConfig::load(&config_path)?;

    info!("Devices: {:?}", config.devices);

    let (mqtt_client, eventloop) = mqtt::MqttClient::new(&config.mqtt);

    let bt_manager = Manager::new().await?;

    // get the first bluetooth adapter
    let adapters = bt_manager.adapters().await?;
    let central = adapters
        .into_iter()
        .next()
        .context("no Bluetooth adapter found")?;

    let core = manager::Manager::new(central, mqtt_client, eventloop, config);
    core.run_loop().await
}
