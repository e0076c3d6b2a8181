use std::collections::HashMap;
use std::time::{Duration, Instant};

use btleplug::api::{Central as _, CentralEvent, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, PeripheralId};
use futures::StreamExt as _;
use log::{debug, info, warn};
use mac_address::MacAddress;

use crate::advertisement::Advertisement;
use crate::config::AppConfig;
use crate::decoder;
use crate::mqtt::MqttClient;
use crate::reading::DecodedReading;

pub struct Manager {
    adapter: Adapter,
    mqtt_client: MqttClient,
    mqtt_event_loop: rumqttc::EventLoop,
    config: AppConfig,
}

/// Decides which decoded readings are published, and under which channel.
pub struct PublishGate {
    config: AppConfig,
    debounce: Duration,
    last_published: HashMap<String, Instant>,
}

impl PublishGate {
    pub fn new(config: AppConfig) -> Self {
        let debounce = config
            .scan
            .as_ref()
            .and_then(|s| s.publish_debounce_seconds)
            .unwrap_or(0);
        PublishGate {
            config,
            debounce: Duration::from_secs(debounce),
            last_published: HashMap::new(),
        }
    }

    pub fn admit(
        &mut self,
        address: &MacAddress,
        reading: &DecodedReading,
        now: Instant,
    ) -> Option<String> {
        let channel = match self.config.device_name(address) {
            Some(name) => name.to_string(),
            None if self.config.has_allowlist() => {
                debug!("Ignoring {} ({}): not configured", reading.device_title, address);
                return None;
            }
            None => reading.device_title.clone(),
        };

        if let Some(last) = self.last_published.get(&reading.address) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.debounce {
                debug!("Skipping {}: published {:?} ago", reading.device_title, elapsed);
                return None;
            }
        }
        self.last_published.insert(reading.address.clone(), now);

        Some(channel)
    }
}

/// Peripheral whose properties may now hold a fresh advertisement.
fn advertised_peripheral(event: CentralEvent) -> Option<PeripheralId> {
    match event {
        CentralEvent::DeviceDiscovered(id)
        | CentralEvent::DeviceUpdated(id)
        | CentralEvent::ManufacturerDataAdvertisement { id, .. } => Some(id),
        _ => None,
    }
}

async fn handle_peripheral(
    adapter: &Adapter,
    id: &PeripheralId,
    config: &AppConfig,
    mqtt_client: &MqttClient,
    gate: &mut PublishGate,
) -> anyhow::Result<()> {
    let peripheral = adapter.peripheral(id).await?;
    let Some(properties) = peripheral.properties().await? else {
        return Ok(());
    };
    if properties.manufacturer_data.is_empty() {
        return Ok(());
    }

    let advertisement = Advertisement::from(&properties);
    let outcome = decoder::decode(&advertisement, config.decoder.revision);
    outcome.emit_diagnostics();

    let Some(reading) = outcome.reading() else {
        return Ok(());
    };

    let address = MacAddress::new(properties.address.into_inner());
    if let Some(channel) = gate.admit(&address, reading, Instant::now()) {
        mqtt_client.publish_reading(&channel, reading).await?;
    }
    Ok(())
}

async fn handle_btle_events(
    adapter: &Adapter,
    config: &AppConfig,
    mqtt_client: &MqttClient,
) -> anyhow::Result<()> {
    let mut events = adapter.events().await?;
    let mut gate = PublishGate::new(config.clone());

    while let Some(event) = events.next().await {
        let Some(id) = advertised_peripheral(event) else {
            continue;
        };
        if let Err(err) = handle_peripheral(adapter, &id, config, mqtt_client, &mut gate).await {
            warn!("Error handling peripheral {:?}: {:?}", id, err);
        }
    }

    info!("No more events");
    Ok(())
}

impl Manager {
    pub fn new(
        adapter: Adapter,
        mqtt_client: MqttClient,
        mqtt_event_loop: rumqttc::EventLoop,
        config: AppConfig,
    ) -> Self {
        Manager {
            adapter,
            mqtt_client,
            mqtt_event_loop,
            config,
        }
    }

    pub async fn run_loop(self) -> anyhow::Result<()> {
        let Manager {
            adapter,
            mqtt_client,
            mut mqtt_event_loop,
            config,
        } = self;

        info!(
            "Scanning for TPMS sensors (dispatch revision {:?})",
            config.decoder.revision
        );
        adapter.start_scan(ScanFilter::default()).await?;

        let mqtt_task = tokio::spawn(async move {
            MqttClient::event_loop(&mut mqtt_event_loop).await;
        });

        let result = handle_btle_events(&adapter, &config, &mqtt_client).await;
        info!("Exiting manager event loop");

        if let Err(err) = adapter.stop_scan().await {
            warn!("Error stopping scan: {:?}", err);
        }
        mqtt_client.disconnect().await?;
        mqtt_task.abort();

        result
    }
}
