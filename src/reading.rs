use serde_derive::Serialize;

use crate::advertisement::Advertisement;
use crate::battery;

pub const MANUFACTURER: &str = "TPMS";

/// Whatever a variant decoder managed to read. Fields the hardware does not
/// report stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub battery_percent: Option<u8>,
    pub voltage: Option<f64>,
    pub alarm: Option<bool>,
}

/// One update for one sensor. Absent fields are skipped when serialized so
/// consumers never see a made-up zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedReading {
    #[serde(rename = "id")]
    pub address: String,
    pub device_title: String,
    pub manufacturer: &'static str,
    /// bar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    /// °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "battery", skip_serializing_if = "Option::is_none")]
    pub battery_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<bool>,
    /// dBm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i16>,
}

impl DecodedReading {
    pub fn assemble(adv: &Advertisement, fields: RawFields) -> Self {
        let battery_percent = fields
            .battery_percent
            .or_else(|| fields.voltage.map(battery::percent_from_voltage));

        DecodedReading {
            address: adv.address.clone(),
            device_title: device_title(&adv.address),
            manufacturer: MANUFACTURER,
            pressure: fields.pressure,
            temperature: fields.temperature,
            battery_percent,
            voltage: fields.voltage,
            alarm: fields.alarm,
            signal_strength: adv.rssi,
        }
    }
}

pub fn device_title(address: &str) -> String {
    format!("{} {}", MANUFACTURER, short_address(address))
}

/// Last two octets of a MAC-style address, e.g. `AA:BB:CC:DD:EE:FF` -> `EEFF`.
pub fn short_address(address: &str) -> String {
    let segments: Vec<&str> = address.split([':', '-']).collect();
    let tail = match segments.as_slice() {
        [.., a, b] => format!("{a}{b}"),
        _ => address.to_string(),
    }
    .to_uppercase();

    let skip = tail.chars().count().saturating_sub(4);
    tail.chars().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address() {
        assert_eq!(short_address("AA:BB:CC:DD:EE:FF"), "EEFF");
        assert_eq!(short_address("aa-bb-cc-dd-ee-0f"), "EE0F");
        assert_eq!(short_address("aabbccddeeff"), "EEFF");
        assert_eq!(short_address("ab"), "AB");
        assert_eq!(
            short_address("B1C2D3E4-0000-1000-8000-00805F9B34FB"),
            "34FB"
        );
    }

    #[test]
    fn test_device_title() {
        assert_eq!(device_title("11:22:33:44:55:66"), "TPMS 5566");
    }

    #[test]
    fn test_assemble_keeps_absent_fields_absent() {
        let adv = Advertisement::new("11:22:33:44:55:66");
        let reading = DecodedReading::assemble(
            &adv,
            RawFields {
                temperature: Some(21.0),
                ..Default::default()
            },
        );
        assert_eq!(reading.temperature, Some(21.0));
        assert_eq!(reading.pressure, None);
        assert_eq!(reading.battery_percent, None);
        assert_eq!(reading.alarm, None);
        assert_eq!(reading.signal_strength, None);

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "11:22:33:44:55:66",
                "device_title": "TPMS 5566",
                "manufacturer": "TPMS",
                "temperature": 21.0,
            })
        );
    }

    #[test]
    fn test_assemble_derives_battery_from_voltage() {
        let adv = Advertisement::new("11:22:33:44:55:66").with_rssi(-60);
        let reading = DecodedReading::assemble(
            &adv,
            RawFields {
                voltage: Some(2.9),
                ..Default::default()
            },
        );
        assert_eq!(reading.battery_percent, Some(75));
        assert_eq!(reading.signal_strength, Some(-60));
    }

    #[test]
    fn test_direct_battery_wins_over_voltage() {
        let adv = Advertisement::new("11:22:33:44:55:66");
        let reading = DecodedReading::assemble(
            &adv,
            RawFields {
                battery_percent: Some(42),
                voltage: Some(3.3),
                ..Default::default()
            },
        );
        assert_eq!(reading.battery_percent, Some(42));
    }
}
