//! 16-byte frame of the generic company-256 sensors.
//!
//! | bytes  | field                         |
//! |--------|-------------------------------|
//! | 0..6   | unused                        |
//! | 6..10  | pressure, i32 LE, 1e-5 bar    |
//! | 10..14 | temperature, i32 LE, 0.01 °C  |
//! | 14     | battery, i8, percent          |
//! | 15     | alarm, bool                   |

use super::fixed;
use crate::classifier::Family;
use crate::error::DecodeError;
use crate::reading::RawFields;

pub const LEN: usize = 16;

pub fn decode(payload: &[u8]) -> Result<RawFields, DecodeError> {
    let b: &[u8; LEN] = fixed(payload, Family::TypeA)?;

    let pressure_raw = i32::from_le_bytes([b[6], b[7], b[8], b[9]]);
    let temperature_raw = i32::from_le_bytes([b[10], b[11], b[12], b[13]]);
    let battery = i8::from_le_bytes([b[14]]);
    let alarm = b[15] != 0;

    Ok(RawFields {
        pressure: Some(f64::from(pressure_raw) / 100_000.0),
        temperature: Some(f64::from(temperature_raw) / 100.0),
        // a negative percentage is not a reading
        battery_percent: u8::try_from(battery).ok(),
        voltage: None,
        alarm: Some(alarm),
    })
}

#[cfg(test)]
pub(crate) fn payload(pressure: i32, temperature: i32, battery: i8, alarm: u8) -> Vec<u8> {
    let mut data = vec![0u8; 6];
    data.extend_from_slice(&pressure.to_le_bytes());
    data.extend_from_slice(&temperature.to_le_bytes());
    data.extend_from_slice(&battery.to_le_bytes());
    data.push(alarm);
    data
}
