//! 5-byte frame of the company-2088 sensors. The battery voltage rides in
//! the company id itself: its second byte on air, in 0.1 V.
//!
//! | bytes | field                               |
//! |-------|-------------------------------------|
//! | 0     | temperature, i8, °C                 |
//! | 1..3  | pressure, u16 BE, 0.1 psi + 14.5    |
//! | 3..5  | unused                              |

use super::{fixed, round_to};
use crate::classifier::Family;
use crate::error::DecodeError;
use crate::reading::RawFields;

pub const LEN: usize = 5;

const PSI_TO_BAR: f64 = 0.0689476;
const PRESSURE_OFFSET: f64 = 145.0;

pub fn decode(company_id: u16, payload: &[u8]) -> Result<RawFields, DecodeError> {
    let b: &[u8; LEN] = fixed(payload, Family::TypeB)?;

    let voltage_raw = company_id.swap_bytes() as u8;
    let temperature = i8::from_be_bytes([b[0]]);
    let pressure_raw = u16::from_be_bytes([b[1], b[2]]);

    let psi = (f64::from(pressure_raw) - PRESSURE_OFFSET) / 10.0;

    Ok(RawFields {
        pressure: Some(round_to(psi * PSI_TO_BAR, 3)),
        temperature: Some(f64::from(temperature)),
        battery_percent: None,
        voltage: Some(f64::from(voltage_raw) / 10.0),
        alarm: None,
    })
}
