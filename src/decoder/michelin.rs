//! Michelin sensors, recognised by service UUID `27a5`. Every frame starts
//! with the same four bytes:
//!
//! | bytes | field                              |
//! |-------|------------------------------------|
//! | 0     | product type, always `0x01`        |
//! | 1     | frame type                         |
//! | 2     | temperature, u8, °C + 60           |
//! | 3     | voltage, u8, 10 mV above 1 V       |
//!
//! Frames `0x04` and `0x0c` carry absolute pressure (u16 LE, mbar) at 4..6,
//! frame `0x05` at 12..14. Frames `0x02` and `0x06` have no pressure.

use super::{fixed, round_to};
use crate::classifier::Family;
use crate::error::DecodeError;
use crate::reading::RawFields;

pub const PRODUCT_TYPE: u8 = 0x01;
pub const HEADER_LEN: usize = 2;

const SHORT_FRAME_LEN: usize = 12;
const PRESSURE_TAIL_FRAME_LEN: usize = 14;
const LONG_FRAME_LEN: usize = 17;

const TEMPERATURE_OFFSET: i16 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MichelinFrame {
    Frame02,
    Frame04,
    Frame05,
    Frame06,
    Frame0C,
}

impl MichelinFrame {
    fn from_byte(frame: u8) -> Option<Self> {
        match frame {
            0x02 => Some(MichelinFrame::Frame02),
            0x04 => Some(MichelinFrame::Frame04),
            0x05 => Some(MichelinFrame::Frame05),
            0x06 => Some(MichelinFrame::Frame06),
            0x0c => Some(MichelinFrame::Frame0C),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            MichelinFrame::Frame02 => 0x02,
            MichelinFrame::Frame04 => 0x04,
            MichelinFrame::Frame05 => 0x05,
            MichelinFrame::Frame06 => 0x06,
            MichelinFrame::Frame0C => 0x0c,
        }
    }
}

/// Read the product and frame type bytes.
pub fn frame_type(payload: &[u8]) -> Result<MichelinFrame, DecodeError> {
    let &[product, frame, ..] = payload else {
        return Err(DecodeError::MalformedPayload {
            family: Family::Michelin,
            expected: HEADER_LEN,
            actual: payload.len(),
        });
    };

    match MichelinFrame::from_byte(frame) {
        Some(frame) if product == PRODUCT_TYPE => Ok(frame),
        _ => Err(DecodeError::UnknownFrameSubtype { product, frame }),
    }
}

pub fn decode(frame: MichelinFrame, payload: &[u8]) -> Result<RawFields, DecodeError> {
    let (raw_temp, raw_volt, raw_pressure) = match frame {
        MichelinFrame::Frame04 | MichelinFrame::Frame0C => {
            let b: &[u8; SHORT_FRAME_LEN] = fixed(payload, Family::Michelin)?;
            (b[2], b[3], Some(u16::from_le_bytes([b[4], b[5]])))
        }
        MichelinFrame::Frame05 => {
            let b: &[u8; PRESSURE_TAIL_FRAME_LEN] = fixed(payload, Family::Michelin)?;
            (b[2], b[3], Some(u16::from_le_bytes([b[12], b[13]])))
        }
        MichelinFrame::Frame02 => {
            let b: &[u8; SHORT_FRAME_LEN] = fixed(payload, Family::Michelin)?;
            (b[2], b[3], None)
        }
        MichelinFrame::Frame06 => {
            let b: &[u8; LONG_FRAME_LEN] = fixed(payload, Family::Michelin)?;
            (b[2], b[3], None)
        }
    };

    let temperature = i16::from(raw_temp) - TEMPERATURE_OFFSET;
    let voltage = round_to(f64::from(raw_volt) / 100.0 + 1.0, 2);
    // absolute to gauge pressure; a flat tyre reads zero, not negative
    let pressure = raw_pressure.map(|raw| (round_to(f64::from(raw) / 1000.0, 2) - 1.0).max(0.0));

    Ok(RawFields {
        pressure,
        temperature: Some(f64::from(temperature)),
        battery_percent: None,
        voltage: Some(voltage),
        alarm: None,
    })
}

#[cfg(test)]
pub(crate) fn payload(frame: u8, len: usize, raw_temp: u8, raw_volt: u8) -> Vec<u8> {
    let mut data = vec![0u8; len.max(4)];
    data[0] = PRODUCT_TYPE;
    data[1] = frame;
    data[2] = raw_temp;
    data[3] = raw_volt;
    data.truncate(len);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value missing");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_frame_type() {
        assert_eq!(frame_type(&[0x01, 0x04]), Ok(MichelinFrame::Frame04));
        assert_eq!(frame_type(&[0x01, 0x0c, 0xFF]), Ok(MichelinFrame::Frame0C));
        assert_eq!(
            frame_type(&[0x01, 0x03]),
            Err(DecodeError::UnknownFrameSubtype {
                product: 0x01,
                frame: 0x03
            })
        );
        assert_eq!(
            frame_type(&[0x02, 0x04]),
            Err(DecodeError::UnknownFrameSubtype {
                product: 0x02,
                frame: 0x04
            })
        );
        assert_eq!(
            frame_type(&[0x01]),
            Err(DecodeError::MalformedPayload {
                family: Family::Michelin,
                expected: HEADER_LEN,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_frame_ids_round_trip() {
        for id in [0x02, 0x04, 0x05, 0x06, 0x0c] {
            assert_eq!(MichelinFrame::from_byte(id).map(MichelinFrame::id), Some(id));
        }
    }

    #[test]
    fn test_frame_04() {
        let mut data = payload(0x04, 12, 90, 230);
        data[4..6].copy_from_slice(&2000u16.to_le_bytes());

        let fields = decode(MichelinFrame::Frame04, &data).unwrap();
        assert_eq!(fields.temperature, Some(30.0));
        assert_close(fields.voltage, 3.3);
        assert_close(fields.pressure, 1.0);
        assert_eq!(fields.alarm, None);
        assert_eq!(fields.battery_percent, None);
    }

    #[test]
    fn test_frame_05_pressure_at_tail() {
        let mut data = payload(0x05, 14, 40, 190);
        data[4..6].copy_from_slice(&9999u16.to_le_bytes());
        data[12..14].copy_from_slice(&3450u16.to_le_bytes());

        let fields = decode(MichelinFrame::Frame05, &data).unwrap();
        assert_eq!(fields.temperature, Some(-20.0));
        assert_close(fields.voltage, 2.9);
        assert_close(fields.pressure, 2.45);
    }

    #[test]
    fn test_frames_without_pressure() {
        let fields = decode(MichelinFrame::Frame02, &payload(0x02, 12, 60, 200)).unwrap();
        assert_eq!(fields.pressure, None);
        assert_eq!(fields.temperature, Some(0.0));
        assert_close(fields.voltage, 3.0);

        let fields = decode(MichelinFrame::Frame06, &payload(0x06, 17, 255, 0)).unwrap();
        assert_eq!(fields.pressure, None);
        assert_eq!(fields.temperature, Some(195.0));
        assert_close(fields.voltage, 1.0);
    }

    #[test]
    fn test_vacuum_clamps_to_zero() {
        let mut data = payload(0x0c, 12, 80, 200);
        data[4..6].copy_from_slice(&500u16.to_le_bytes());
        let fields = decode(MichelinFrame::Frame0C, &data).unwrap();
        assert_eq!(fields.pressure, Some(0.0));
    }

    #[test]
    fn test_wrong_length_per_frame() {
        assert_eq!(
            decode(MichelinFrame::Frame05, &payload(0x05, 12, 0, 0)),
            Err(DecodeError::MalformedPayload {
                family: Family::Michelin,
                expected: 14,
                actual: 12,
            })
        );
        assert!(decode(MichelinFrame::Frame04, &payload(0x04, 14, 0, 0)).is_err());
        assert!(decode(MichelinFrame::Frame06, &payload(0x06, 12, 0, 0)).is_err());
        assert!(decode(MichelinFrame::Frame02, &payload(0x02, 2, 0, 0)).is_err());
    }
}
