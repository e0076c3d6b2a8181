use log::Level;
use thiserror::Error;

use crate::classifier::Family;

/// Reasons an advertisement produced no reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("advertisement carries no manufacturer data")]
    NoManufacturerData,

    #[error("unrecognized source: company 0x{company_id:04X}")]
    UnrecognizedSource { company_id: u16 },

    #[error("malformed {family:?} payload: expected {expected} bytes, got {actual}")]
    MalformedPayload {
        family: Family,
        expected: usize,
        actual: usize,
    },

    #[error("unknown Michelin frame: product 0x{product:02X}, frame 0x{frame:02X}")]
    UnknownFrameSubtype { product: u8, frame: u8 },
}

impl DecodeError {
    /// Severity the rejection is reported at. `None` means it is not reported.
    pub fn level(&self) -> Option<Level> {
        match self {
            DecodeError::NoManufacturerData => None,
            DecodeError::UnrecognizedSource { .. } => Some(Level::Debug),
            DecodeError::MalformedPayload { .. } => Some(Level::Error),
            DecodeError::UnknownFrameSubtype { .. } => Some(Level::Info),
        }
    }
}

/// A log record produced while decoding, handed back to the caller instead of
/// being written to a global logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl Diagnostic {
    pub fn debug(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Debug,
            message: message.into(),
        }
    }

    /// Forward to the `log` facade.
    pub fn emit(&self) {
        log::log!(self.level, "{}", self.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(DecodeError::NoManufacturerData.level(), None);
        assert_eq!(
            DecodeError::UnrecognizedSource { company_id: 1 }.level(),
            Some(Level::Debug)
        );
        assert_eq!(
            DecodeError::UnknownFrameSubtype {
                product: 1,
                frame: 9
            }
            .level(),
            Some(Level::Info)
        );
        let malformed = DecodeError::MalformedPayload {
            family: Family::TypeA,
            expected: 16,
            actual: 3,
        };
        assert_eq!(malformed.level(), Some(Level::Error));
        assert_eq!(
            malformed.to_string(),
            "malformed TypeA payload: expected 16 bytes, got 3"
        );
    }
}
