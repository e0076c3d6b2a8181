use crate::advertisement::Advertisement;
use crate::classifier::{self, DispatchRevision, Family, Selection};
use crate::error::{DecodeError, Diagnostic};
use crate::reading::{DecodedReading, RawFields};

pub mod michelin;
pub mod type_a;
pub mod type_b;

pub use michelin::MichelinFrame;

/// Fully resolved payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    TypeA,
    TypeB,
    Michelin(MichelinFrame),
    Unknown,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::TypeA => write!(f, "TypeA"),
            Variant::TypeB => write!(f, "TypeB"),
            Variant::Michelin(frame) => write!(f, "Michelin frame 0x{:02x}", frame.id()),
            Variant::Unknown => write!(f, "unknown"),
        }
    }
}

/// Result of decoding one advertisement, along with the log records it
/// produced. Nothing is written to the logger while decoding.
#[derive(Debug, Clone)]
pub struct DecodeOutcome {
    pub variant: Variant,
    pub result: Result<DecodedReading, DecodeError>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodeOutcome {
    pub fn reading(&self) -> Option<&DecodedReading> {
        self.result.as_ref().ok()
    }

    pub fn emit_diagnostics(&self) {
        self.diagnostics.iter().for_each(Diagnostic::emit);
    }
}

pub fn decode(adv: &Advertisement, revision: DispatchRevision) -> DecodeOutcome {
    let mut diagnostics = vec![Diagnostic::debug(format!(
        "Parsing TPMS advertisement from {}: {:02X?}",
        adv.address, adv.manufacturer_entries
    ))];

    let decoded = classifier::classify(adv, revision).and_then(decode_selection);

    match decoded {
        Ok((variant, fields)) => {
            let reading = DecodedReading::assemble(adv, fields);
            diagnostics.push(Diagnostic::debug(format!(
                "Decoded {} from {}: {:?}",
                variant, adv.address, reading
            )));
            DecodeOutcome {
                variant,
                result: Ok(reading),
                diagnostics,
            }
        }
        Err(err) => {
            if let Some(level) = err.level() {
                diagnostics.push(Diagnostic {
                    level,
                    message: format!("{}: {}", adv.address, err),
                });
            }
            DecodeOutcome {
                variant: Variant::Unknown,
                result: Err(err),
                diagnostics,
            }
        }
    }
}

fn decode_selection(selection: Selection<'_>) -> Result<(Variant, RawFields), DecodeError> {
    let Selection {
        family,
        company_id,
        payload,
    } = selection;

    match family {
        Family::TypeA => Ok((Variant::TypeA, type_a::decode(payload)?)),
        Family::TypeB => Ok((Variant::TypeB, type_b::decode(company_id, payload)?)),
        Family::Michelin => {
            let frame = michelin::frame_type(payload)?;
            Ok((Variant::Michelin(frame), michelin::decode(frame, payload)?))
        }
    }
}

/// View a payload as a fixed-size frame, or report the length mismatch.
fn fixed<const N: usize>(payload: &[u8], family: Family) -> Result<&[u8; N], DecodeError> {
    payload
        .try_into()
        .map_err(|_| DecodeError::MalformedPayload {
            family,
            expected: N,
            actual: payload.len(),
        })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
