use serde_derive::Deserialize;
use uuid::Uuid;

use crate::advertisement::Advertisement;
use crate::error::DecodeError;

/// Company id used by the generic 16-byte TPMS sensors.
pub const TPMS_COMPANY_ID: u16 = 256;

/// Company id shared by the 5-byte voltage sensors and early Michelin firmware.
pub const SHARED_COMPANY_ID: u16 = 2088;

pub const MICHELIN_SERVICE_UUID: Uuid = Uuid::from_u128(0x000027a5_0000_1000_8000_00805f9b34fb);

/// Hardware family, chosen from identifiers only. The payload is never read
/// before a family has been picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    TypeA,
    TypeB,
    Michelin,
}

/// Which generation of the dispatch table to apply. Company 2088 means
/// different hardware depending on the revision.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchRevision {
    /// Company 256 only.
    Initial,
    /// Company 2088 is Michelin, no service UUID required.
    CompanyMichelin,
    /// Michelin is recognised by its service UUID, company 2088 is the
    /// 5-byte voltage sensor.
    #[default]
    Current,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Service(Uuid, Family),
    Company(u16, Family),
}

const INITIAL_RULES: &[Rule] = &[Rule::Company(TPMS_COMPANY_ID, Family::TypeA)];

const COMPANY_MICHELIN_RULES: &[Rule] = &[
    Rule::Company(TPMS_COMPANY_ID, Family::TypeA),
    Rule::Company(SHARED_COMPANY_ID, Family::Michelin),
];

const CURRENT_RULES: &[Rule] = &[
    Rule::Service(MICHELIN_SERVICE_UUID, Family::Michelin),
    Rule::Company(TPMS_COMPANY_ID, Family::TypeA),
    Rule::Company(SHARED_COMPANY_ID, Family::TypeB),
];

impl DispatchRevision {
    /// Precedence table, first match wins.
    fn rules(self) -> &'static [Rule] {
        match self {
            DispatchRevision::Initial => INITIAL_RULES,
            DispatchRevision::CompanyMichelin => COMPANY_MICHELIN_RULES,
            DispatchRevision::Current => CURRENT_RULES,
        }
    }
}

/// The decoder input picked out of an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub family: Family,
    pub company_id: u16,
    pub payload: &'a [u8],
}

pub fn classify(
    adv: &Advertisement,
    revision: DispatchRevision,
) -> Result<Selection<'_>, DecodeError> {
    let (company_id, payload) = adv
        .first_manufacturer_entry()
        .ok_or(DecodeError::NoManufacturerData)?;

    let family = revision
        .rules()
        .iter()
        .find_map(|rule| match *rule {
            Rule::Service(uuid, family) if adv.advertises(&uuid) => Some(family),
            Rule::Company(id, family) if id == company_id => Some(family),
            _ => None,
        })
        .ok_or(DecodeError::UnrecognizedSource { company_id })?;

    Ok(Selection {
        family,
        company_id,
        payload,
    })
}
