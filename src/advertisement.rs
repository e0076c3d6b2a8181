use btleplug::api::PeripheralProperties;
use uuid::Uuid;

/// One received BLE broadcast, as seen by the decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advertisement {
    pub address: String,
    pub rssi: Option<i16>,
    pub manufacturer_entries: Vec<(u16, Vec<u8>)>,
    pub service_uuids: Vec<Uuid>,
}

impl Advertisement {
    pub fn new(address: impl Into<String>) -> Self {
        Advertisement {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_manufacturer_data(mut self, company_id: u16, payload: impl Into<Vec<u8>>) -> Self {
        self.manufacturer_entries.push((company_id, payload.into()));
        self
    }

    pub fn with_service(mut self, uuid: Uuid) -> Self {
        if !self.service_uuids.contains(&uuid) {
            self.service_uuids.push(uuid);
        }
        self
    }

    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// The only manufacturer entry the decoder ever looks at.
    pub fn first_manufacturer_entry(&self) -> Option<(u16, &[u8])> {
        self.manufacturer_entries
            .first()
            .map(|(id, payload)| (*id, payload.as_slice()))
    }

    pub fn advertises(&self, uuid: &Uuid) -> bool {
        self.service_uuids.contains(uuid)
    }
}

impl From<&PeripheralProperties> for Advertisement {
    fn from(props: &PeripheralProperties) -> Self {
        // btleplug hands manufacturer data over as a HashMap; order by company
        // id so "first entry" is stable between advertisements.
        let mut manufacturer_entries: Vec<(u16, Vec<u8>)> = props
            .manufacturer_data
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect();
        manufacturer_entries.sort_by_key(|(id, _)| *id);

        Advertisement {
            address: props.address.to_string(),
            rssi: props.rssi,
            manufacturer_entries,
            service_uuids: props.services.clone(),
        }
    }
}
