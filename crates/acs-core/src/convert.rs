// ── Wire → domain conversion ──

use acs_api::{DeviceIdRecord, DeviceRecord};
use chrono::{DateTime, Utc};

use crate::model::{Device, DeviceIdentity, ParameterTree};

fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(raw, error = %e, "unparseable timestamp");
            None
        }
    }
}

impl From<DeviceIdRecord> for DeviceIdentity {
    fn from(r: DeviceIdRecord) -> Self {
        Self {
            manufacturer: r.manufacturer,
            oui: r.oui,
            product_class: r.product_class,
            serial_number: r.serial_number,
        }
    }
}

impl From<DeviceRecord> for Device {
    fn from(r: DeviceRecord) -> Self {
        Self {
            last_inform: parse_datetime(r.last_inform.as_deref()),
            last_boot: parse_datetime(r.last_boot.as_deref()),
            registered: parse_datetime(r.registered.as_deref()),
            identity: r.device_id.map(DeviceIdentity::from).unwrap_or_default(),
            parameters: ParameterTree::from_json(r.extra),
            tags: r.tags,
            id: r.id,
        }
    }
}
