// NBI wire types
//
// Records as the backend stores them. Attribute names keep the backend's
// underscore-prefixed spelling on the wire; everything the backend may add
// beyond the modelled fields lands in `extra`.

use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

// ── Collections ──────────────────────────────────────────────────────

/// Top-level collections exposed by the northbound interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Devices,
    Tasks,
    Presets,
    Files,
}

// ── Device ───────────────────────────────────────────────────────────

/// A device document as returned by `GET /devices/`.
///
/// The parameter tree (`Device.`, `InternetGatewayDevice.`, vendor roots)
/// has no fixed schema, so it stays in `extra` until `acs-core` turns it
/// into a typed tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, rename = "_deviceId", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceIdRecord>,
    #[serde(default, rename = "_lastInform", skip_serializing_if = "Option::is_none")]
    pub last_inform: Option<String>,
    #[serde(default, rename = "_lastBoot", skip_serializing_if = "Option::is_none")]
    pub last_boot: Option<String>,
    #[serde(default, rename = "_registered", skip_serializing_if = "Option::is_none")]
    pub registered: Option<String>,
    #[serde(default, rename = "_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity block the backend derives from the device's Inform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdRecord {
    #[serde(default, rename = "_Manufacturer")]
    pub manufacturer: Option<String>,
    #[serde(default, rename = "_OUI")]
    pub oui: Option<String>,
    #[serde(default, rename = "_ProductClass")]
    pub product_class: Option<String>,
    #[serde(default, rename = "_SerialNumber")]
    pub serial_number: Option<String>,
}

// ── Tasks ────────────────────────────────────────────────────────────

/// Operation to run against a device.
///
/// Serialized as the backend's task document, e.g.
/// `{"name": "refreshObject", "objectName": "Device.WiFi."}`.
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "name", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum TaskRequest {
    Reboot,
    FactoryReset,
    GetParameterValues {
        #[serde(rename = "parameterNames")]
        parameter_names: Vec<String>,
    },
    SetParameterValues {
        #[serde(rename = "parameterValues")]
        parameter_values: Vec<ParameterAssignment>,
    },
    RefreshObject {
        #[serde(rename = "objectName")]
        object_name: String,
    },
    AddObject {
        #[serde(rename = "objectName")]
        object_name: String,
    },
    DeleteObject {
        #[serde(rename = "objectName")]
        object_name: String,
    },
}

impl TaskRequest {
    pub fn get_parameter_values<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::GetParameterValues {
            parameter_names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn set_parameter_values(values: impl IntoIterator<Item = ParameterAssignment>) -> Self {
        Self::SetParameterValues {
            parameter_values: values.into_iter().collect(),
        }
    }

    pub fn refresh_object(object_name: impl Into<String>) -> Self {
        Self::RefreshObject {
            object_name: object_name.into(),
        }
    }

    pub fn add_object(object_name: impl Into<String>) -> Self {
        Self::AddObject {
            object_name: object_name.into(),
        }
    }

    pub fn delete_object(object_name: impl Into<String>) -> Self {
        Self::DeleteObject {
            object_name: object_name.into(),
        }
    }

    /// The `name` the backend knows this task by.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// One entry of a `setParameterValues` task: `[path, value, type]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterAssignment {
    pub path: String,
    pub value: Value,
    /// Left out of the payload when `None`; the backend then infers the
    /// type from the stored parameter.
    pub value_type: Option<XsdType>,
}

impl ParameterAssignment {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            value_type: None,
        }
    }

    pub fn with_type(mut self, value_type: XsdType) -> Self {
        self.value_type = Some(value_type);
        self
    }
}

impl Serialize for ParameterAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.value_type.is_some() { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.path)?;
        seq.serialize_element(&self.value)?;
        if let Some(value_type) = &self.value_type {
            seq.serialize_element(value_type)?;
        }
        seq.end()
    }
}

/// XML Schema types used by TR-069 parameters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum XsdType {
    #[serde(rename = "xsd:string")]
    #[strum(serialize = "xsd:string")]
    String,
    #[serde(rename = "xsd:int")]
    #[strum(serialize = "xsd:int")]
    Int,
    #[serde(rename = "xsd:unsignedInt")]
    #[strum(serialize = "xsd:unsignedInt")]
    UnsignedInt,
    #[serde(rename = "xsd:long")]
    #[strum(serialize = "xsd:long")]
    Long,
    #[serde(rename = "xsd:unsignedLong")]
    #[strum(serialize = "xsd:unsignedLong")]
    UnsignedLong,
    #[serde(rename = "xsd:boolean")]
    #[strum(serialize = "xsd:boolean")]
    Boolean,
    #[serde(rename = "xsd:dateTime")]
    #[strum(serialize = "xsd:dateTime")]
    DateTime,
    #[serde(rename = "xsd:base64")]
    #[strum(serialize = "xsd:base64")]
    Base64,
    #[serde(rename = "xsd:hexBinary")]
    #[strum(serialize = "xsd:hexBinary")]
    HexBinary,
}

/// A task document as stored (and echoed back) by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    /// Absent when the backend acknowledged without echoing the task.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Placeholder for an acknowledgement that came back without a body.
    pub(crate) fn unrecorded(device_id: &str, request: &TaskRequest) -> Self {
        Self {
            name: request.name().to_owned(),
            device: Some(device_id.to_owned()),
            ..Self::default()
        }
    }

    pub fn has_fault(&self) -> bool {
        self.fault.as_ref().is_some_and(|f| !f.is_null())
    }
}

// ── Presets ──────────────────────────────────────────────────────────

/// Provisioning preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub weight: i32,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Event name (`"0 BOOTSTRAP"`, `"2 PERIODIC"`...) to required state.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precondition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision_args: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_channel() -> String {
    "default".into()
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            id: None,
            weight: 0,
            channel: default_channel(),
            events: BTreeMap::new(),
            precondition: None,
            schedule: None,
            provision: None,
            provision_args: None,
            extra: Map::new(),
        }
    }
}

// ── Files ────────────────────────────────────────────────────────────

/// TR-069 download file types, as the backend labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum FileType {
    #[strum(serialize = "1 Firmware Upgrade Image")]
    FirmwareUpgradeImage,
    #[strum(serialize = "2 Web Content")]
    WebContent,
    #[strum(serialize = "3 Vendor Configuration File")]
    VendorConfigurationFile,
    #[strum(serialize = "4 Tone File")]
    ToneFile,
    #[strum(serialize = "5 Ringer File")]
    RingerFile,
}

/// Metadata sent as headers alongside a file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_type: FileType,
    pub oui: String,
    pub product_class: String,
    pub version: String,
}

/// Stored file as listed by `GET /files/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default, rename = "uploadDate")]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub metadata: FileMetadata,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub oui: Option<String>,
    #[serde(default)]
    pub product_class: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl FileMetadata {
    /// Typed file type; `None` for labels outside the TR-069 set.
    pub fn file_type(&self) -> Option<FileType> {
        self.file_type.as_deref().and_then(|t| t.parse().ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn unit_tasks_serialize_to_bare_name() {
        assert_eq!(
            serde_json::to_value(TaskRequest::Reboot).unwrap(),
            json!({ "name": "reboot" })
        );
        assert_eq!(
            serde_json::to_value(TaskRequest::FactoryReset).unwrap(),
            json!({ "name": "factoryReset" })
        );
    }

    #[test]
    fn object_tasks_use_object_name() {
        assert_eq!(
            serde_json::to_value(TaskRequest::add_object("Device.IP.Interface.")).unwrap(),
            json!({ "name": "addObject", "objectName": "Device.IP.Interface." })
        );
        assert_eq!(
            serde_json::to_value(TaskRequest::refresh_object("Device.WiFi.")).unwrap(),
            json!({ "name": "refreshObject", "objectName": "Device.WiFi." })
        );
    }

    #[test]
    fn set_parameter_values_encodes_triples() {
        let task = TaskRequest::set_parameter_values([
            ParameterAssignment::new("Device.ManagementServer.PeriodicInformInterval", "300")
                .with_type(XsdType::UnsignedInt),
            ParameterAssignment::new("Device.Time.Enable", true),
        ]);
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({
                "name": "setParameterValues",
                "parameterValues": [
                    ["Device.ManagementServer.PeriodicInformInterval", "300", "xsd:unsignedInt"],
                    ["Device.Time.Enable", true]
                ]
            })
        );
    }

    #[test]
    fn task_names_match_wire_names() {
        let tasks = [
            TaskRequest::Reboot,
            TaskRequest::FactoryReset,
            TaskRequest::get_parameter_values(["Device.DeviceInfo.UpTime"]),
            TaskRequest::set_parameter_values(Vec::new()),
            TaskRequest::refresh_object("Device."),
            TaskRequest::add_object("Device.NAT.PortMapping."),
            TaskRequest::delete_object("Device.NAT.PortMapping.1."),
        ];
        for task in tasks {
            let encoded = serde_json::to_value(&task).unwrap();
            assert_eq!(encoded["name"], json!(task.name()));
        }
    }

    #[test]
    fn xsd_type_parses_and_displays() {
        assert_eq!("xsd:boolean".parse::<XsdType>().unwrap(), XsdType::Boolean);
        assert_eq!(XsdType::DateTime.to_string(), "xsd:dateTime");
    }

    #[test]
    fn device_record_keeps_tree_in_extra() {
        let record: DeviceRecord = serde_json::from_value(json!({
            "_id": "202BC1-BM632w-000001",
            "_lastInform": "2024-05-01T10:00:00.000Z",
            "_tags": ["lab"],
            "_deviceId": { "_Manufacturer": "Acme", "_OUI": "202BC1" },
            "Device": { "DeviceInfo": { "Manufacturer": { "_value": "Acme" } } }
        }))
        .unwrap();

        assert_eq!(record.id, "202BC1-BM632w-000001");
        assert_eq!(record.tags, vec!["lab".to_string()]);
        let identity = record.device_id.unwrap();
        assert_eq!(identity.manufacturer.as_deref(), Some("Acme"));
        assert_eq!(identity.serial_number, None);
        assert!(record.extra.contains_key("Device"));
        assert!(!record.extra.contains_key("_lastInform"));
    }

    #[test]
    fn file_metadata_type_is_typed_when_known() {
        let record: FileRecord = serde_json::from_value(json!({
            "_id": "fw-1.2.bin",
            "length": 1024,
            "metadata": { "fileType": "1 Firmware Upgrade Image", "oui": "202BC1" }
        }))
        .unwrap();
        assert_eq!(record.metadata.file_type(), Some(FileType::FirmwareUpgradeImage));
        assert_eq!(record.length, Some(1024));
    }

    #[test]
    fn preset_defaults_to_default_channel() {
        let preset: Preset = serde_json::from_value(json!({ "weight": 10 })).unwrap();
        assert_eq!(preset.channel, "default");
        assert_eq!(preset.weight, 10);
        assert_eq!(
            serde_json::to_value(Preset::default()).unwrap(),
            json!({ "weight": 0, "channel": "default" })
        );
    }
}
