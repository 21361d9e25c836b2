//! Devices reported by the hub's `GET /devices/` endpoint

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// A single hub-managed device
///
/// Only `id` and `type` are interpreted; every other field the hub sends is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Device identifier (numeric ids are normalized to strings)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Device type tag, e.g. "switch" or "dimmer"
    #[serde(rename = "type")]
    pub device_type: String,

    /// Remaining fields as returned by the hub
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn new(id: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            device_type: device_type.into(),
            extra: Map::new(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Ordered, read-only snapshot of the hub's devices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceDirectory {
    devices: Vec<Device>,
}

impl DeviceDirectory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Parse the body of `GET /devices/`
    ///
    /// The body must be a JSON array; each element must carry `id` and `type`.
    pub fn from_json(body: &Value) -> CoreResult<Self> {
        let items = body.as_array().ok_or(CoreError::DirectoryNotArray {
            found: json_kind(body),
        })?;

        let devices = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Device::deserialize(item)
                    .map_err(|source| CoreError::InvalidDevice { index, source })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        debug!("Parsed device directory with {} devices", devices.len());
        Ok(Self { devices })
    }

    /// First device in directory order with exactly this type
    pub fn find_by_type(&self, device_type: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.device_type == device_type)
    }

    /// Try each candidate type in order and return the first match
    pub fn find_by_any_type<S: AsRef<str>>(&self, types: &[S]) -> Option<&Device> {
        types
            .iter()
            .find_map(|t| self.find_by_type(t.as_ref()))
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Human-readable name of a JSON value's type
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
