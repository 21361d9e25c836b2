//! Declarative device contracts
//!
//! A [`ContractTable`] maps device types to the status shape they must report
//! and, for controllable types, a command the hub must acknowledge. The table
//! is plain data: it (de)serializes with serde so it can be loaded from a
//! file, and [`ContractTable::hitepro`] provides the built-in HitePro table.

use crate::check::StatusCheck;
use crate::device::{Device, DeviceDirectory};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::fmt;

/// Acknowledgement text the hub returns for an accepted command
pub const COMMAND_ACK: &str = "Command send";

/// One device type, or a list of interchangeable aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceTypeSelector {
    Single(String),
    AnyOf(Vec<String>),
}

impl DeviceTypeSelector {
    /// Resolve against the directory (first match, aliases tried in order)
    pub fn resolve<'a>(&self, directory: &'a DeviceDirectory) -> Option<&'a Device> {
        match self {
            DeviceTypeSelector::Single(t) => directory.find_by_type(t),
            DeviceTypeSelector::AnyOf(types) => directory.find_by_any_type(types.as_slice()),
        }
    }

    /// Reason reported when no device matches
    pub fn not_found_reason(&self) -> String {
        match self {
            DeviceTypeSelector::Single(t) => format!("No device of type \"{}\" found", t),
            DeviceTypeSelector::AnyOf(types) => {
                format!("No device of any type [{}] found", types.join(", "))
            }
        }
    }
}

impl fmt::Display for DeviceTypeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTypeSelector::Single(t) => write!(f, "{}", t),
            DeviceTypeSelector::AnyOf(types) => write!(f, "{}", types.join(" / ")),
        }
    }
}

impl From<&str> for DeviceTypeSelector {
    fn from(value: &str) -> Self {
        DeviceTypeSelector::Single(value.to_string())
    }
}

impl From<&[&str]> for DeviceTypeSelector {
    fn from(values: &[&str]) -> Self {
        DeviceTypeSelector::AnyOf(values.iter().map(|v| v.to_string()).collect())
    }
}

/// A control command and its expected acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Path segment sent as the command value (e.g. "1", "50")
    #[serde(deserialize_with = "deserialize_command_value")]
    pub value: String,

    /// Optional raw query string without the leading `?`, e.g. "color=ff5733"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Literal `result` text the hub must answer with
    #[serde(default = "default_ack")]
    pub expected_result: String,
}

fn default_ack() -> String {
    COMMAND_ACK.to_string()
}

fn deserialize_command_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Text(s) => s,
        RawValue::Number(n) => n.to_string(),
    })
}

impl CommandSpec {
    pub fn new(value: impl ToString) -> Self {
        Self {
            value: value.to_string(),
            query: None,
            expected_result: default_ack(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn expecting(mut self, result: impl Into<String>) -> Self {
        self.expected_result = result.into();
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(q) => write!(f, "{}?{}", self.value, q),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Contract for one device type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRow {
    pub device_type: DeviceTypeSelector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusCheck>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandSpec>,
}

impl ContractRow {
    pub fn new(device_type: impl Into<DeviceTypeSelector>) -> Self {
        Self {
            device_type: device_type.into(),
            status: None,
            command: None,
        }
    }

    pub fn status(mut self, check: StatusCheck) -> Self {
        self.status = Some(check);
        self
    }

    pub fn command(mut self, command: CommandSpec) -> Self {
        self.command = Some(command);
        self
    }
}

/// What a single check does
#[derive(Debug, Clone, PartialEq)]
pub enum CheckKind {
    Status(StatusCheck),
    Command(CommandSpec),
}

/// One executable check derived from a contract row
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSpec {
    pub device_type: DeviceTypeSelector,
    pub kind: CheckKind,
}

impl CheckSpec {
    /// Human-readable name, e.g. "dimmer: status is integer in [0, 100]"
    pub fn label(&self) -> String {
        match &self.kind {
            CheckKind::Status(check) => format!("{}: status is {}", self.device_type, check),
            CheckKind::Command(cmd) => format!("{}: accepts command {}", self.device_type, cmd),
        }
    }
}

/// Ordered collection of contract rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractTable {
    rows: Vec<ContractRow>,
}

impl ContractTable {
    pub fn new(rows: Vec<ContractRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ContractRow] {
        &self.rows
    }

    /// Expand rows into executable checks
    ///
    /// All status checks come first (in row order), then all command checks.
    pub fn checks(&self) -> Vec<CheckSpec> {
        let status = self.rows.iter().filter_map(|row| {
            row.status.clone().map(|check| CheckSpec {
                device_type: row.device_type.clone(),
                kind: CheckKind::Status(check),
            })
        });
        let commands = self.rows.iter().filter_map(|row| {
            row.command.clone().map(|cmd| CheckSpec {
                device_type: row.device_type.clone(),
                kind: CheckKind::Command(cmd),
            })
        });
        status.chain(commands).collect()
    }

    /// The HitePro hub's device contracts
    pub fn hitepro() -> Self {
        let percent = || StatusCheck::IntegerRange { min: 0, max: 100 };
        let binary = || StatusCheck::OneOf {
            values: vec![json!(0), json!(1)],
        };

        Self::new(vec![
            ContractRow::new("switch")
                .status(StatusCheck::Boolean)
                .command(CommandSpec::new(1)),
            ContractRow::new("motion").status(StatusCheck::Boolean),
            ContractRow::new("dimmer")
                .status(percent())
                .command(CommandSpec::new(50)),
            ContractRow::new("drive")
                .status(StatusCheck::OneOf {
                    values: vec![json!(0), json!(1), json!(2), json!(3)],
                })
                .command(CommandSpec::new(2)),
            ContractRow::new("illumination").status(percent()),
            ContractRow::new("temperature").status(StatusCheck::FloatRange {
                min: -40.0,
                max: 50.0,
            }),
            ContractRow::new("humidity").status(percent()),
            // 0 closed, 1 open
            ContractRow::new("checker").status(binary()),
            // 0 ok, 1 flood
            ContractRow::new("water").status(binary()),
            // 0 no voltage, 1 voltage
            ContractRow::new("power").status(binary()),
            ContractRow::new(&["LED", "LED3S/M", "RGBW"][..])
                .command(CommandSpec::new(100).with_query("color=ff5733")),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hitepro_table_check_order() {
        let labels: Vec<String> = ContractTable::hitepro()
            .checks()
            .iter()
            .map(CheckSpec::label)
            .collect();

        assert_eq!(
            labels,
            vec![
                "switch: status is boolean",
                "motion: status is boolean",
                "dimmer: status is integer in [0, 100]",
                "drive: status is one of [0, 1, 2, 3]",
                "illumination: status is integer in [0, 100]",
                "temperature: status is number in [-40, 50]",
                "humidity: status is integer in [0, 100]",
                "checker: status is one of [0, 1]",
                "water: status is one of [0, 1]",
                "power: status is one of [0, 1]",
                "switch: accepts command 1",
                "dimmer: accepts command 50",
                "drive: accepts command 2",
                "LED / LED3S/M / RGBW: accepts command 100?color=ff5733",
            ]
        );
    }

    #[test]
    fn test_commands_default_to_literal_ack() {
        let table = ContractTable::hitepro();
        for row in table.rows() {
            if let Some(cmd) = &row.command {
                assert_eq!(cmd.expected_result, "Command send");
            }
        }
    }

    #[test]
    fn test_selector_resolution() {
        let dir = DeviceDirectory::new(vec![Device::new("7", "RGBW"), Device::new("8", "LED3S/M")]);

        let colors = DeviceTypeSelector::from(&["LED", "LED3S/M", "RGBW"][..]);
        assert_eq!(colors.resolve(&dir).unwrap().id, "8");

        let switch = DeviceTypeSelector::from("switch");
        assert!(switch.resolve(&dir).is_none());
        assert_eq!(switch.not_found_reason(), "No device of type \"switch\" found");
        assert_eq!(
            colors.not_found_reason(),
            "No device of any type [LED, LED3S/M, RGBW] found"
        );
    }

    #[test]
    fn test_row_deserializes_from_yaml() {
        let yaml = r#"
rows:
  - device_type: dimmer
    status: { kind: integer_range, min: 0, max: 100 }
    command: { value: 50 }
  - device_type: [LED, RGBW]
    command: { value: "100", query: "color=00ff00", expected_result: "OK" }
  - device_type: water
    status: { kind: one_of, values: [0, 1] }
"#;
        let table: ContractTable = serde_yaml::from_str(yaml).unwrap();
        let rows = table.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].device_type, DeviceTypeSelector::from("dimmer"));
        assert_eq!(rows[0].command, Some(CommandSpec::new(50)));
        assert_eq!(
            rows[1].command,
            Some(CommandSpec::new(100).with_query("color=00ff00").expecting("OK"))
        );
        assert_eq!(
            rows[2].status,
            Some(StatusCheck::OneOf {
                values: vec![json!(0), json!(1)]
            })
        );
        assert_eq!(table.checks().len(), 4);
    }
}
