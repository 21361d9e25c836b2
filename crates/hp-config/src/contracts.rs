//! Contract tables loaded from YAML
//!
//! ```yaml
//! rows:
//!   - device_type: dimmer
//!     status: { kind: integer_range, min: 0, max: 100 }
//!     command: { value: 50 }
//!   - device_type: [LED, LED3S/M, RGBW]
//!     command: { value: 100, query: "color=ff5733" }
//! ```

use crate::error::{ConfigError, ConfigResult};
use hp_core::{ContractRow, ContractTable, DeviceTypeSelector, StatusCheck};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read and validate a contract table file
pub fn load_contract_table(path: impl AsRef<Path>) -> ConfigResult<ContractTable> {
    let path = path.as_ref();
    debug!("Loading contract table: {:?}", path);

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_contract_table(&content, path)
}

/// Parse and validate a contract table; `path` is only used for error messages
pub fn parse_contract_table(content: &str, path: &Path) -> ConfigResult<ContractTable> {
    let table: ContractTable =
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            source: e,
        })?;

    for (index, row) in table.rows().iter().enumerate() {
        validate_row(index, row)?;
    }

    debug!("Contract table has {} rows", table.rows().len());
    Ok(table)
}

fn validate_row(index: usize, row: &ContractRow) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: format!("rows[{}]", index),
        reason,
    };

    match &row.device_type {
        DeviceTypeSelector::Single(t) if t.is_empty() => {
            return Err(invalid("device_type must not be empty".to_string()));
        }
        DeviceTypeSelector::AnyOf(types) if types.is_empty() => {
            return Err(invalid("device_type alias list must not be empty".to_string()));
        }
        _ => {}
    }

    if row.status.is_none() && row.command.is_none() {
        return Err(invalid(format!(
            "'{}' declares neither status nor command",
            row.device_type
        )));
    }

    match &row.status {
        Some(StatusCheck::IntegerRange { min, max }) if min > max => {
            Err(invalid(format!("integer range min {} exceeds max {}", min, max)))
        }
        Some(StatusCheck::FloatRange { min, max }) if !(min <= max) => {
            Err(invalid(format!("float range min {} exceeds max {}", min, max)))
        }
        Some(StatusCheck::OneOf { values }) if values.is_empty() => {
            Err(invalid("one_of needs at least one value".to_string()))
        }
        _ => Ok(()),
    }
}
