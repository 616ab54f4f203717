// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Option-driven data-point table.
//!
//! Options map a data-point number (as a decimal string) to a list of field
//! descriptors:
//!
//! ```json
//! {
//!   "1":  [{ "name": "status", "type": "bool" }],
//!   "2":  [{ "name": "temperature", "type": "value", "divider": 10 }],
//!   "4":  [{ "name": "mode", "type": "enum" }],
//!   "status": ["off", "on"],
//!   "mode": ["auto", "manual"]
//! }
//! ```
//!
//! Labels for `bool` and `enum` fields are read from the option named after
//! the field.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::datapoint::DataPointValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Value,
    Enum,
    /// Anything else emits the descriptor's constant `value`.
    #[default]
    #[serde(other)]
    Constant,
}

/// One decoded field of a data point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub invert: bool,
    #[serde(default = "default_divider")]
    pub divider: f64,
    #[serde(default)]
    pub round: bool,
    /// Parsed but not applied: table values are reported unshifted.
    #[serde(default)]
    pub offset: Option<f64>,
    #[serde(default)]
    pub value: Option<Value>,
}

fn default_divider() -> f64 {
    1.0
}

/// Descriptors configured for `data_point`. Entries that fail to
/// deserialize are skipped.
pub fn fields(options: &Map<String, Value>, data_point: u8) -> Vec<FieldDescriptor> {
    let Some(Value::Array(list)) = options.get(&data_point.to_string()) else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|item| match serde_json::from_value::<FieldDescriptor>(item.clone()) {
            Ok(field) => Some(field),
            Err(e) => {
                tracing::debug!("Skipping data point {} descriptor: {}", data_point, e);
                None
            }
        })
        .collect()
}

fn label(options: &Map<String, Value>, name: &str, index: i64) -> Option<String> {
    let index = usize::try_from(index).ok()?;
    let text = options.get(name)?.as_array()?.get(index)?.as_str()?;
    (!text.is_empty()).then(|| text.to_string())
}

/// Decode `data` through `fields` into `map`.
pub fn apply(fields: &[FieldDescriptor], data: &DataPointValue, options: &Map<String, Value>, map: &mut Map<String, Value>) {
    for field in fields {
        if field.name.is_empty() {
            continue;
        }

        match field.field_type {
            FieldType::Bool => {
                let check = data.as_bool() != field.invert;
                let value = match label(options, &field.name, i64::from(check)) {
                    Some(text) => Value::from(text),
                    None => Value::Bool(check),
                };
                map.insert(field.name.clone(), value);
            }
            FieldType::Value => {
                let mut value = data.as_f64() / field.divider;
                if field.round {
                    value = value.round();
                }
                map.insert(field.name.clone(), Value::from(value));
            }
            FieldType::Enum => {
                if let Some(text) = label(options, &field.name, data.as_int()) {
                    map.insert(field.name.clone(), Value::from(text));
                }
            }
            FieldType::Constant => {
                if let Some(value) = &field.value {
                    map.insert(field.name.clone(), value.clone());
                }
            }
        }
    }
}
