// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PTVO custom firmware: relays on the on/off cluster and numeric outputs on
//! the analog input present value.

use serde_json::Value;

use super::standard::status_command;
use super::value::to_f64;
use super::{ActionKind, ActionObject, Frame};
use crate::error::ActionError;
use crate::zcl;

const ATTR_PRESENT_VALUE: u16 = 0x0055;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtvoAction {
    Status,
    AnalogInput,
}

impl PtvoAction {
    pub fn from_type(key: &str) -> Option<Self> {
        match key {
            "ptvoChangePattern" => Some(Self::Status),
            "ptvoCount" | "ptvoPattern" => Some(Self::AnalogInput),
            _ => None,
        }
    }

    /// Catalogue entry for a type key. PTVO objects take their name from
    /// the key (`ptvoCount` -> `count`).
    pub fn object_for(key: &str) -> Option<ActionObject> {
        let action = Self::from_type(key)?;
        let name = match key {
            "ptvoChangePattern" => "changePattern",
            "ptvoCount" => "count",
            _ => "pattern",
        };
        Some(action.named(name))
    }

    /// Same encoder under a device-specific name (`"status2"`, `"count"`...).
    pub fn named(self, name: &str) -> ActionObject {
        let cluster_id = match self {
            Self::Status => zcl::CLUSTER_ON_OFF,
            Self::AnalogInput => zcl::CLUSTER_ANALOG_INPUT,
        };
        let attribute = match self {
            Self::Status => 0x0000,
            Self::AnalogInput => ATTR_PRESENT_VALUE,
        };
        ActionObject::with_attributes(name, cluster_id, 0, vec![attribute], ActionKind::Ptvo(self))
    }

    pub(crate) fn encode(&self, frame: &Frame<'_>, name: &str, value: &Value) -> Result<Vec<u8>, ActionError> {
        match self {
            Self::Status => {
                let command = status_command(value).ok_or_else(|| ActionError::invalid(name, value))?;
                Ok(frame.command(command, &[]))
            }
            Self::AnalogInput => {
                let number = to_f64(value).ok_or_else(|| ActionError::invalid(name, value))? as f32;
                Ok(frame.write_own(zcl::DATA_TYPE_SINGLE_PRECISION, &number.to_le_bytes()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_follow_type_key() {
        assert_eq!(PtvoAction::object_for("ptvoPattern").unwrap().name(), "pattern");
        assert_eq!(PtvoAction::object_for("ptvoCount").unwrap().name(), "count");
        assert!(PtvoAction::object_for("ptvoOther").is_none());
    }

    #[test]
    fn test_analog_input_float() {
        let mut action = PtvoAction::AnalogInput.named("count");
        let frame = action.request("count", &json!(1.5)).unwrap();
        assert_eq!(
            frame,
            vec![0x00, 0x00, 0x02, 0x55, 0x00, zcl::DATA_TYPE_SINGLE_PRECISION, 0x00, 0x00, 0xC0, 0x3F]
        );
    }

    #[test]
    fn test_change_pattern_is_on_off() {
        let mut action = PtvoAction::object_for("ptvoChangePattern").unwrap();
        assert_eq!(action.cluster_id(), zcl::CLUSTER_ON_OFF);
        assert_eq!(action.request("changePattern", &json!(true)).unwrap(), vec![0x01, 0x00, 0x01]);
    }
}
