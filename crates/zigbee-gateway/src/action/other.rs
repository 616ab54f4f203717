// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Actions for vendors with a single supported device.

use serde_json::Value;

use super::value::{enum_index, to_ranged};
use super::{ActionKind, ActionObject, Frame};
use crate::error::ActionError;
use crate::zcl;

const PERENIO_ACTIONS: &[&str] = &[
    "powerOnStatus",
    "resetAlarms",
    "voltageMin",
    "voltageMax",
    "powerMax",
    "energyLimit",
];

const PERENIO_POWER_ON_STATUS: [&str; 3] = ["off", "on", "previous"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherAction {
    PerenioSmartPlug,
}

impl OtherAction {
    pub fn from_type(key: &str) -> Option<Self> {
        match key {
            "perenioSmartPlug" => Some(Self::PerenioSmartPlug),
            _ => None,
        }
    }

    pub fn object(self) -> ActionObject {
        match self {
            Self::PerenioSmartPlug => ActionObject::with_actions(
                "perenioSmartPlug",
                zcl::CLUSTER_PERENIO,
                0,
                PERENIO_ACTIONS,
                ActionKind::Other(self),
            ),
        }
    }

    pub(crate) fn encode(&self, frame: &Frame<'_>, name: &str, value: &Value) -> Result<Vec<u8>, ActionError> {
        let invalid = || ActionError::invalid(name, value);

        match self {
            Self::PerenioSmartPlug => match name {
                "powerOnStatus" => {
                    let index = enum_index(value, &PERENIO_POWER_ON_STATUS).ok_or_else(invalid)?;
                    Ok(frame.write(0x0000, zcl::DATA_TYPE_8BIT_ENUM, &[index as u8]))
                }
                // Any value clears the latched alarms.
                "resetAlarms" => Ok(frame.write(0x0001, zcl::DATA_TYPE_8BIT_UNSIGNED, &[0x00])),
                _ => {
                    let attribute = match name {
                        "voltageMin" => 0x0004,
                        "voltageMax" => 0x0005,
                        "powerMax" => 0x000B,
                        _ => 0x000F,
                    };
                    let raw = to_ranged(value, 0, i64::from(u16::MAX)).ok_or_else(invalid)? as u16;
                    Ok(frame.write(attribute, zcl::DATA_TYPE_16BIT_UNSIGNED, &raw.to_le_bytes()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_perenio_settings() {
        let mut action = ActionObject::from_type("perenioSmartPlug").unwrap();
        assert_eq!(action.cluster_id(), zcl::CLUSTER_PERENIO);

        let frame = action.request("powerOnStatus", &json!("previous")).unwrap();
        assert_eq!(&frame[3..], &[0x00, 0x00, zcl::DATA_TYPE_8BIT_ENUM, 0x02]);

        let frame = action.request("voltageMax", &json!(250)).unwrap();
        assert_eq!(&frame[3..], &[0x05, 0x00, zcl::DATA_TYPE_16BIT_UNSIGNED, 0xFA, 0x00]);
        assert_eq!(frame[1], 1);
    }
}
