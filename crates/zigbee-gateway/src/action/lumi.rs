// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LUMI (Aqara) manufacturer-specific attributes.

use serde_json::Value;

use super::value::{enum_index, to_bool, to_ranged};
use super::{ActionKind, ActionObject, Frame};
use crate::error::ActionError;
use crate::zcl;

const PRESENCE_ACTIONS: &[&str] = &["sensitivityMode", "detectionMode", "distanceMode", "resetPresence"];
const BUTTON_ACTIONS: &[&str] = &["buttonMode", "leftMode", "rightMode"];

const SENSITIVITY_MODES: [&str; 3] = ["low", "medium", "high"];
const DETECTION_MODES: [&str; 2] = ["undirected", "directed"];
const DISTANCE_MODES: [&str; 3] = ["far", "middle", "near"];

const BUTTON_MODES: [(&str, u8); 4] = [
    ("relay", 0x12),
    ("leftRelay", 0x12),
    ("rightRelay", 0x22),
    ("decoupled", 0xFE),
];

const OPERATION_MODES: [&str; 2] = ["decoupled", "relay"];
const INDICATOR_MODES: [&str; 2] = ["default", "inverted"];
const SWITCH_MODES: [&str; 2] = ["fast", "multi"];

const ATTR_PRESENT_VALUE: u16 = 0x0055;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LumiAction {
    PresenceSensor,
    ButtonMode,
    OperationMode,
    IndicatorMode,
    SwitchMode,
    StatusMemory,
    Interlock,
    CoverPosition,
}

impl LumiAction {
    pub fn from_type(key: &str) -> Option<Self> {
        Some(match key {
            "lumiPresenceSensor" => Self::PresenceSensor,
            "lumiButtonMode" => Self::ButtonMode,
            "lumiOperationMode" => Self::OperationMode,
            "lumiIndicatorMode" => Self::IndicatorMode,
            "lumiSwitchMode" => Self::SwitchMode,
            "lumiStatusMemory" => Self::StatusMemory,
            "lumiInterlock" => Self::Interlock,
            "lumiCoverPosition" => Self::CoverPosition,
            _ => return None,
        })
    }

    pub fn object(self) -> ActionObject {
        let kind = ActionKind::Lumi(self);
        let lumi = zcl::MANUFACTURER_CODE_LUMI;

        match self {
            Self::PresenceSensor => {
                ActionObject::with_actions("presenceSensor", zcl::CLUSTER_LUMI, lumi, PRESENCE_ACTIONS, kind)
            }
            Self::ButtonMode => {
                ActionObject::with_actions("buttonMode", zcl::CLUSTER_BASIC, lumi, BUTTON_ACTIONS, kind)
            }
            Self::OperationMode => {
                ActionObject::with_attributes("operationMode", zcl::CLUSTER_LUMI, lumi, vec![0x0009], kind)
            }
            Self::IndicatorMode => {
                ActionObject::with_attributes("indicatorMode", zcl::CLUSTER_LUMI, lumi, vec![0x00F0], kind)
            }
            Self::SwitchMode => {
                ActionObject::with_attributes("switchMode", zcl::CLUSTER_LUMI, lumi, vec![0x0200], kind)
            }
            Self::StatusMemory => {
                ActionObject::with_attributes("statusMemory", zcl::CLUSTER_LUMI, lumi, vec![0x0201], kind)
            }
            Self::Interlock => {
                ActionObject::with_attributes("interlock", zcl::CLUSTER_BINARY_OUTPUT, lumi, vec![0xFF06], kind)
            }
            Self::CoverPosition => ActionObject::with_attributes(
                "position",
                zcl::CLUSTER_ANALOG_OUTPUT,
                0,
                vec![ATTR_PRESENT_VALUE],
                kind,
            ),
        }
    }

    pub(crate) fn encode(&self, frame: &Frame<'_>, name: &str, value: &Value) -> Result<Vec<u8>, ActionError> {
        let invalid = || ActionError::invalid(name, value);
        let uint8 = |attribute: u16, raw: u8| frame.write(attribute, zcl::DATA_TYPE_8BIT_UNSIGNED, &[raw]);

        match self {
            Self::PresenceSensor => match name {
                "sensitivityMode" => {
                    let index = enum_index(value, &SENSITIVITY_MODES).ok_or_else(invalid)?;
                    Ok(uint8(0x010C, index as u8 + 1))
                }
                "detectionMode" => {
                    let index = enum_index(value, &DETECTION_MODES).ok_or_else(invalid)?;
                    Ok(uint8(0x0144, index as u8))
                }
                "distanceMode" => {
                    let index = enum_index(value, &DISTANCE_MODES).ok_or_else(invalid)?;
                    Ok(uint8(0x0146, index as u8))
                }
                _ => Ok(uint8(0x0157, 0x01)),
            },

            Self::ButtonMode => {
                let text = value.as_str().ok_or_else(invalid)?;
                let raw = BUTTON_MODES
                    .iter()
                    .find(|(label, _)| *label == text)
                    .map(|(_, raw)| *raw)
                    .ok_or_else(invalid)?;
                let attribute = if name == "rightMode" { 0xFF23 } else { 0xFF22 };
                Ok(uint8(attribute, raw))
            }

            Self::OperationMode | Self::IndicatorMode | Self::SwitchMode => {
                let labels: &[&str] = match self {
                    Self::OperationMode => &OPERATION_MODES,
                    Self::IndicatorMode => &INDICATOR_MODES,
                    _ => &SWITCH_MODES,
                };
                let index = enum_index(value, labels).ok_or_else(invalid)?;
                Ok(frame.write_own(zcl::DATA_TYPE_8BIT_UNSIGNED, &[index as u8]))
            }

            Self::StatusMemory | Self::Interlock => {
                let enabled = to_bool(value).ok_or_else(invalid)?;
                Ok(frame.write_own(zcl::DATA_TYPE_BOOLEAN, &[u8::from(enabled)]))
            }

            Self::CoverPosition => {
                let position = to_ranged(value, 0, 100).ok_or_else(invalid)? as f32;
                Ok(frame.write_own(zcl::DATA_TYPE_SINGLE_PRECISION, &position.to_le_bytes()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(key: &str) -> ActionObject {
        ActionObject::from_type(key).unwrap()
    }

    #[test]
    fn test_presence_sensor_targets_attribute_per_name() {
        let mut action = object("lumiPresenceSensor");
        assert_eq!(action.manufacturer_code(), zcl::MANUFACTURER_CODE_LUMI);

        let frame = action.request("sensitivityMode", &json!("high")).unwrap();
        assert_eq!(frame, vec![0x04, 0x5F, 0x11, 0x00, 0x02, 0x0C, 0x01, 0x20, 0x03]);

        let frame = action.request("distanceMode", &json!("near")).unwrap();
        assert_eq!(&frame[5..], &[0x46, 0x01, 0x20, 0x02]);
        assert_eq!(frame[3], 1);

        let frame = action.request("resetPresence", &json!(null)).unwrap();
        assert_eq!(&frame[5..], &[0x57, 0x01, 0x20, 0x01]);

        assert!(action.request("presenceSensor", &json!(1)).is_err());
    }

    #[test]
    fn test_button_mode_left_and_right() {
        let mut action = object("lumiButtonMode");
        let left = action.request("leftMode", &json!("decoupled")).unwrap();
        assert_eq!(&left[5..], &[0x22, 0xFF, 0x20, 0xFE]);

        let right = action.request("rightMode", &json!("rightRelay")).unwrap();
        assert_eq!(&right[5..], &[0x23, 0xFF, 0x20, 0x22]);
    }

    #[test]
    fn test_interlock_bool() {
        let mut action = object("lumiInterlock");
        let frame = action.request("interlock", &json!(true)).unwrap();
        assert_eq!(&frame[5..], &[0x06, 0xFF, zcl::DATA_TYPE_BOOLEAN, 0x01]);
    }

    #[test]
    fn test_cover_position_has_no_manufacturer_code() {
        let mut action = object("lumiCoverPosition");
        let frame = action.request("position", &json!(50)).unwrap();
        assert_eq!(frame[0], 0x00);
        assert_eq!(&frame[3..6], &[0x55, 0x00, zcl::DATA_TYPE_SINGLE_PRECISION]);
    }
}
