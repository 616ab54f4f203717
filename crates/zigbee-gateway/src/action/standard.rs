// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Standard ZCL actions: on/off, level, window covering and color control.

use serde_json::Value;

use super::value::{enum_index, to_bool, to_i64, to_ranged, to_rgb};
use super::{ActionKind, ActionObject, Frame};
use crate::error::ActionError;
use crate::zcl;

const CMD_OFF: u8 = 0x00;
const CMD_ON: u8 = 0x01;
const CMD_TOGGLE: u8 = 0x02;

const CMD_MOVE_TO_LEVEL_WITH_ON_OFF: u8 = 0x04;
const CMD_MOVE_WITH_ON_OFF: u8 = 0x05;
const CMD_STOP_WITH_ON_OFF: u8 = 0x07;

const CMD_COVER_OPEN: u8 = 0x00;
const CMD_COVER_CLOSE: u8 = 0x01;
const CMD_COVER_STOP: u8 = 0x02;
const CMD_GO_TO_LIFT_PERCENTAGE: u8 = 0x05;
const CMD_GO_TO_TILT_PERCENTAGE: u8 = 0x08;

const CMD_MOVE_TO_HUE_AND_SATURATION: u8 = 0x06;
const CMD_MOVE_TO_COLOR: u8 = 0x07;
const CMD_MOVE_TO_COLOR_TEMPERATURE: u8 = 0x0A;

const MOVE_RATE: u8 = 0x55;

const POWER_ON_STATUS: [&str; 3] = ["off", "on", "toggle"];
const POWER_ON_PREVIOUS: u8 = 0xFF;

const COVER_COMMANDS: [(&str, u8); 3] = [
    ("open", CMD_COVER_OPEN),
    ("close", CMD_COVER_CLOSE),
    ("stop", CMD_COVER_STOP),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardAction {
    Status,
    PowerOnStatus,
    Level,
    CoverStatus,
    CoverPosition,
    CoverTilt,
    ColorHs,
    ColorXy,
    ColorTemperature,
}

impl StandardAction {
    pub fn from_type(key: &str) -> Option<Self> {
        Some(match key {
            "status" => Self::Status,
            "powerOnStatus" => Self::PowerOnStatus,
            "level" => Self::Level,
            "coverStatus" => Self::CoverStatus,
            "coverPosition" => Self::CoverPosition,
            "coverTilt" => Self::CoverTilt,
            "colorHS" => Self::ColorHs,
            "colorXY" => Self::ColorXy,
            "colorTemperature" => Self::ColorTemperature,
            _ => return None,
        })
    }

    pub fn object(self) -> ActionObject {
        let (name, cluster_id, attributes) = match self {
            Self::Status => ("status", zcl::CLUSTER_ON_OFF, vec![0x0000]),
            Self::PowerOnStatus => ("powerOnStatus", zcl::CLUSTER_ON_OFF, vec![0x4003]),
            Self::Level => ("level", zcl::CLUSTER_LEVEL_CONTROL, vec![0x0000]),
            Self::CoverStatus => ("cover", zcl::CLUSTER_WINDOW_COVERING, vec![]),
            Self::CoverPosition => ("position", zcl::CLUSTER_WINDOW_COVERING, vec![0x0008]),
            Self::CoverTilt => ("tilt", zcl::CLUSTER_WINDOW_COVERING, vec![0x0009]),
            Self::ColorHs => ("color", zcl::CLUSTER_COLOR_CONTROL, vec![0x0000, 0x0001]),
            Self::ColorXy => ("color", zcl::CLUSTER_COLOR_CONTROL, vec![0x0003, 0x0004]),
            Self::ColorTemperature => ("colorTemperature", zcl::CLUSTER_COLOR_CONTROL, vec![0x0007]),
        };
        ActionObject::with_attributes(name, cluster_id, 0, attributes, ActionKind::Standard(self))
    }

    pub(crate) fn encode(&self, frame: &Frame<'_>, name: &str, value: &Value) -> Result<Vec<u8>, ActionError> {
        let invalid = || ActionError::invalid(name, value);

        match self {
            Self::Status => {
                let command = status_command(value).ok_or_else(invalid)?;
                Ok(frame.command(command, &[]))
            }

            Self::PowerOnStatus => {
                let raw = if value.as_str() == Some("previous") {
                    POWER_ON_PREVIOUS
                } else {
                    enum_index(value, &POWER_ON_STATUS).ok_or_else(invalid)? as u8
                };
                Ok(frame.write_own(zcl::DATA_TYPE_8BIT_ENUM, &[raw]))
            }

            Self::Level => level_request(frame, value).ok_or_else(invalid),

            Self::CoverStatus => {
                let text = value.as_str().ok_or_else(invalid)?;
                let command = COVER_COMMANDS
                    .iter()
                    .find(|(label, _)| *label == text)
                    .map(|(_, command)| *command)
                    .ok_or_else(invalid)?;
                Ok(frame.command(command, &[]))
            }

            Self::CoverPosition | Self::CoverTilt => {
                // Devices count percent closed, requests carry percent open.
                let position = to_ranged(value, 0, 100).ok_or_else(invalid)? as u8;
                let command = if *self == Self::CoverPosition {
                    CMD_GO_TO_LIFT_PERCENTAGE
                } else {
                    CMD_GO_TO_TILT_PERCENTAGE
                };
                Ok(frame.command(command, &[100 - position]))
            }

            Self::ColorHs => {
                let (hue, saturation) = rgb_to_hs(to_rgb(value).ok_or_else(invalid)?);
                Ok(frame.command(CMD_MOVE_TO_HUE_AND_SATURATION, &[hue, saturation, 0x00, 0x00]))
            }

            Self::ColorXy => {
                let (x, y) = rgb_to_xy(to_rgb(value).ok_or_else(invalid)?);
                let mut payload = Vec::with_capacity(6);
                payload.extend_from_slice(&x.to_le_bytes());
                payload.extend_from_slice(&y.to_le_bytes());
                payload.extend_from_slice(&[0x00, 0x00]);
                Ok(frame.command(CMD_MOVE_TO_COLOR, &payload))
            }

            Self::ColorTemperature => {
                let mireds = to_ranged(value, 0, i64::from(u16::MAX)).ok_or_else(invalid)? as u16;
                let mut payload = mireds.to_le_bytes().to_vec();
                payload.extend_from_slice(&[0x00, 0x00]);
                Ok(frame.command(CMD_MOVE_TO_COLOR_TEMPERATURE, &payload))
            }
        }
    }
}

/// On/off command for a boolean or `"toggle"`.
pub(crate) fn status_command(value: &Value) -> Option<u8> {
    if value.as_str() == Some("toggle") {
        return Some(CMD_TOGGLE);
    }
    to_bool(value).map(|on| if on { CMD_ON } else { CMD_OFF })
}

/// Level requests: a level, `[level, transition]`, or a move / stop keyword.
fn level_request(frame: &Frame<'_>, value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::String(s) if s == "moveUp" => Some(frame.command(CMD_MOVE_WITH_ON_OFF, &[0x00, MOVE_RATE])),
        Value::String(s) if s == "moveDown" => Some(frame.command(CMD_MOVE_WITH_ON_OFF, &[0x01, MOVE_RATE])),
        Value::String(s) if s == "moveStop" => Some(frame.command(CMD_STOP_WITH_ON_OFF, &[])),
        Value::Array(list) if list.len() == 2 => {
            let level = to_ranged(&list[0], 0, 255)?;
            let time = to_ranged(&list[1], 0, i64::from(u16::MAX))?;
            Some(move_to_level(frame, level, time as u16))
        }
        _ => {
            let level = to_i64(value).filter(|v| (0..=255).contains(v))?;
            Some(move_to_level(frame, level, 0))
        }
    }
}

fn move_to_level(frame: &Frame<'_>, level: i64, time: u16) -> Vec<u8> {
    // 0xFF is reserved on the wire.
    let level = level.min(0xFE) as u8;
    let mut payload = vec![level];
    payload.extend_from_slice(&time.to_le_bytes());
    frame.command(CMD_MOVE_TO_LEVEL_WITH_ON_OFF, &payload)
}

/// RGB to ZCL hue / saturation (both scaled to 0..=254).
pub fn rgb_to_hs([r, g, b]: [u8; 3]) -> (u8, u8) {
    let (r, g, b) = (f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    (
        (hue / 360.0 * 254.0).round() as u8,
        (saturation * 254.0).round() as u8,
    )
}

/// RGB to CIE 1931 x / y scaled to 0..=0xFFFF.
pub fn rgb_to_xy(rgb: [u8; 3]) -> (u16, u16) {
    let linear = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c > 0.04045 {
            ((c + 0.055) / 1.055).powf(2.4)
        } else {
            c / 12.92
        }
    };
    let (r, g, b) = (linear(rgb[0]), linear(rgb[1]), linear(rgb[2]));

    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;
    let sum = x + y + z;

    if sum == 0.0 {
        return (0, 0);
    }

    (
        (x / sum * 65535.0).round() as u16,
        (y / sum * 65535.0).round() as u16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(key: &str, name: &str, value: Value) -> Vec<u8> {
        ActionObject::from_type(key).unwrap().request(name, &value).unwrap()
    }

    #[test]
    fn test_status_commands() {
        assert_eq!(request("status", "status", json!(true)), vec![0x01, 0x00, CMD_ON]);
        assert_eq!(request("status", "status", json!("off")), vec![0x01, 0x00, CMD_OFF]);
        assert_eq!(request("status", "status", json!("toggle")), vec![0x01, 0x00, CMD_TOGGLE]);
    }

    #[test]
    fn test_power_on_status_writes_attribute() {
        let frame = request("powerOnStatus", "powerOnStatus", json!("previous"));
        assert_eq!(frame, vec![0x00, 0x00, 0x02, 0x03, 0x40, zcl::DATA_TYPE_8BIT_ENUM, 0xFF]);
    }

    #[test]
    fn test_level_variants() {
        assert_eq!(
            request("level", "level", json!(255)),
            vec![0x01, 0x00, CMD_MOVE_TO_LEVEL_WITH_ON_OFF, 0xFE, 0x00, 0x00]
        );
        assert_eq!(
            request("level", "level", json!([10, 20])),
            vec![0x01, 0x00, CMD_MOVE_TO_LEVEL_WITH_ON_OFF, 10, 20, 0x00]
        );
        assert_eq!(
            request("level", "level", json!("moveStop")),
            vec![0x01, 0x00, CMD_STOP_WITH_ON_OFF]
        );
    }

    #[test]
    fn test_cover_position_is_inverted() {
        let frame = request("coverPosition", "position", json!(30));
        assert_eq!(frame, vec![0x01, 0x00, CMD_GO_TO_LIFT_PERCENTAGE, 70]);

        let mut action = ActionObject::from_type("coverPosition").unwrap();
        assert!(action.request("position", &json!(101)).is_err());
    }

    #[test]
    fn test_cover_status() {
        assert_eq!(request("coverStatus", "cover", json!("stop")), vec![0x01, 0x00, CMD_COVER_STOP]);
    }

    #[test]
    fn test_color_conversions() {
        assert_eq!(rgb_to_hs([255, 0, 0]), (0, 254));
        assert_eq!(rgb_to_hs([0, 0, 255]), (169, 254));
        assert_eq!(rgb_to_xy([0, 0, 0]), (0, 0));

        let frame = request("colorTemperature", "colorTemperature", json!(370));
        assert_eq!(frame, vec![0x01, 0x00, CMD_MOVE_TO_COLOR_TEMPERATURE, 0x72, 0x01, 0x00, 0x00]);
    }
}
