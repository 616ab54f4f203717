// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tuya actions.
//!
//! Most devices are driven through data-point requests on the 0xEF00
//! cluster. A few plain-ZCL Tuya devices use vendor attributes on the
//! standard on/off and window covering clusters instead.

use serde_json::{Map, Value};

use super::value::{enum_index, to_bool, to_f64, to_i64, to_ranged};
use super::{ActionKind, ActionObject, Frame};
use crate::datapoint::DataPointValue;
use crate::error::ActionError;
use crate::zcl;

const LIGHT_DIMMER_ACTIONS: &[&str] = &["status", "level", "levelMin", "lightType", "levelMax"];

const MOES_ELECTRIC_ACTIONS: &[&str] = &[
    "status",
    "operationMode",
    "heatingPoint",
    "temperatureLimitMax",
    "deadZoneTemperature",
    "temperatureLimitMin",
    "temperatureCalibration",
    "childLock",
    "sensor",
];

const MOES_RADIATOR_ACTIONS: &[&str] = &[
    "operationMode",
    "heatingPoint",
    "boost",
    "windowDetection",
    "childLock",
    "boostTimeout",
    "temperatureCalibration",
    "ecoMode",
    "ecoModeTemperature",
    "temperatureLimitMax",
    "temperatureLimitMin",
];

/// Weekly program fields, in wire order: 3 day types x 4 periods x
/// (hour, minute, temperature).
#[rustfmt::skip]
pub const MOES_PROGRAM_ACTIONS: &[&str] = &[
    "weekdayP1Hour", "weekdayP1Minute", "weekdayP1Temperature",
    "weekdayP2Hour", "weekdayP2Minute", "weekdayP2Temperature",
    "weekdayP3Hour", "weekdayP3Minute", "weekdayP3Temperature",
    "weekdayP4Hour", "weekdayP4Minute", "weekdayP4Temperature",
    "saturdayP1Hour", "saturdayP1Minute", "saturdayP1Temperature",
    "saturdayP2Hour", "saturdayP2Minute", "saturdayP2Temperature",
    "saturdayP3Hour", "saturdayP3Minute", "saturdayP3Temperature",
    "saturdayP4Hour", "saturdayP4Minute", "saturdayP4Temperature",
    "sundayP1Hour", "sundayP1Minute", "sundayP1Temperature",
    "sundayP2Hour", "sundayP2Minute", "sundayP2Temperature",
    "sundayP3Hour", "sundayP3Minute", "sundayP3Temperature",
    "sundayP4Hour", "sundayP4Minute", "sundayP4Temperature",
];

/// Data point carrying the Moes weekly program.
pub const MOES_PROGRAM_DATA_POINT: u8 = 0x65;
pub const MOES_PROGRAM_SIZE: usize = 36;

const NEO_SIREN_ACTIONS: &[&str] = &["volume", "duration", "alarm", "melody"];
const WATER_VALVE_ACTIONS: &[&str] = &["status", "timeout", "threshold"];
const PRESENCE_ACTIONS: &[&str] = &["sensitivity", "distanceMin", "distanceMax", "detectionDelay", "fadingTime"];
const RADAR_ACTIONS: &[&str] = &["radarSensitivity", "tumbleSwitch", "tumbleAlarmTime", "radarScene", "fallSensitivity"];
const COVER_MOTOR_ACTIONS: &[&str] = &["cover", "position", "reverse", "speed"];
const COVER_SWITCH_ACTIONS: &[&str] = &["calibration", "reverse"];

const LIGHT_TYPES: [&str; 3] = ["led", "incandescent", "halogen"];
const MOES_ELECTRIC_MODES: [&str; 2] = ["manual", "program"];
const MOES_SENSORS: [&str; 3] = ["internal", "both", "external"];
const MOES_RADIATOR_MODES: [&str; 4] = ["program", "manual", "temporaryManual", "holiday"];
const SIREN_VOLUMES: [&str; 3] = ["low", "medium", "high"];
const RADAR_SCENES: [&str; 7] = ["default", "area", "toilet", "bedroom", "parlour", "office", "hotel"];
const COVER_COMMANDS: [&str; 3] = ["open", "stop", "close"];

const SWITCH_OPERATION_MODES: [&str; 2] = ["command", "event"];
const SWITCH_INDICATOR_MODES: [&str; 4] = ["off", "default", "inverted", "on"];
const SWITCH_TYPES: [&str; 3] = ["toggle", "static", "momentary"];
const SWITCH_POWER_ON_STATUS: [&str; 3] = ["off", "on", "previous"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuyaAction {
    LightDimmer,
    ElectricityMeter,
    MoesElectricThermostat,
    MoesRadiatorThermostat,
    /// Holds the last known program, the device only accepts it whole.
    MoesThermostatProgram(Box<[u8; MOES_PROGRAM_SIZE]>),
    NeoSiren,
    WaterValve,
    PresenceSensor,
    RadarSensor,
    CoverMotor,
    CoverSwitch,
    ChildLock,
    OperationMode,
    IndicatorMode,
    SwitchType,
    PowerOnStatus,
}

fn bool_dp(value: &Value) -> Option<DataPointValue> {
    to_bool(value).map(DataPointValue::Bool)
}

/// VALUE data point, negative numbers go out as two's complement.
fn value_dp(value: &Value) -> Option<DataPointValue> {
    scaled_dp(value, 1.0)
}

fn scaled_dp(value: &Value, factor: f64) -> Option<DataPointValue> {
    let scaled = (to_f64(value)? * factor).round();
    if scaled < f64::from(i32::MIN) || scaled > f64::from(u32::MAX) {
        return None;
    }
    Some(DataPointValue::Value(scaled as i64 as u32))
}

fn enum_dp(value: &Value, labels: &[&str]) -> Option<DataPointValue> {
    enum_index(value, labels).map(|index| DataPointValue::Enum(index as u8))
}

impl TuyaAction {
    pub fn from_type(key: &str) -> Option<Self> {
        Some(match key {
            "tuyaLightDimmer" => Self::LightDimmer,
            "tuyaElectricityMeter" => Self::ElectricityMeter,
            "tuyaMoesElectricThermostat" => Self::MoesElectricThermostat,
            "tuyaMoesRadiatorThermostat" => Self::MoesRadiatorThermostat,
            "tuyaMoesThermostatProgram" => Self::MoesThermostatProgram(Box::new([0; MOES_PROGRAM_SIZE])),
            "tuyaNeoSiren" => Self::NeoSiren,
            "tuyaWaterValve" => Self::WaterValve,
            "tuyaPresenceSensor" => Self::PresenceSensor,
            "tuyaRadarSensor" => Self::RadarSensor,
            "tuyaCoverMotor" => Self::CoverMotor,
            "tuyaCoverSwitch" => Self::CoverSwitch,
            "tuyaChildLock" => Self::ChildLock,
            "tuyaOperationMode" => Self::OperationMode,
            "tuyaIndicatorMode" => Self::IndicatorMode,
            "tuyaSwitchType" => Self::SwitchType,
            "tuyaPowerOnStatus" => Self::PowerOnStatus,
            _ => return None,
        })
    }

    pub fn object(self) -> ActionObject {
        let data = zcl::CLUSTER_TUYA_DATA;
        let actions = |name: &str, list: &'static [&'static str], kind: Self| {
            ActionObject::with_actions(name, data, 0, list, ActionKind::Tuya(kind))
        };
        let attribute = |name: &str, cluster_id: u16, attribute_id: u16, kind: Self| {
            ActionObject::with_attributes(name, cluster_id, 0, vec![attribute_id], ActionKind::Tuya(kind))
        };

        match self {
            Self::LightDimmer => actions("lightDimmer", LIGHT_DIMMER_ACTIONS, self),
            Self::ElectricityMeter => {
                ActionObject::with_attributes("status", data, 0, Vec::new(), ActionKind::Tuya(self))
            }
            Self::MoesElectricThermostat => actions("moesElectricThermostat", MOES_ELECTRIC_ACTIONS, self),
            Self::MoesRadiatorThermostat => actions("moesRadiatorThermostat", MOES_RADIATOR_ACTIONS, self),
            Self::MoesThermostatProgram(_) => actions("moesThermostatProgram", MOES_PROGRAM_ACTIONS, self),
            Self::NeoSiren => actions("neoSiren", NEO_SIREN_ACTIONS, self),
            Self::WaterValve => actions("waterValve", WATER_VALVE_ACTIONS, self),
            Self::PresenceSensor => actions("presenceSensor", PRESENCE_ACTIONS, self),
            Self::RadarSensor => actions("radarSensor", RADAR_ACTIONS, self),
            Self::CoverMotor => actions("coverMotor", COVER_MOTOR_ACTIONS, self),
            Self::CoverSwitch => ActionObject::with_actions(
                "coverSwitch",
                zcl::CLUSTER_WINDOW_COVERING,
                0,
                COVER_SWITCH_ACTIONS,
                ActionKind::Tuya(self),
            ),
            Self::ChildLock => attribute("childLock", zcl::CLUSTER_ON_OFF, 0x8000, self),
            Self::OperationMode => attribute("operationMode", zcl::CLUSTER_ON_OFF, 0x8004, self),
            Self::IndicatorMode => attribute("indicatorMode", zcl::CLUSTER_ON_OFF, 0x8001, self),
            Self::SwitchType => attribute("switchType", zcl::CLUSTER_TUYA_SWITCH_MODE, 0xD030, self),
            Self::PowerOnStatus => attribute("powerOnStatus", zcl::CLUSTER_ON_OFF, 0x8002, self),
        }
    }

    /// Load the current weekly program (as decoded by the matching
    /// property) so a single-field change resends the other 35 fields.
    pub fn sync(&mut self, current: &Map<String, Value>) {
        let Self::MoesThermostatProgram(program) = self else {
            return;
        };
        for (index, name) in MOES_PROGRAM_ACTIONS.iter().enumerate() {
            if let Some(raw) = current.get(*name).and_then(|v| program_byte(index, v)) {
                program[index] = raw;
            }
        }
    }

    pub(crate) fn encode(&mut self, frame: &Frame<'_>, name: &str, value: &Value) -> Result<Vec<u8>, ActionError> {
        if let Self::MoesThermostatProgram(program) = self {
            let index = MOES_PROGRAM_ACTIONS
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;
            program[index] = program_byte(index, value).ok_or_else(|| ActionError::invalid(name, value))?;
            return Ok(frame.data_point(MOES_PROGRAM_DATA_POINT, DataPointValue::Raw(program.to_vec())));
        }

        if let Some(request) = self.attribute_request(frame, name, value) {
            return request;
        }

        let (data_point, dp_value) = self.data_point(name, value);
        let dp_value = dp_value.ok_or_else(|| ActionError::invalid(name, value))?;
        Ok(frame.data_point(data_point, dp_value))
    }

    /// Vendor attribute writes, `None` for data-point devices.
    fn attribute_request(
        &self,
        frame: &Frame<'_>,
        name: &str,
        value: &Value,
    ) -> Option<Result<Vec<u8>, ActionError>> {
        let invalid = || ActionError::invalid(name, value);
        let enum8 = |labels: &[&str]| {
            enum_index(value, labels)
                .map(|index| frame.write_own(zcl::DATA_TYPE_8BIT_ENUM, &[index as u8]))
                .ok_or_else(invalid)
        };

        Some(match self {
            Self::CoverSwitch => match name {
                "calibration" => to_bool(value)
                    .map(|start| frame.write(0xF001, zcl::DATA_TYPE_8BIT_ENUM, &[u8::from(!start)]))
                    .ok_or_else(invalid),
                _ => to_bool(value)
                    .map(|reverse| frame.write(0xF002, zcl::DATA_TYPE_8BIT_ENUM, &[u8::from(reverse)]))
                    .ok_or_else(invalid),
            },
            Self::ChildLock => to_bool(value)
                .map(|locked| frame.write_own(zcl::DATA_TYPE_BOOLEAN, &[u8::from(locked)]))
                .ok_or_else(invalid),
            Self::OperationMode => enum8(&SWITCH_OPERATION_MODES),
            Self::IndicatorMode => enum8(&SWITCH_INDICATOR_MODES),
            Self::SwitchType => enum8(&SWITCH_TYPES),
            Self::PowerOnStatus => enum8(&SWITCH_POWER_ON_STATUS),
            _ => return None,
        })
    }

    /// Data point and typed value for a data-point device request.
    fn data_point(&self, name: &str, value: &Value) -> (u8, Option<DataPointValue>) {
        match self {
            Self::LightDimmer => match name {
                "status" => (0x01, bool_dp(value)),
                "level" => (0x02, level_dp(value)),
                "levelMin" => (0x03, level_dp(value)),
                "lightType" => (0x04, enum_dp(value, &LIGHT_TYPES)),
                _ => (0x05, level_dp(value)),
            },

            Self::ElectricityMeter => (0x01, bool_dp(value)),

            Self::MoesElectricThermostat => match name {
                "status" => (0x01, bool_dp(value)),
                "operationMode" => (0x02, enum_dp(value, &MOES_ELECTRIC_MODES)),
                "heatingPoint" => (0x10, value_dp(value)),
                "temperatureLimitMax" => (0x13, value_dp(value)),
                "deadZoneTemperature" => (0x14, value_dp(value)),
                "temperatureLimitMin" => (0x1A, value_dp(value)),
                "temperatureCalibration" => (0x1B, value_dp(value)),
                "childLock" => (0x28, bool_dp(value)),
                _ => (0x2B, enum_dp(value, &MOES_SENSORS)),
            },

            Self::MoesRadiatorThermostat => match name {
                "operationMode" => (0x01, enum_dp(value, &MOES_RADIATOR_MODES)),
                "heatingPoint" => (0x02, value_dp(value)),
                "boost" => (0x04, bool_dp(value)),
                "windowDetection" => (0x08, bool_dp(value)),
                "childLock" => (0x0D, bool_dp(value)),
                "boostTimeout" => (0x67, value_dp(value)),
                "temperatureCalibration" => (0x69, value_dp(value)),
                "ecoMode" => (0x6A, bool_dp(value)),
                "ecoModeTemperature" => (0x6B, value_dp(value)),
                "temperatureLimitMax" => (0x6C, value_dp(value)),
                _ => (0x6D, value_dp(value)),
            },

            Self::NeoSiren => match name {
                "volume" => (0x05, enum_dp(value, &SIREN_VOLUMES)),
                "duration" => (0x07, value_dp(value)),
                "alarm" => (0x0D, bool_dp(value)),
                _ => (0x15, to_ranged(value, 0, 255).map(|v| DataPointValue::Enum(v as u8))),
            },

            Self::WaterValve => match name {
                "status" => (0x01, bool_dp(value)),
                "timeout" => (0x0B, value_dp(value)),
                _ => (0x0C, value_dp(value)),
            },

            Self::PresenceSensor => match name {
                "sensitivity" => (0x02, value_dp(value)),
                "distanceMin" => (0x03, scaled_dp(value, 100.0)),
                "distanceMax" => (0x04, scaled_dp(value, 100.0)),
                "detectionDelay" => (0x65, scaled_dp(value, 10.0)),
                _ => (0x66, scaled_dp(value, 10.0)),
            },

            Self::RadarSensor => match name {
                "radarSensitivity" => (0x02, value_dp(value)),
                "tumbleSwitch" => (0x69, bool_dp(value)),
                "tumbleAlarmTime" => (
                    0x6A,
                    to_ranged(value, 1, i64::from(u32::MAX)).map(|v| DataPointValue::Value((v - 1) as u32)),
                ),
                "radarScene" => (0x70, enum_dp(value, &RADAR_SCENES)),
                _ => (0x76, value_dp(value)),
            },

            Self::CoverMotor => match name {
                "cover" => (0x01, enum_dp(value, &COVER_COMMANDS)),
                "position" => (0x02, to_ranged(value, 0, 100).map(|v| DataPointValue::Value(v as u32))),
                "reverse" => (0x05, to_bool(value).map(|b| DataPointValue::Enum(u8::from(b)))),
                _ => (0x69, value_dp(value)),
            },

            _ => (0x00, None),
        }
    }
}

/// Dimmer levels are 0..=255 on the API and 0..=1000 on the wire.
fn level_dp(value: &Value) -> Option<DataPointValue> {
    let level = to_ranged(value, 0, 255)?;
    Some(DataPointValue::Value((level * 1000 / 255) as u32))
}

/// Wire byte of program field `index`: temperatures are sent in half
/// degrees, hours and minutes as-is.
fn program_byte(index: usize, value: &Value) -> Option<u8> {
    if (index + 1) % 3 == 0 {
        let raw = (to_f64(value)? * 2.0).round();
        (0.0..=255.0).contains(&raw).then_some(raw as u8)
    } else {
        to_i64(value).filter(|v| (0..=255).contains(v)).map(|v| v as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapoint::TUYA_REQUEST;
    use serde_json::json;

    fn object(key: &str) -> ActionObject {
        ActionObject::from_type(key).unwrap()
    }

    /// Data point, type and value bytes of a data-point request.
    fn dp(frame: &[u8]) -> (u8, u8, &[u8]) {
        assert_eq!(frame[2], TUYA_REQUEST);
        (frame[5], frame[6], &frame[9..])
    }

    #[test]
    fn test_light_dimmer_level_scaling() {
        let mut action = object("tuyaLightDimmer");
        let frame = action.request("level", &json!(255)).unwrap();
        assert_eq!(dp(&frame), (0x02, 0x02, &[0x00, 0x00, 0x03, 0xE8][..]));

        let frame = action.request("lightType", &json!("halogen")).unwrap();
        assert_eq!(dp(&frame), (0x04, 0x04, &[0x02][..]));
        assert_eq!(action.transaction_id(), 2);
    }

    #[test]
    fn test_moes_calibration_negative() {
        let mut action = object("tuyaMoesElectricThermostat");
        let frame = action.request("temperatureCalibration", &json!(-2)).unwrap();
        assert_eq!(dp(&frame), (0x1B, 0x02, &[0xFF, 0xFF, 0xFF, 0xFE][..]));
    }

    #[test]
    fn test_radiator_renamed() {
        let action = object("tuyaMoesRadiatorThermostat");
        assert_eq!(action.name(), "moesRadiatorThermostat");
        assert!(action.accepts("ecoModeTemperature"));
    }

    #[test]
    fn test_program_sends_whole_buffer() {
        let mut action = object("tuyaMoesThermostatProgram");
        let mut current = Map::new();
        current.insert("weekdayP1Hour".into(), json!(6));
        current.insert("weekdayP1Temperature".into(), json!(21.5));
        action.sync(&current);

        let frame = action.request("sundayP4Minute", &json!(30)).unwrap();
        let (data_point, data_type, data) = dp(&frame);
        assert_eq!(data_point, MOES_PROGRAM_DATA_POINT);
        assert_eq!(data_type, 0x00);
        assert_eq!(data.len(), MOES_PROGRAM_SIZE);
        assert_eq!(data[0], 6);
        assert_eq!(data[2], 43);
        assert_eq!(data[34], 30);

        assert!(action.request("sundayP4Temperature", &json!(200)).is_err());
    }

    #[test]
    fn test_radar_alarm_time_offset() {
        let mut action = object("tuyaRadarSensor");
        let frame = action.request("tumbleAlarmTime", &json!(3)).unwrap();
        assert_eq!(dp(&frame), (0x6A, 0x02, &[0x00, 0x00, 0x00, 0x02][..]));
        assert!(action.request("tumbleAlarmTime", &json!(0)).is_err());
    }

    #[test]
    fn test_presence_distance_scaled() {
        let mut action = object("tuyaPresenceSensor");
        let frame = action.request("distanceMax", &json!(4.5)).unwrap();
        assert_eq!(dp(&frame), (0x04, 0x02, &[0x00, 0x00, 0x01, 0xC2][..]));
    }

    #[test]
    fn test_vendor_attribute_actions() {
        let mut action = object("tuyaSwitchType");
        assert_eq!(action.cluster_id(), zcl::CLUSTER_TUYA_SWITCH_MODE);
        let frame = action.request("switchType", &json!("momentary")).unwrap();
        assert_eq!(frame, vec![0x00, 0x00, 0x02, 0x30, 0xD0, zcl::DATA_TYPE_8BIT_ENUM, 0x02]);

        let mut action = object("tuyaCoverSwitch");
        let frame = action.request("calibration", &json!(true)).unwrap();
        assert_eq!(&frame[3..], &[0x01, 0xF0, zcl::DATA_TYPE_8BIT_ENUM, 0x00]);
    }

    #[test]
    fn test_electricity_meter_status() {
        let mut action = object("tuyaElectricityMeter");
        let frame = action.request("status", &json!("on")).unwrap();
        assert_eq!(dp(&frame), (0x01, 0x01, &[0x01][..]));
    }
}
