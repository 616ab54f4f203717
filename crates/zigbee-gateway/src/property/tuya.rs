// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hardcoded Tuya decoders for devices the option table cannot describe.

use serde_json::{Map, Value};

use super::{PropertyKind, PropertyObject};
use crate::action::tuya::{MOES_PROGRAM_ACTIONS, MOES_PROGRAM_DATA_POINT, MOES_PROGRAM_SIZE};
use crate::datapoint::DataPointValue;
use crate::zcl;

const WEEKDAY_PROGRAM_DATA_POINT: u8 = 0x70;
const HOLIDAY_PROGRAM_DATA_POINT: u8 = 0x71;
const SHORT_PROGRAM_SIZE: usize = 18;
const PROGRAM_FIELDS: [&str; 3] = ["Hour", "Minute", "Temperature"];

/// Meters reporting each quantity on its own data point.
const METERS_SPLIT_LAYOUT: [&str; 3] = ["_TZE200_byzdayie", "_TZE200_ewxhg6o9", "_TZE200_fsb6zw01"];
/// Meter packing voltage, current and power into data point 0x06.
const METER_PACKED_LAYOUT: &str = "_TZE200_lsanae15";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuyaProperty {
    ElectricityMeter,
    WeekdayThermostatProgram,
    HolidayThermostatProgram,
    MoesThermostatProgram,
    NeoSiren,
    PresenceSensor,
    RadarSensor,
    CoverMotor,
    CoverSwitch,
    ChildLock,
    OperationMode,
    IndicatorMode,
    SwitchType,
    PowerOnStatus,
    ButtonAction,
}

/// Fields produced by one data point.
#[derive(Debug, Default)]
pub(crate) struct Decoded {
    pub fields: Map<String, Value>,
    /// A full program arrived.
    pub received: bool,
}

impl Decoded {
    fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }
}

impl TuyaProperty {
    pub fn from_type(key: &str) -> Option<Self> {
        Some(match key {
            "tuyaElectricityMeter" => Self::ElectricityMeter,
            "tuyaWeekdayThermostatProgram" => Self::WeekdayThermostatProgram,
            "tuyaHolidayThermostatProgram" => Self::HolidayThermostatProgram,
            "tuyaMoesThermostatProgram" => Self::MoesThermostatProgram,
            "tuyaNeoSiren" => Self::NeoSiren,
            "tuyaPresenceSensor" => Self::PresenceSensor,
            "tuyaRadarSensor" => Self::RadarSensor,
            "tuyaCoverMotor" => Self::CoverMotor,
            "tuyaCoverSwitch" => Self::CoverSwitch,
            "tuyaChildLock" => Self::ChildLock,
            "tuyaOperationMode" => Self::OperationMode,
            "tuyaIndicatorMode" => Self::IndicatorMode,
            "tuyaSwitchType" => Self::SwitchType,
            "tuyaPowerOnStatus" => Self::PowerOnStatus,
            "tuyaButtonAction" => Self::ButtonAction,
            _ => return None,
        })
    }

    pub fn object(self) -> PropertyObject {
        let (name, cluster_id) = match self {
            Self::ElectricityMeter => ("electricityMeter", zcl::CLUSTER_TUYA_DATA),
            Self::WeekdayThermostatProgram => ("weekdayThermostatProgram", zcl::CLUSTER_TUYA_DATA),
            Self::HolidayThermostatProgram => ("holidayThermostatProgram", zcl::CLUSTER_TUYA_DATA),
            Self::MoesThermostatProgram => ("moesThermostatProgram", zcl::CLUSTER_TUYA_DATA),
            Self::NeoSiren => ("neoSiren", zcl::CLUSTER_TUYA_DATA),
            Self::PresenceSensor => ("presenceSensor", zcl::CLUSTER_TUYA_DATA),
            Self::RadarSensor => ("radarSensor", zcl::CLUSTER_TUYA_DATA),
            Self::CoverMotor => ("coverMotor", zcl::CLUSTER_TUYA_DATA),
            Self::CoverSwitch => ("coverSwitch", zcl::CLUSTER_WINDOW_COVERING),
            Self::ChildLock => ("childLock", zcl::CLUSTER_ON_OFF),
            Self::OperationMode => ("operationMode", zcl::CLUSTER_ON_OFF),
            Self::IndicatorMode => ("indicatorMode", zcl::CLUSTER_ON_OFF),
            Self::SwitchType => ("switchType", zcl::CLUSTER_TUYA_SWITCH_MODE),
            Self::PowerOnStatus => ("powerOnStatus", zcl::CLUSTER_ON_OFF),
            Self::ButtonAction => ("action", zcl::CLUSTER_ON_OFF),
        };
        PropertyObject::new(name, cluster_id, PropertyKind::Tuya(self))
    }

    /// Decoders fed through the 0xEF00 data-point cluster.
    pub fn is_data_point(self) -> bool {
        matches!(
            self,
            Self::ElectricityMeter
                | Self::WeekdayThermostatProgram
                | Self::HolidayThermostatProgram
                | Self::MoesThermostatProgram
                | Self::NeoSiren
                | Self::PresenceSensor
                | Self::RadarSensor
                | Self::CoverMotor
        )
    }

    pub(crate) fn update(self, object: &PropertyObject, data_point: u8, data: &DataPointValue) -> Decoded {
        let mut out = Decoded::default();

        match self {
            Self::ElectricityMeter => electricity_meter(object, data_point, data, &mut out),
            Self::WeekdayThermostatProgram if data_point == WEEKDAY_PROGRAM_DATA_POINT => {
                short_program("weekday", data.as_bytes(), &mut out)
            }
            Self::HolidayThermostatProgram if data_point == HOLIDAY_PROGRAM_DATA_POINT => {
                short_program("holiday", data.as_bytes(), &mut out)
            }
            Self::MoesThermostatProgram if data_point == MOES_PROGRAM_DATA_POINT => {
                moes_program(data.as_bytes(), &mut out)
            }
            Self::NeoSiren => neo_siren(data_point, data, &mut out),
            Self::PresenceSensor => presence_sensor(object, data_point, data, &mut out),
            Self::RadarSensor => radar_sensor(object, data_point, data, &mut out),
            Self::CoverMotor => cover_motor(object, data_point, data, &mut out),
            _ => {}
        }

        out
    }

    /// Single-attribute decoders: one expected attribute, a byte mapped to
    /// a label.
    pub(crate) fn attribute_value(self, attribute_id: u16, raw: u8) -> Option<Value> {
        let (expected, labels): (u16, &[&str]) = match self {
            Self::ChildLock => return (attribute_id == 0x8000).then_some(Value::Bool(raw != 0)),
            Self::OperationMode => (0x8004, &["command", "event"][..]),
            Self::IndicatorMode => (0x8001, &["off", "default", "inverted", "on"][..]),
            Self::SwitchType => (0xD030, &["toggle", "static", "momentary"][..]),
            Self::PowerOnStatus => (0x8002, &["off", "on", "previous"][..]),
            _ => return None,
        };

        if attribute_id != expected {
            return None;
        }
        labels.get(usize::from(raw)).map(|label| Value::from(*label))
    }
}

fn read_u16(data: &[u8], offset: usize) -> Option<f64> {
    let bytes = data.get(offset..offset + 2)?;
    Some(f64::from(u16::from_be_bytes([bytes[0], bytes[1]])))
}

fn on_off(data: &DataPointValue) -> &'static str {
    if data.as_bool() {
        "on"
    } else {
        "off"
    }
}

fn electricity_meter(object: &PropertyObject, data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    let manufacturer_name = object.manufacturer_name();

    if METERS_SPLIT_LAYOUT.contains(&manufacturer_name) {
        meter_split_layout(object, data_point, data, out);
    } else if manufacturer_name == METER_PACKED_LAYOUT {
        meter_packed_layout(object, data_point, data, out);
    } else {
        meter_default_layout(object, data_point, data, out);
    }
}

fn meter_split_layout(object: &PropertyObject, data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    let value = data.as_f64();

    match data_point {
        0x01 => out.insert("status", on_off(data)),
        0x11 => out.insert("energy", value / 100.0),
        0x12 => out.insert("current", value / 1000.0 + object.option_f64("currentOffset")),
        0x13 => out.insert("power", value / 10.0 + object.option_f64("powerOffset")),
        0x14 => out.insert("voltage", value / 10.0 + object.option_f64("voltageOffset")),
        _ => {}
    }
}

fn meter_packed_layout(object: &PropertyObject, data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    match data_point {
        0x01 => out.insert("energy", data.as_f64() / 100.0),
        0x06 => {
            let payload = data.as_bytes();
            let (Some(voltage), Some(current), Some(power)) =
                (read_u16(payload, 0), read_u16(payload, 3), read_u16(payload, 6))
            else {
                return;
            };
            out.insert("voltage", voltage / 10.0 + object.option_f64("voltageOffset"));
            out.insert("current", current / 1000.0 + object.option_f64("currentOffset"));
            out.insert("power", power + object.option_f64("powerOffset"));
        }
        0x10 => out.insert("status", on_off(data)),
        _ => {}
    }
}

fn meter_default_layout(object: &PropertyObject, data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    let value = data.as_f64();

    match data_point {
        // Relay-only meters report their switch state here.
        0x01 if matches!(data, DataPointValue::Bool(_)) => out.insert("status", on_off(data)),
        0x01 => out.insert("energy", value / 100.0),
        0x06 => {
            let payload = data.as_bytes();
            let (Some(current), Some(voltage)) = (read_u16(payload, 11), read_u16(payload, 13)) else {
                return;
            };
            out.insert("current", current / 1000.0 + object.option_f64("currentOffset"));
            out.insert("voltage", voltage / 10.0 + object.option_f64("voltageOffset"));
        }
        0x10 => out.insert("status", on_off(data)),
        0x67 => out.insert("power", value / 100.0 + object.option_f64("powerOffset")),
        0x69 => out.insert("frequency", value / 100.0),
        0x6F => out.insert("powerFactor", value / 10.0),
        _ => {}
    }
}

/// Six periods of (hour, minute, temperature).
fn short_program(prefix: &str, program: &[u8], out: &mut Decoded) {
    if program.len() < SHORT_PROGRAM_SIZE {
        return;
    }

    for (i, &raw) in program[..SHORT_PROGRAM_SIZE].iter().enumerate() {
        let name = format!("{}P{}{}", prefix, i / 3 + 1, PROGRAM_FIELDS[i % 3]);
        out.insert(&name, raw);
    }
    out.received = true;
}

/// Weekday, saturday and sunday programs. Temperatures travel doubled.
fn moes_program(program: &[u8], out: &mut Decoded) {
    if program.len() < MOES_PROGRAM_SIZE {
        return;
    }

    for (i, (&raw, name)) in program.iter().zip(MOES_PROGRAM_ACTIONS).enumerate() {
        if (i + 1) % 3 == 0 {
            out.insert(name, f64::from(raw) / 2.0);
        } else {
            out.insert(name, raw);
        }
    }
    out.received = true;
}

fn neo_siren(data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    match data_point {
        0x05 => {
            if let Some(volume) = ["low", "medium", "high"].get(data.as_int() as usize) {
                out.insert("volume", *volume);
            }
        }
        0x07 => out.insert("duration", data.as_int()),
        0x0D => out.insert("alarm", data.as_bool()),
        0x0F => out.insert("battery", data.as_int()),
        0x15 => out.insert("melody", data.as_int()),
        _ => {}
    }
}

fn presence_sensor(object: &PropertyObject, data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    let value = data.as_f64();

    match data_point {
        0x01 => out.insert("occupancy", data.as_bool()),
        0x02 => out.insert("sensitivity", data.as_int()),
        0x03 => out.insert("distanceMin", value / 100.0),
        0x04 => out.insert("distanceMax", value / 100.0),
        0x09 => out.insert("targetDistance", value / 100.0),
        0x65 => out.insert("detectionDelay", value / 10.0),
        0x66 => out.insert("fadingTime", data.as_int() / 10),
        0x68 => out.insert("illuminance", value + object.option_f64("illuminanceOffset")),
        _ => {}
    }
}

fn label_at(labels: &[&'static str], data: &DataPointValue) -> Option<&'static str> {
    usize::try_from(data.as_int()).ok().and_then(|i| labels.get(i).copied())
}

fn radar_sensor(object: &PropertyObject, data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    const SCENES: [&str; 7] = ["default", "area", "toilet", "bedroom", "parlour", "office", "hotel"];
    const DIRECTIONS: [&str; 3] = ["standingStill", "movingForward", "movingBackward"];
    const FALL_STATES: [&str; 3] = ["none", "maybe", "fall"];

    match data_point {
        0x01 => out.insert("occupancy", data.as_bool()),
        0x02 => out.insert("radarSensitivity", data.as_int()),
        0x66 => out.insert("motion", data.as_int() != 0x01),
        0x67 => out.insert("illuminance", data.as_f64() + object.option_f64("illuminanceOffset")),
        0x69 => out.insert("tumbleSwitch", data.as_bool()),
        0x6A => out.insert("tumbleAlarmTime", data.as_int() + 1),
        0x70 => {
            if let Some(scene) = label_at(&SCENES, data) {
                out.insert("radarScene", scene);
            }
        }
        0x72 => {
            if let Some(direction) = label_at(&DIRECTIONS, data) {
                out.insert("motionDirection", direction);
            }
        }
        0x73 => out.insert("motionSpeed", data.as_int()),
        0x74 => {
            if let Some(state) = label_at(&FALL_STATES, data) {
                out.insert("fallDown", state);
            }
        }
        0x75 => out.insert("staticDwellAlarm", data.as_int()),
        0x76 => out.insert("fallSensitivity", data.as_int()),
        _ => {}
    }
}

fn cover_motor(object: &PropertyObject, data_point: u8, data: &DataPointValue, out: &mut Decoded) {
    match data_point {
        0x02 | 0x03 => {
            let raw = data.as_int();
            let position = (if object.option_bool("invertCover") { 100 - raw } else { raw }) as u8;
            out.insert("cover", if position != 0 { "open" } else { "closed" });
            out.insert("position", position);
        }
        0x05 => out.insert("reverse", data.as_bool()),
        0x69 => out.insert("speed", data.as_int()),
        _ => {}
    }
}

pub(crate) fn cover_switch(attribute_id: u16, raw: u8, invert: bool, map: &mut Map<String, Value>) {
    match attribute_id {
        0xF000 => {
            let event = match (raw, invert) {
                (0, false) | (2, true) => "open",
                (1, _) => "stop",
                (2, false) | (0, true) => "close",
                _ => return,
            };
            map.insert("event".to_string(), Value::from(event));
        }
        0xF001 => {
            map.insert("calibration".to_string(), Value::Bool(raw == 0));
        }
        0xF002 => {
            map.insert("reverse".to_string(), Value::Bool(raw != 0));
        }
        _ => {}
    }
}

pub(crate) fn button_action(command_id: u8, payload: &[u8]) -> Option<&'static str> {
    let &raw = payload.first()?;

    match (command_id, raw) {
        (0xFC, 0x00) => Some("rotateRight"),
        (0xFC, 0x01) => Some("rotateLeft"),
        (0xFD, 0x00) => Some("singleClick"),
        (0xFD, 0x01) => Some("doubleClick"),
        (0xFD, 0x02) => Some("hold"),
        _ => None,
    }
}
