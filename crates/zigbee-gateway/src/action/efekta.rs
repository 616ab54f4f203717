// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Efekta DIY sensors: custom attributes on standard measurement clusters.

use serde_json::Value;

use super::value::{to_bool, to_ranged};
use super::{ActionKind, ActionObject, Frame};
use crate::error::ActionError;
use crate::zcl;

const TEMPERATURE_ACTIONS: &[&str] = &[
    "temperatureOffset",
    "temperatureHigh",
    "temperatureLow",
    "temperatureRelay",
    "temperatureRelayInvert",
];

const HUMIDITY_ACTIONS: &[&str] = &[
    "humidityOffset",
    "humidityHigh",
    "humidityLow",
    "humidityRelay",
    "humidityRelayInvert",
];

const CO2_ACTIONS: &[&str] = &[
    "altitude",
    "manualCalibration",
    "co2High",
    "co2Low",
    "indicatorLevel",
    "forceCalibration",
    "autoBrightness",
    "co2LongChart",
    "co2FactoryReset",
    "indicator",
    "co2Relay",
    "co2RelayInvert",
    "pressureLongChart",
    "nightBacklight",
];

const VOC_ACTIONS: &[&str] = &["vovHigh", "vovLow", "vovRelay", "vovRelayInvert"];

/// Wire shape of one Efekta setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    Bool(u16),
    U8(u16),
    U16(u16),
    I16(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EfektaAction {
    ReportingDelay,
    TemperatureSettings,
    HumiditySettings,
    Co2Sensor,
    VocSensor,
}

impl EfektaAction {
    pub fn from_type(key: &str) -> Option<Self> {
        Some(match key {
            "efektaReportingDelay" => Self::ReportingDelay,
            "efektaTemperatureSettings" => Self::TemperatureSettings,
            "efektaHumiditySettings" => Self::HumiditySettings,
            "efektaCO2Sensor" => Self::Co2Sensor,
            "efektaVOCSensor" => Self::VocSensor,
            _ => return None,
        })
    }

    pub fn object(self) -> ActionObject {
        let kind = ActionKind::Efekta(self);
        match self {
            Self::ReportingDelay => ActionObject::with_attributes(
                "reportingDelay",
                zcl::CLUSTER_POWER_CONFIGURATION,
                0,
                vec![0x0201],
                kind,
            ),
            Self::TemperatureSettings => ActionObject::with_actions(
                "temperatureSettings",
                zcl::CLUSTER_TEMPERATURE_MEASUREMENT,
                0,
                TEMPERATURE_ACTIONS,
                kind,
            ),
            Self::HumiditySettings => ActionObject::with_actions(
                "humiditySettings",
                zcl::CLUSTER_RELATIVE_HUMIDITY,
                0,
                HUMIDITY_ACTIONS,
                kind,
            ),
            Self::Co2Sensor => {
                ActionObject::with_actions("co2Sensor", zcl::CLUSTER_CO2_CONCENTRATION, 0, CO2_ACTIONS, kind)
            }
            Self::VocSensor => {
                ActionObject::with_actions("vocSensor", zcl::CLUSTER_ANALOG_INPUT, 0, VOC_ACTIONS, kind)
            }
        }
    }

    fn setting(&self, name: &str) -> Setting {
        match self {
            Self::ReportingDelay => Setting::U16(0x0201),

            // Temperature and humidity share one attribute layout.
            Self::TemperatureSettings | Self::HumiditySettings => {
                let field = name
                    .strip_prefix("temperature")
                    .or_else(|| name.strip_prefix("humidity"))
                    .unwrap_or(name);
                match field {
                    "Offset" => Setting::I16(0x0210),
                    "High" => Setting::I16(0x0221),
                    "Low" => Setting::I16(0x0222),
                    "Relay" => Setting::Bool(0x0220),
                    _ => Setting::Bool(0x0225),
                }
            }

            Self::Co2Sensor => match name {
                "altitude" => Setting::U16(0x0205),
                "manualCalibration" => Setting::U16(0x0207),
                "co2High" => Setting::U16(0x0221),
                "co2Low" => Setting::U16(0x0222),
                "indicatorLevel" => Setting::U8(0x0209),
                "forceCalibration" => Setting::Bool(0x0202),
                "autoBrightness" => Setting::Bool(0x0203),
                "co2LongChart" => Setting::Bool(0x0204),
                "co2FactoryReset" => Setting::Bool(0x0206),
                "indicator" => Setting::Bool(0x0211),
                "co2Relay" => Setting::Bool(0x0220),
                "co2RelayInvert" => Setting::Bool(0x0225),
                "pressureLongChart" => Setting::Bool(0x0404),
                _ => Setting::Bool(0x0405),
            },

            Self::VocSensor => match name {
                "vovHigh" => Setting::U16(0x0221),
                "vovLow" => Setting::U16(0x0222),
                "vovRelay" => Setting::Bool(0x0220),
                _ => Setting::Bool(0x0225),
            },
        }
    }

    pub(crate) fn encode(&self, frame: &Frame<'_>, name: &str, value: &Value) -> Result<Vec<u8>, ActionError> {
        let invalid = || ActionError::invalid(name, value);

        let buffer = match self.setting(name) {
            Setting::Bool(attribute) => {
                let enabled = to_bool(value).ok_or_else(invalid)?;
                frame.write(attribute, zcl::DATA_TYPE_BOOLEAN, &[u8::from(enabled)])
            }
            Setting::U8(attribute) => {
                let raw = to_ranged(value, 0, 255).ok_or_else(invalid)? as u8;
                frame.write(attribute, zcl::DATA_TYPE_8BIT_UNSIGNED, &[raw])
            }
            Setting::U16(attribute) => {
                let raw = to_ranged(value, 0, i64::from(u16::MAX)).ok_or_else(invalid)? as u16;
                frame.write(attribute, zcl::DATA_TYPE_16BIT_UNSIGNED, &raw.to_le_bytes())
            }
            Setting::I16(attribute) => {
                let raw = to_ranged(value, i64::from(i16::MIN), i64::from(i16::MAX)).ok_or_else(invalid)? as i16;
                frame.write(attribute, zcl::DATA_TYPE_16BIT_SIGNED, &raw.to_le_bytes())
            }
        };

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reporting_delay_u16() {
        let mut action = ActionObject::from_type("efektaReportingDelay").unwrap();
        let frame = action.request("reportingDelay", &json!(300)).unwrap();
        assert_eq!(frame, vec![0x00, 0x00, 0x02, 0x01, 0x02, zcl::DATA_TYPE_16BIT_UNSIGNED, 0x2C, 0x01]);
    }

    #[test]
    fn test_humidity_shares_temperature_layout() {
        let mut action = ActionObject::from_type("efektaHumiditySettings").unwrap();
        let frame = action.request("humidityOffset", &json!(-5)).unwrap();
        assert_eq!(&frame[3..], &[0x10, 0x02, zcl::DATA_TYPE_16BIT_SIGNED, 0xFB, 0xFF]);

        let frame = action.request("humidityRelayInvert", &json!(true)).unwrap();
        assert_eq!(&frame[3..], &[0x25, 0x02, zcl::DATA_TYPE_BOOLEAN, 0x01]);

        assert!(action.request("temperatureOffset", &json!(1)).is_err());
    }

    #[test]
    fn test_co2_settings() {
        let mut action = ActionObject::from_type("efektaCO2Sensor").unwrap();
        let frame = action.request("indicatorLevel", &json!(7)).unwrap();
        assert_eq!(&frame[3..], &[0x09, 0x02, zcl::DATA_TYPE_8BIT_UNSIGNED, 0x07]);

        let frame = action.request("nightBacklight", &json!("on")).unwrap();
        assert_eq!(&frame[3..], &[0x05, 0x04, zcl::DATA_TYPE_BOOLEAN, 0x01]);
    }
}
