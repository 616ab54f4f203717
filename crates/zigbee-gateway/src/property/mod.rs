// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inbound property decoders.
//!
//! A [`PropertyObject`] holds the last decoded value of one device
//! capability. Cluster commands, attribute reports and Tuya data points are
//! fed into it and merged into that value.
//!
//! Data points are decoded in three tiers:
//!
//! 1. a hardcoded decoder picked by type key (and, for some, by the
//!    manufacturer name reported by the device),
//! 2. the generic [`datapoints`] table interpreter driven by options,
//! 3. the hardcoded decoder's default layout when no manufacturer matches.
//!
//! Malformed or unmapped input is ignored and leaves the value untouched.

use serde_json::{Map, Value};

use crate::datapoint::{self, DataPointValue};
use crate::zcl;

pub mod datapoints;
pub mod tuya;

pub use tuya::TuyaProperty;

/// Which decoder backs a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Generic table driven by the property options.
    DataPoints,
    Tuya(TuyaProperty),
}

/// One observable capability of a device endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyObject {
    name: String,
    cluster_id: u16,
    manufacturer_name: String,
    options: Map<String, Value>,
    value: Option<Value>,
    meta: Map<String, Value>,
    kind: PropertyKind,
}

impl PropertyObject {
    pub fn new(name: impl Into<String>, cluster_id: u16, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            cluster_id,
            manufacturer_name: String::new(),
            options: Map::new(),
            value: None,
            meta: Map::new(),
            kind,
        }
    }

    /// Build a catalogue entry from its type key, e.g. `"tuyaDataPoints"`
    /// or `"tuyaElectricityMeter"`.
    pub fn from_type(key: &str, manufacturer_name: &str) -> Option<Self> {
        let object = if key == "tuyaDataPoints" {
            Self::new("tuyaDataPoints", zcl::CLUSTER_TUYA_DATA, PropertyKind::DataPoints)
        } else {
            TuyaProperty::from_type(key)?.object()
        };
        Some(object.with_manufacturer_name(manufacturer_name))
    }

    pub fn with_manufacturer_name(mut self, manufacturer_name: impl Into<String>) -> Self {
        self.manufacturer_name = manufacturer_name.into();
        self
    }

    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cluster_id(&self) -> u16 {
        self.cluster_id
    }

    pub fn manufacturer_name(&self) -> &str {
        &self.manufacturer_name
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn set_options(&mut self, options: Map<String, Value>) {
        self.options = options;
    }

    /// Current decoded value, `None` until something was decoded.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Numeric option, 0 when missing (offsets default to none).
    pub(crate) fn option_f64(&self, name: &str) -> f64 {
        self.options.get(name).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub(crate) fn option_bool(&self, name: &str) -> bool {
        self.options.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Decode a cluster-specific command.
    pub fn parse_command(&mut self, command_id: u8, payload: &[u8]) {
        match self.kind {
            PropertyKind::Tuya(TuyaProperty::ButtonAction) => {
                if let Some(action) = tuya::button_action(command_id, payload) {
                    self.value = Some(Value::from(action));
                }
            }
            PropertyKind::Tuya(property) if !property.is_data_point() => {}
            _ => {
                let Some((header, value)) = datapoint::parse_command(command_id, payload) else {
                    return;
                };
                self.update(header.data_point, &value);
            }
        }
    }

    /// Decode one attribute from a report or read response.
    pub fn parse_attribute(&mut self, attribute_id: u16, data: &[u8]) {
        let PropertyKind::Tuya(property) = self.kind else {
            return;
        };
        let Some(&raw) = data.first() else {
            return;
        };

        if property == TuyaProperty::CoverSwitch {
            let invert = self.option_bool("invertCover");
            self.merge(|map| tuya::cover_switch(attribute_id, raw, invert, map));
            return;
        }

        if let Some(value) = property.attribute_value(attribute_id, raw) {
            self.value = Some(value);
        }
    }

    /// Apply a decoded data point.
    pub fn update(&mut self, data_point: u8, data: &DataPointValue) {
        match self.kind {
            PropertyKind::DataPoints => {
                let fields = datapoints::fields(&self.options, data_point);
                let options = &self.options;
                let mut map = take_map(&mut self.value);
                datapoints::apply(&fields, data, options, &mut map);
                self.value = finish_map(map);
            }
            PropertyKind::Tuya(property) => {
                let decoded = property.update(self, data_point, data);
                if decoded.received {
                    self.meta.insert("received".to_string(), Value::Bool(true));
                }
                let mut map = take_map(&mut self.value);
                map.extend(decoded.fields);
                self.value = finish_map(map);
            }
        }
    }

    fn merge<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut map = take_map(&mut self.value);
        f(&mut map);
        self.value = finish_map(map);
    }
}

fn take_map(value: &mut Option<Value>) -> Map<String, Value> {
    match value.take() {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// An empty merge result means "no value", not an empty object.
fn finish_map(map: Map<String, Value>) -> Option<Value> {
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(data_point: u8, data_type: u8, data: &[u8]) -> Vec<u8> {
        let mut payload = vec![0x00, 0x01, data_point, data_type];
        payload.extend_from_slice(&(data.len() as u16).to_be_bytes());
        payload.extend_from_slice(data);
        payload
    }

    #[test]
    fn test_from_type_sets_identity() {
        let property = PropertyObject::from_type("tuyaElectricityMeter", "_TZE200_lsanae15").unwrap();
        assert_eq!(property.name(), "electricityMeter");
        assert_eq!(property.cluster_id(), zcl::CLUSTER_TUYA_DATA);
        assert_eq!(property.manufacturer_name(), "_TZE200_lsanae15");
        assert!(property.value().is_none());

        assert!(PropertyObject::from_type("tuyaUnknown", "").is_none());
    }

    #[test]
    fn test_parse_command_ignores_request_command() {
        let mut property = PropertyObject::from_type("tuyaNeoSiren", "").unwrap();
        property.parse_command(datapoint::TUYA_REQUEST, &report(0x0F, 0x02, &[0, 0, 0, 80]));
        assert!(property.value().is_none());

        property.parse_command(datapoint::TUYA_REPORT, &report(0x0F, 0x02, &[0, 0, 0, 80]));
        assert_eq!(property.value(), Some(&json!({"battery": 80})));
    }

    #[test]
    fn test_partial_updates_accumulate() {
        let mut property = PropertyObject::from_type("tuyaNeoSiren", "").unwrap();
        property.update(0x0D, &DataPointValue::Bool(true));
        property.update(0x05, &DataPointValue::Enum(2));
        assert_eq!(property.value(), Some(&json!({"alarm": true, "volume": "high"})));
    }

    #[test]
    fn test_unmapped_data_point_keeps_absent() {
        let mut property = PropertyObject::from_type("tuyaNeoSiren", "").unwrap();
        property.update(0x42, &DataPointValue::Value(1));
        assert!(property.value().is_none());
    }

    #[test]
    fn test_attribute_decoder_ignores_other_ids() {
        let mut property = PropertyObject::from_type("tuyaChildLock", "").unwrap();
        property.parse_attribute(0x8001, &[0x01]);
        assert!(property.value().is_none());

        property.parse_attribute(0x8000, &[0x01]);
        assert_eq!(property.value(), Some(&json!(true)));

        property.parse_attribute(0x8000, &[]);
        assert_eq!(property.value(), Some(&json!(true)));
    }

    #[test]
    fn test_button_action_commands() {
        let mut property = PropertyObject::from_type("tuyaButtonAction", "").unwrap();
        property.parse_command(0xFD, &[0x01]);
        assert_eq!(property.value(), Some(&json!("doubleClick")));

        property.parse_command(0xFC, &[0x00]);
        assert_eq!(property.value(), Some(&json!("rotateRight")));

        property.parse_command(0xFC, &[0x07]);
        assert_eq!(property.value(), Some(&json!("rotateRight")));
    }
}
