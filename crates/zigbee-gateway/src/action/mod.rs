// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound action encoders.
//!
//! An [`ActionObject`] turns a `(name, value)` request into a ready-to-send
//! cluster frame. Each object owns an 8-bit transaction counter that is
//! stamped into the frame and advanced after every successful encode.
//!
//! Variant families:
//!
//! | Family | Module | Frames |
//! |--------|--------|--------|
//! | standard ZCL | [`standard`] | cluster commands, write attributes |
//! | PTVO firmware | [`ptvo`] | on/off, analog input present value |
//! | LUMI | [`lumi`] | manufacturer-specific write attributes |
//! | Tuya | [`tuya`] | data-point requests, vendor attributes |
//! | Efekta | [`efekta`] | custom attributes on standard clusters |
//! | other vendors | [`other`] | Perenio smart plug |
//!
//! No I/O happens here, the adapter takes the frame from there.

use serde_json::{Map, Value};

use crate::datapoint::{self, DataPointValue};
use crate::error::ActionError;
use crate::zcl;

pub mod efekta;
pub mod lumi;
pub mod other;
pub mod ptvo;
pub mod standard;
pub mod tuya;
pub mod value;

pub use efekta::EfektaAction;
pub use lumi::LumiAction;
pub use other::OtherAction;
pub use ptvo::PtvoAction;
pub use standard::StandardAction;
pub use tuya::TuyaAction;

/// Which encoder backs an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Standard(StandardAction),
    Ptvo(PtvoAction),
    Lumi(LumiAction),
    Tuya(TuyaAction),
    Efekta(EfektaAction),
    Other(OtherAction),
}

/// Names an action answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Accepts {
    /// Single-name action governing these attributes.
    Attributes(Vec<u16>),
    /// Multi-field action, one name per field.
    Actions(&'static [&'static str]),
}

/// Header fields an encoder stamps into its frame.
pub(crate) struct Frame<'a> {
    pub transaction_id: u8,
    pub manufacturer_code: u16,
    pub attributes: &'a [u16],
}

impl Frame<'_> {
    pub fn command(&self, command_id: u8, payload: &[u8]) -> Vec<u8> {
        zcl::cluster_command(self.transaction_id, command_id, self.manufacturer_code, payload)
    }

    pub fn write(&self, attribute_id: u16, data_type: u8, data: &[u8]) -> Vec<u8> {
        zcl::write_attribute(
            self.transaction_id,
            self.manufacturer_code,
            attribute_id,
            data_type,
            data,
        )
    }

    /// Write the action's own (first) attribute.
    pub fn write_own(&self, data_type: u8, data: &[u8]) -> Vec<u8> {
        self.write(self.attributes.first().copied().unwrap_or_default(), data_type, data)
    }

    pub fn data_point(&self, data_point: u8, value: DataPointValue) -> Vec<u8> {
        datapoint::make_request(self.transaction_id, data_point, &value)
    }
}

/// One controllable capability of a device endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionObject {
    name: String,
    cluster_id: u16,
    manufacturer_code: u16,
    transaction_id: u8,
    accepts: Accepts,
    kind: ActionKind,
}

impl ActionObject {
    pub(crate) fn with_attributes(
        name: impl Into<String>,
        cluster_id: u16,
        manufacturer_code: u16,
        attributes: Vec<u16>,
        kind: ActionKind,
    ) -> Self {
        Self {
            name: name.into(),
            cluster_id,
            manufacturer_code,
            transaction_id: 0,
            accepts: Accepts::Attributes(attributes),
            kind,
        }
    }

    pub(crate) fn with_actions(
        name: impl Into<String>,
        cluster_id: u16,
        manufacturer_code: u16,
        actions: &'static [&'static str],
        kind: ActionKind,
    ) -> Self {
        Self {
            name: name.into(),
            cluster_id,
            manufacturer_code,
            transaction_id: 0,
            accepts: Accepts::Actions(actions),
            kind,
        }
    }

    /// Build a catalogue entry from its type key, e.g. `"level"` or
    /// `"tuyaLightDimmer"`.
    pub fn from_type(key: &str) -> Option<Self> {
        if let Some(action) = StandardAction::from_type(key) {
            return Some(action.object());
        }
        if let Some(action) = PtvoAction::object_for(key) {
            return Some(action);
        }
        if let Some(action) = LumiAction::from_type(key) {
            return Some(action.object());
        }
        if let Some(action) = TuyaAction::from_type(key) {
            return Some(action.object());
        }
        if let Some(action) = EfektaAction::from_type(key) {
            return Some(action.object());
        }
        OtherAction::from_type(key).map(OtherAction::object)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cluster_id(&self) -> u16 {
        self.cluster_id
    }

    pub fn manufacturer_code(&self) -> u16 {
        self.manufacturer_code
    }

    /// Id the next request will carry.
    pub fn transaction_id(&self) -> u8 {
        self.transaction_id
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Governed attribute ids (empty for multi-field actions).
    pub fn attributes(&self) -> &[u16] {
        match &self.accepts {
            Accepts::Attributes(list) => list,
            Accepts::Actions(_) => &[],
        }
    }

    /// Accepted sub-action names (empty for single-name actions).
    pub fn actions(&self) -> &[&'static str] {
        match &self.accepts {
            Accepts::Attributes(_) => &[],
            Accepts::Actions(list) => list,
        }
    }

    pub fn accepts(&self, name: &str) -> bool {
        match &self.accepts {
            Accepts::Attributes(_) => self.name == name,
            Accepts::Actions(list) => list.contains(&name),
        }
    }

    /// Encode a request.
    ///
    /// The frame carries the current transaction id, which then advances
    /// (wrapping at 256). Failures leave the counter untouched.
    pub fn request(&mut self, name: &str, value: &Value) -> Result<Vec<u8>, ActionError> {
        if !self.accepts(name) {
            return Err(ActionError::UnknownAction(name.to_string()));
        }

        let frame = Frame {
            transaction_id: self.transaction_id,
            manufacturer_code: self.manufacturer_code,
            attributes: match &self.accepts {
                Accepts::Attributes(list) => list,
                Accepts::Actions(_) => &[],
            },
        };

        let buffer = match &mut self.kind {
            ActionKind::Standard(action) => action.encode(&frame, name, value),
            ActionKind::Ptvo(action) => action.encode(&frame, name, value),
            ActionKind::Lumi(action) => action.encode(&frame, name, value),
            ActionKind::Tuya(action) => action.encode(&frame, name, value),
            ActionKind::Efekta(action) => action.encode(&frame, name, value),
            ActionKind::Other(action) => action.encode(&frame, name, value),
        }?;

        self.transaction_id = self.transaction_id.wrapping_add(1);
        Ok(buffer)
    }

    /// Seed stateful encoders from the current property value (the Moes
    /// weekly program is always sent whole).
    pub fn sync(&mut self, current: &Map<String, Value>) {
        if let ActionKind::Tuya(action) = &mut self.kind {
            action.sync(current);
        }
    }
}

/// Encoded request ready for the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub cluster_id: u16,
    pub manufacturer_code: u16,
    pub transaction_id: u8,
    pub payload: Vec<u8>,
}

/// Actions bound to one endpoint, routed by name.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<ActionObject>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from type keys. Unknown keys are skipped with a warning.
    pub fn from_types<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut registry = Self::new();
        for key in keys {
            match ActionObject::from_type(key) {
                Some(action) => registry.register(action),
                None => tracing::warn!("Unknown action type {}", key),
            }
        }
        registry
    }

    pub fn register(&mut self, action: ActionObject) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionObject> {
        self.actions.iter()
    }

    /// First action accepting `name`.
    pub fn find(&self, name: &str) -> Option<&ActionObject> {
        self.actions.iter().find(|a| a.accepts(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ActionObject> {
        self.actions.iter_mut().find(|a| a.accepts(name))
    }

    pub fn request(&mut self, name: &str, value: &Value) -> Result<ActionRequest, ActionError> {
        let action = self
            .find_mut(name)
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;

        let transaction_id = action.transaction_id();
        let payload = action.request(name, value)?;

        Ok(ActionRequest {
            cluster_id: action.cluster_id(),
            manufacturer_code: action.manufacturer_code(),
            transaction_id,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_validation() {
        let mut action = ActionObject::from_type("status").unwrap();
        assert!(action.accepts("status"));
        assert!(!action.accepts("level"));
        assert_eq!(
            action.request("level", &json!(1)),
            Err(ActionError::UnknownAction("level".into()))
        );
        assert_eq!(action.transaction_id(), 0);
    }

    #[test]
    fn test_counter_advances_on_success_only() {
        let mut action = ActionObject::from_type("level").unwrap();
        let frame = action.request("level", &json!(128)).unwrap();
        assert_eq!(frame[1], 0);
        assert_eq!(action.transaction_id(), 1);

        assert!(action.request("level", &json!("loud")).is_err());
        assert_eq!(action.transaction_id(), 1);
    }

    #[test]
    fn test_registry_routes_by_name() {
        let mut registry = ActionRegistry::from_types(["status", "tuyaLightDimmer", "nope"]);
        assert_eq!(registry.len(), 2);

        let request = registry.request("levelMin", &json!(10)).unwrap();
        assert_eq!(request.cluster_id, zcl::CLUSTER_TUYA_DATA);
        assert_eq!(request.transaction_id, 0);

        let request = registry.request("status", &json!(true)).unwrap();
        assert_eq!(request.cluster_id, zcl::CLUSTER_ON_OFF);

        assert!(registry.request("unknown", &json!(1)).is_err());
    }

    #[test]
    fn test_attributes_and_actions_are_exclusive() {
        let color = ActionObject::from_type("colorHS").unwrap();
        assert_eq!(color.attributes(), &[0x0000, 0x0001]);
        assert!(color.actions().is_empty());

        let dimmer = ActionObject::from_type("tuyaLightDimmer").unwrap();
        assert!(dimmer.attributes().is_empty());
        assert!(dimmer.actions().contains(&"lightType"));
    }
}
