// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Action catalogue: frame identity, transaction counter wrap and name
// validation across every action family.

use serde_json::{json, Value};
use zigbee_gateway::action::ActionObject;
use zigbee_gateway::datapoint::{DataPointHeader, HEADER_SIZE, TUYA_REQUEST};
use zigbee_gateway::zcl::{self, ZclHeader};
use zigbee_gateway::ActionError;

const CATALOGUE: &[&str] = &[
    "status",
    "powerOnStatus",
    "level",
    "coverStatus",
    "coverPosition",
    "coverTilt",
    "colorHS",
    "colorXY",
    "colorTemperature",
    "ptvoChangePattern",
    "ptvoCount",
    "ptvoPattern",
    "lumiPresenceSensor",
    "lumiButtonMode",
    "lumiOperationMode",
    "lumiIndicatorMode",
    "lumiSwitchMode",
    "lumiStatusMemory",
    "lumiInterlock",
    "lumiCoverPosition",
    "tuyaLightDimmer",
    "tuyaElectricityMeter",
    "tuyaMoesElectricThermostat",
    "tuyaMoesRadiatorThermostat",
    "tuyaMoesThermostatProgram",
    "tuyaNeoSiren",
    "tuyaWaterValve",
    "tuyaPresenceSensor",
    "tuyaRadarSensor",
    "tuyaCoverMotor",
    "tuyaCoverSwitch",
    "tuyaChildLock",
    "tuyaOperationMode",
    "tuyaIndicatorMode",
    "tuyaSwitchType",
    "tuyaPowerOnStatus",
    "efektaReportingDelay",
    "efektaTemperatureSettings",
    "efektaHumiditySettings",
    "efektaCO2Sensor",
    "efektaVOCSensor",
    "perenioSmartPlug",
];

fn action(key: &str) -> ActionObject {
    ActionObject::from_type(key).unwrap_or_else(|| panic!("missing catalogue entry {key}"))
}

/// Attribute id and manufacturer code of a write-attributes frame.
fn written_attribute(frame: &[u8]) -> (u16, u16) {
    let header = ZclHeader::parse(frame).unwrap();
    assert_eq!(header.command_id, zcl::CMD_WRITE_ATTRIBUTES);
    let offset = header.payload_offset;
    (
        u16::from_le_bytes([frame[offset], frame[offset + 1]]),
        header.manufacturer_code,
    )
}

#[test]
fn test_catalogue_is_complete() {
    for key in CATALOGUE {
        assert!(ActionObject::from_type(key).is_some(), "{key}");
    }
    assert!(ActionObject::from_type("tuyaUnknown").is_none());
}

#[test]
fn test_unknown_name_leaves_counter_for_every_action() {
    for key in CATALOGUE {
        let mut action = action(key);
        let result = action.request("definitelyNotAnAction", &json!(1));
        assert_eq!(
            result,
            Err(ActionError::UnknownAction("definitelyNotAnAction".into())),
            "{key}"
        );
        assert_eq!(action.transaction_id(), 0, "{key}");
    }
}

#[test]
fn test_counter_wraps_after_256_requests() {
    let mut action = action("level");

    for expected in 0..=255u8 {
        let frame = action.request("level", &json!(100)).unwrap();
        assert_eq!(ZclHeader::parse(&frame).unwrap().transaction_id, expected);
    }

    assert_eq!(action.transaction_id(), 0);
    let frame = action.request("level", &json!(100)).unwrap();
    assert_eq!(frame[1], 0);
    assert_eq!(action.transaction_id(), 1);
}

#[test]
fn test_write_frames_match_declared_identity() {
    let cases: &[(&str, &str, Value)] = &[
        ("powerOnStatus", "powerOnStatus", json!("on")),
        ("lumiOperationMode", "operationMode", json!("relay")),
        ("lumiStatusMemory", "statusMemory", json!(true)),
        ("efektaReportingDelay", "reportingDelay", json!(60)),
        ("ptvoCount", "count", json!(2)),
    ];

    for (key, name, value) in cases {
        let mut action = action(key);
        let frame = action.request(name, value).unwrap();
        let (attribute_id, manufacturer_code) = written_attribute(&frame);

        assert_eq!(attribute_id, action.attributes()[0], "{key}");
        assert_eq!(manufacturer_code, action.manufacturer_code(), "{key}");
        assert_eq!(action.transaction_id(), 1, "{key}");
    }
}

#[test]
fn test_cluster_commands_carry_counter() {
    let mut status = action("status");
    assert_eq!(status.request("status", &json!("toggle")).unwrap(), vec![0x01, 0x00, 0x02]);
    assert_eq!(status.request("status", &json!(false)).unwrap(), vec![0x01, 0x01, 0x00]);
    assert!(status.request("status", &json!("maybe")).is_err());
    assert_eq!(status.transaction_id(), 2);
}

#[test]
fn test_tuya_request_layout() {
    let mut dimmer = action("tuyaLightDimmer");
    let frame = dimmer.request("levelMin", &json!(10)).unwrap();

    let header = ZclHeader::parse(&frame).unwrap();
    assert_eq!(header.command_id, TUYA_REQUEST);
    assert!(header.is_cluster_specific());

    let payload = &frame[header.payload_offset..];
    let dp = DataPointHeader::parse(payload).unwrap();
    assert_eq!(dp.sequence, u16::from(header.transaction_id));
    assert_eq!(usize::from(dp.length), payload.len() - HEADER_SIZE);
}

#[test]
fn test_invalid_values_are_rejected() {
    let cases: &[(&str, &str, Value)] = &[
        ("level", "level", json!(300)),
        ("coverPosition", "position", json!(101)),
        ("lumiSwitchMode", "switchMode", json!("slow")),
        ("efektaCO2Sensor", "indicatorLevel", json!(-1)),
        ("perenioSmartPlug", "powerOnStatus", json!("sometimes")),
    ];

    for (key, name, value) in cases {
        let mut action = action(key);
        assert!(
            matches!(action.request(name, value), Err(ActionError::InvalidValue { .. })),
            "{key}"
        );
        assert_eq!(action.transaction_id(), 0, "{key}");
    }
}
