// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Zigbee Cluster Library constants and the small frame builders the
//! action layer needs.
//!
//! All multi-byte fields are emitted little-endian, as on the air.

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

pub const PROFILE_HA: u16 = 0x0104;
pub const PROFILE_ZLL: u16 = 0xC05E;
pub const PROFILE_GP: u16 = 0xA1E0;

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

pub const CLUSTER_BASIC: u16 = 0x0000;
pub const CLUSTER_POWER_CONFIGURATION: u16 = 0x0001;
pub const CLUSTER_GROUPS: u16 = 0x0004;
pub const CLUSTER_SCENES: u16 = 0x0005;
pub const CLUSTER_ON_OFF: u16 = 0x0006;
pub const CLUSTER_LEVEL_CONTROL: u16 = 0x0008;
pub const CLUSTER_TIME: u16 = 0x000A;
pub const CLUSTER_ANALOG_INPUT: u16 = 0x000C;
pub const CLUSTER_ANALOG_OUTPUT: u16 = 0x000D;
pub const CLUSTER_BINARY_OUTPUT: u16 = 0x0010;
pub const CLUSTER_OTA_UPGRADE: u16 = 0x0019;
pub const CLUSTER_POWER_PROFILE: u16 = 0x001A;
pub const CLUSTER_POLL_CONTROL: u16 = 0x0020;
pub const CLUSTER_GREEN_POWER: u16 = 0x0021;
pub const CLUSTER_WINDOW_COVERING: u16 = 0x0102;
pub const CLUSTER_COLOR_CONTROL: u16 = 0x0300;
pub const CLUSTER_ILLUMINANCE_MEASUREMENT: u16 = 0x0400;
pub const CLUSTER_TEMPERATURE_MEASUREMENT: u16 = 0x0402;
pub const CLUSTER_PRESSURE_MEASUREMENT: u16 = 0x0403;
pub const CLUSTER_RELATIVE_HUMIDITY: u16 = 0x0405;
pub const CLUSTER_OCCUPANCY_SENSING: u16 = 0x0406;
pub const CLUSTER_SOIL_MOISTURE: u16 = 0x0408;
pub const CLUSTER_CO2_CONCENTRATION: u16 = 0x040D;
pub const CLUSTER_IAS_ZONE: u16 = 0x0500;
pub const CLUSTER_SMART_ENERGY_METERING: u16 = 0x0702;
pub const CLUSTER_ELECTRICAL_MEASUREMENT: u16 = 0x0B04;
pub const CLUSTER_TOUCHLINK: u16 = 0x1000;
pub const CLUSTER_TUYA_SWITCH_MODE: u16 = 0xE001;
pub const CLUSTER_TUYA_DATA: u16 = 0xEF00;
pub const CLUSTER_PERENIO: u16 = 0xFC7B;
pub const CLUSTER_LUMI: u16 = 0xFCC0;

// ---------------------------------------------------------------------------
// Manufacturer codes
// ---------------------------------------------------------------------------

pub const MANUFACTURER_CODE_LUMI: u16 = 0x115F;

// ---------------------------------------------------------------------------
// Frame control & global commands
// ---------------------------------------------------------------------------

pub const FC_CLUSTER_SPECIFIC: u8 = 0x01;
pub const FC_MANUFACTURER_SPECIFIC: u8 = 0x04;
pub const FC_SERVER_TO_CLIENT: u8 = 0x08;
pub const FC_DISABLE_DEFAULT_RESPONSE: u8 = 0x10;

pub const CMD_READ_ATTRIBUTES: u8 = 0x00;
pub const CMD_WRITE_ATTRIBUTES: u8 = 0x02;

// ---------------------------------------------------------------------------
// Attribute data types
// ---------------------------------------------------------------------------

pub const DATA_TYPE_BOOLEAN: u8 = 0x10;
pub const DATA_TYPE_8BIT_UNSIGNED: u8 = 0x20;
pub const DATA_TYPE_16BIT_UNSIGNED: u8 = 0x21;
pub const DATA_TYPE_32BIT_UNSIGNED: u8 = 0x23;
pub const DATA_TYPE_16BIT_SIGNED: u8 = 0x29;
pub const DATA_TYPE_8BIT_ENUM: u8 = 0x30;
pub const DATA_TYPE_SINGLE_PRECISION: u8 = 0x39;

/// Wire width of a fixed-size attribute data type, `None` for unknown types.
pub fn data_type_width(data_type: u8) -> Option<usize> {
    match data_type {
        DATA_TYPE_BOOLEAN | DATA_TYPE_8BIT_UNSIGNED | DATA_TYPE_8BIT_ENUM => Some(1),
        DATA_TYPE_16BIT_UNSIGNED | DATA_TYPE_16BIT_SIGNED => Some(2),
        DATA_TYPE_32BIT_UNSIGNED | DATA_TYPE_SINGLE_PRECISION => Some(4),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build a ZCL header.
///
/// A nonzero `manufacturer_code` sets the manufacturer-specific bit and
/// inserts the code (little-endian) before the transaction id.
pub fn zcl_header(frame_control: u8, transaction_id: u8, command_id: u8, manufacturer_code: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    if manufacturer_code != 0 {
        buf.push(frame_control | FC_MANUFACTURER_SPECIFIC);
        buf.extend_from_slice(&manufacturer_code.to_le_bytes());
    } else {
        buf.push(frame_control);
    }
    buf.push(transaction_id);
    buf.push(command_id);
    buf
}

/// Cluster-specific command frame: header followed by the raw payload.
pub fn cluster_command(transaction_id: u8, command_id: u8, manufacturer_code: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = zcl_header(FC_CLUSTER_SPECIFIC, transaction_id, command_id, manufacturer_code);
    buf.extend_from_slice(payload);
    buf
}

/// Global "write attributes" frame for a single attribute.
///
/// `data` must already be in wire (little-endian) order.
pub fn write_attribute(
    transaction_id: u8,
    manufacturer_code: u16,
    attribute_id: u16,
    data_type: u8,
    data: &[u8],
) -> Vec<u8> {
    let mut buf = zcl_header(0x00, transaction_id, CMD_WRITE_ATTRIBUTES, manufacturer_code);
    buf.extend_from_slice(&attribute_id.to_le_bytes());
    buf.push(data_type);
    buf.extend_from_slice(data);
    buf
}

/// Fixed-size header fields parsed back out of a frame (used by tests and
/// the CLI pretty-printer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZclHeader {
    pub frame_control: u8,
    pub manufacturer_code: u16,
    pub transaction_id: u8,
    pub command_id: u8,
    /// Offset of the first payload byte.
    pub payload_offset: usize,
}

impl ZclHeader {
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let frame_control = *buf.first()?;
        if frame_control & FC_MANUFACTURER_SPECIFIC != 0 {
            if buf.len() < 5 {
                return None;
            }
            Some(Self {
                frame_control,
                manufacturer_code: u16::from_le_bytes([buf[1], buf[2]]),
                transaction_id: buf[3],
                command_id: buf[4],
                payload_offset: 5,
            })
        } else {
            if buf.len() < 3 {
                return None;
            }
            Some(Self {
                frame_control,
                manufacturer_code: 0,
                transaction_id: buf[1],
                command_id: buf[2],
                payload_offset: 3,
            })
        }
    }

    pub fn is_cluster_specific(&self) -> bool {
        self.frame_control & FC_CLUSTER_SPECIFIC != 0
    }
}
