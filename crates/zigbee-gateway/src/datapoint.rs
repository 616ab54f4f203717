// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tuya data-point sub-protocol carried inside the 0xEF00 cluster.
//!
//! ```text
//! +----------+----+------+--------+-----------------+
//! | seq (BE) | dp | type | len BE | value (len)     |
//! |  2 bytes | 1  |  1   |   2    |                 |
//! +----------+----+------+--------+-----------------+
//! ```
//!
//! The same header is used for requests (command 0x00) and for the
//! response / report commands (0x01 / 0x02) decoded by the property layer.

use crate::zcl;

/// Data-point header size in bytes.
pub const HEADER_SIZE: usize = 6;

pub const TUYA_REQUEST: u8 = 0x00;
pub const TUYA_RESPONSE: u8 = 0x01;
pub const TUYA_REPORT: u8 = 0x02;

const TYPE_RAW: u8 = 0x00;
const TYPE_BOOL: u8 = 0x01;
const TYPE_VALUE: u8 = 0x02;
const TYPE_ENUM: u8 = 0x04;

/// Wire type of a data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    Raw = TYPE_RAW,
    Bool = TYPE_BOOL,
    Value = TYPE_VALUE,
    Enum = TYPE_ENUM,
}

impl DataType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            TYPE_RAW => Some(Self::Raw),
            TYPE_BOOL => Some(Self::Bool),
            TYPE_VALUE => Some(Self::Value),
            TYPE_ENUM => Some(Self::Enum),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Canonical payload width, `None` for variable-length RAW.
    pub fn width(self) -> Option<usize> {
        match self {
            Self::Raw => None,
            Self::Bool | Self::Enum => Some(1),
            Self::Value => Some(4),
        }
    }
}

/// Fixed data-point header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPointHeader {
    pub sequence: u16,
    pub data_point: u8,
    /// Raw type byte, unknown types are kept so the caller can skip them.
    pub data_type: u8,
    pub length: u16,
}

impl DataPointHeader {
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            sequence: u16::from_be_bytes([buf[0], buf[1]]),
            data_point: buf[2],
            data_type: buf[3],
            length: u16::from_be_bytes([buf[4], buf[5]]),
        })
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.sequence.to_be_bytes());
        buf.push(self.data_point);
        buf.push(self.data_type);
        buf.extend_from_slice(&self.length.to_be_bytes());
    }
}

/// A decoded data-point value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataPointValue {
    Raw(Vec<u8>),
    Bool(bool),
    /// Big-endian unsigned 32-bit on the wire.
    Value(u32),
    Enum(u8),
}

impl DataPointValue {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Raw(_) => DataType::Raw,
            Self::Bool(_) => DataType::Bool,
            Self::Value(_) => DataType::Value,
            Self::Enum(_) => DataType::Enum,
        }
    }

    /// Wire encoding of the value (without header).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Raw(data) => data.clone(),
            Self::Bool(b) => vec![u8::from(*b)],
            Self::Value(v) => v.to_be_bytes().to_vec(),
            Self::Enum(e) => vec![*e],
        }
    }

    /// Truthiness: nonzero numbers and non-empty raw payloads are true.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Raw(data) => data.iter().any(|&b| b != 0),
            Self::Bool(b) => *b,
            Self::Value(v) => *v != 0,
            Self::Enum(e) => *e != 0,
        }
    }

    /// Integer view. 32-bit values are reinterpreted as signed, which is how
    /// devices report negative calibrations and temperatures.
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Raw(_) => 0,
            Self::Bool(b) => i64::from(*b),
            Self::Value(v) => i64::from(*v as i32),
            Self::Enum(e) => i64::from(*e),
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.as_int() as f64
    }

    /// Raw payload bytes, empty for scalar types.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Raw(data) => data,
            _ => &[],
        }
    }
}

/// Decode the value that follows a header.
///
/// Returns `None` when the declared length does not match the canonical
/// width of the type, when fewer than `length` bytes are present, or when
/// the type is unknown. Callers skip the update in that case.
pub fn parse_data(header: &DataPointHeader, data: &[u8]) -> Option<DataPointValue> {
    let length = header.length as usize;
    if data.len() < length {
        return None;
    }
    let data = &data[..length];

    let data_type = DataType::from_u8(header.data_type)?;
    if let Some(width) = data_type.width() {
        if width != length {
            return None;
        }
    }

    Some(match data_type {
        DataType::Raw => DataPointValue::Raw(data.to_vec()),
        DataType::Bool => DataPointValue::Bool(data[0] != 0),
        DataType::Value => DataPointValue::Value(u32::from_be_bytes([data[0], data[1], data[2], data[3]])),
        DataType::Enum => DataPointValue::Enum(data[0]),
    })
}

/// Parse a data-point cluster command payload.
///
/// Only response (0x01) and report (0x02) commands carry data points,
/// everything else yields `None`.
pub fn parse_command(command_id: u8, payload: &[u8]) -> Option<(DataPointHeader, DataPointValue)> {
    if command_id != TUYA_RESPONSE && command_id != TUYA_REPORT {
        return None;
    }
    let header = DataPointHeader::parse(payload)?;
    let value = parse_data(&header, &payload[HEADER_SIZE..])?;
    Some((header, value))
}

/// Build a complete request frame (ZCL header + data-point header + value).
///
/// The transaction id is used both for the ZCL header and as the data-point
/// sequence number so a response can be matched against either.
pub fn make_request(transaction_id: u8, data_point: u8, value: &DataPointValue) -> Vec<u8> {
    let data = value.to_bytes();
    let header = DataPointHeader {
        sequence: u16::from(transaction_id),
        data_point,
        data_type: value.data_type().as_u8(),
        length: data.len() as u16,
    };

    let mut buf = zcl::zcl_header(zcl::FC_CLUSTER_SPECIFIC, transaction_id, TUYA_REQUEST, 0);
    header.write_to(&mut buf);
    buf.extend_from_slice(&data);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(data_type: u8, length: u16) -> DataPointHeader {
        DataPointHeader {
            sequence: 0,
            data_point: 1,
            data_type,
            length,
        }
    }

    #[test]
    fn test_value_is_big_endian() {
        let value = parse_data(&header(TYPE_VALUE, 4), &[0x00, 0x00, 0x30, 0x39]);
        assert_eq!(value, Some(DataPointValue::Value(12345)));
    }

    #[test]
    fn test_length_mismatch_yields_none() {
        assert_eq!(parse_data(&header(TYPE_VALUE, 2), &[0x30, 0x39]), None);
        assert_eq!(parse_data(&header(TYPE_BOOL, 2), &[0x01, 0x00]), None);
        assert_eq!(parse_data(&header(TYPE_ENUM, 0), &[]), None);
    }

    #[test]
    fn test_truncated_payload_yields_none() {
        assert_eq!(parse_data(&header(TYPE_RAW, 8), &[1, 2, 3]), None);
    }

    #[test]
    fn test_unknown_type_yields_none() {
        assert_eq!(parse_data(&header(0x03, 1), &[0x41]), None);
    }

    #[test]
    fn test_raw_slices_declared_length() {
        let value = parse_data(&header(TYPE_RAW, 2), &[9, 8, 7]);
        assert_eq!(value, Some(DataPointValue::Raw(vec![9, 8])));
    }

    #[test]
    fn test_only_response_and_report_commands() {
        let payload = [0x00, 0x05, 0x01, TYPE_BOOL, 0x00, 0x01, 0x01];
        assert!(parse_command(TUYA_REQUEST, &payload).is_none());
        assert!(parse_command(0x24, &payload).is_none());

        let (hdr, value) = parse_command(TUYA_REPORT, &payload).unwrap();
        assert_eq!(hdr.sequence, 5);
        assert_eq!(value, DataPointValue::Bool(true));
    }

    #[test]
    fn test_make_request_layout() {
        let frame = make_request(0x12, 0x02, &DataPointValue::Value(0x01020304));
        assert_eq!(
            frame,
            vec![0x01, 0x12, 0x00, 0x00, 0x12, 0x02, TYPE_VALUE, 0x00, 0x04, 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn test_signed_view_of_value() {
        assert_eq!(DataPointValue::Value(0xFFFF_FFFE).as_int(), -2);
    }
}
