// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ZDO management request payloads.
//!
//! Every payload starts with the 1-byte sequence id. IEEE addresses are
//! held in display (big-endian) order and reversed on the wire, 16-bit
//! fields go out little-endian.

use std::fmt;

use crate::error::AdapterError;

pub const ZDO_BIND_REQUEST: u16 = 0x0021;
pub const ZDO_UNBIND_REQUEST: u16 = 0x0022;
pub const ZDO_LQI_REQUEST: u16 = 0x0031;
pub const ZDO_LEAVE_REQUEST: u16 = 0x0034;

pub const ADDRESS_MODE_GROUP: u8 = 0x01;
pub const ADDRESS_MODE_64_BIT: u8 = 0x03;

/// Destination endpoint used when none is given.
pub const DEFAULT_DST_ENDPOINT: u8 = 0x01;

/// 64-bit IEEE (EUI-64) address, most significant byte first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IeeeAddress(pub [u8; 8]);

impl IeeeAddress {
    pub fn from_slice(buf: &[u8]) -> Option<Self> {
        let bytes: [u8; 8] = buf.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    /// Transmission order (little-endian).
    pub fn to_wire(self) -> [u8; 8] {
        let mut out = self.0;
        out.reverse();
        out
    }
}

impl fmt::Display for IeeeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Bind / unbind destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindDestination {
    Group(u16),
    Extended(IeeeAddress),
}

impl BindDestination {
    /// Pick the address mode from the buffer length: 2 bytes is a group,
    /// 8 bytes an extended address. Both are big-endian.
    pub fn from_slice(buf: &[u8]) -> Result<Self, AdapterError> {
        match buf.len() {
            2 => Ok(Self::Group(u16::from_be_bytes([buf[0], buf[1]]))),
            8 => IeeeAddress::from_slice(buf)
                .map(Self::Extended)
                .ok_or(AdapterError::InvalidDestination(8)),
            n => Err(AdapterError::InvalidDestination(n)),
        }
    }

    pub fn address_mode(&self) -> u8 {
        match self {
            Self::Group(_) => ADDRESS_MODE_GROUP,
            Self::Extended(_) => ADDRESS_MODE_64_BIT,
        }
    }
}

/// Generic ZDO request: sequence, target network address, then `data`.
pub fn zdo_payload(id: u8, network_address: u16, data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3 + data.len());
    buf.push(id);
    buf.extend_from_slice(&network_address.to_le_bytes());
    buf.extend_from_slice(data);
    buf
}

/// Bind / unbind request body.
///
/// `dst_endpoint == 0` falls back to [`DEFAULT_DST_ENDPOINT`]. The endpoint
/// byte is appended for group destinations too.
pub fn bind_payload(
    id: u8,
    source: IeeeAddress,
    src_endpoint: u8,
    cluster_id: u16,
    destination: BindDestination,
    dst_endpoint: u8,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(22);
    buf.push(id);
    buf.extend_from_slice(&source.to_wire());
    buf.push(src_endpoint);
    buf.extend_from_slice(&cluster_id.to_le_bytes());
    buf.push(destination.address_mode());
    match destination {
        BindDestination::Group(group) => buf.extend_from_slice(&group.to_le_bytes()),
        BindDestination::Extended(address) => buf.extend_from_slice(&address.to_wire()),
    }
    buf.push(if dst_endpoint != 0 {
        dst_endpoint
    } else {
        DEFAULT_DST_ENDPOINT
    });
    buf
}

/// Leave request body: target IEEE address, flags cleared.
pub fn leave_payload(id: u8, device: IeeeAddress) -> Vec<u8> {
    let mut buf = Vec::with_capacity(10);
    buf.push(id);
    buf.extend_from_slice(&device.to_wire());
    buf.push(0x00);
    buf
}

/// Management LQI request body.
pub fn lqi_payload(id: u8, index: u8) -> Vec<u8> {
    vec![id, index]
}
