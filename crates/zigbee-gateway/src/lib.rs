// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Zigbee Gateway Core
//!
//! Building blocks of a Zigbee home-automation gateway: the coordinator
//! adapter that owns the serial / TCP link, outbound action encoders and
//! inbound property decoders.
//!
//! # Features
//!
//! - **Adapter**: transport lifecycle, hardware / soft reset with timeout
//!   recovery, permit-join window, ZDO bind / unbind / leave / LQI framing
//! - **Actions**: `(name, value)` requests encoded into ZCL and Tuya
//!   data-point frames, with a per-action transaction counter
//! - **Properties**: Tuya data-point and attribute decoders merged into a
//!   JSON value per device capability
//!
//! # Quick Start
//!
//! ```bash
//! # Write an example configuration
//! zigbee-gateway gen-config --output gateway.toml
//!
//! # Encode a request frame
//! zigbee-gateway encode tuyaLightDimmer level 128
//!
//! # Drive the coordinator
//! zigbee-gateway --config gateway.toml run
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! [zigbee]
//! port = "tcp://192.168.1.20:6638"
//! panid = "0x1A62"
//! channel = 15
//! reset = "soft"
//!
//! [debug]
//! port = true
//! ```

pub mod action;
pub mod adapter;
pub mod config;
pub mod datapoint;
pub mod error;
pub mod gpio;
pub mod property;
pub mod transport;
pub mod zcl;

pub use action::{ActionKind, ActionObject, ActionRegistry, ActionRequest};
pub use adapter::{
    Adapter, AdapterEvent, AdapterService, AdapterState, BindDestination, BindRequest, Coordinator,
    CoordinatorInfo, IeeeAddress, Link, UnicastRequest,
};
pub use config::{ConfigError, GatewayConfig, PortAddress, ResetStrategy};
pub use datapoint::{DataPointHeader, DataPointValue, DataType};
pub use error::{ActionError, AdapterError, TransportError};
pub use gpio::{Gpio, NullGpio, SysfsGpio};
pub use property::{PropertyKind, PropertyObject};
pub use transport::{SerialTransport, TcpTransport, Transport, TransportEvent, TransportKind};
