// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-stream transports to the radio coordinator.
//!
//! | Transport | Address form | Line control |
//! |-----------|--------------|--------------|
//! | [`SerialTransport`] | `/dev/ttyUSB0` | DTR / RTS |
//! | [`TcpTransport`] | `tcp://host:port` | none |
//!
//! Each open transport owns a tokio task that does the actual I/O. Frames
//! queued with [`Transport::write`] are written whole by that task, inbound
//! bytes are buffered until [`Transport::read_all`]. The sans-IO adapter
//! drains [`TransportEvent`]s with [`Transport::poll_event`] whenever the
//! waker handed to [`Transport::set_waker`] fires.

use std::sync::Arc;

use tokio::sync::Notify;

use crate::config::{PortAddress, ZigbeeConfig};
use crate::error::TransportError;

mod serial;
mod session;
mod tcp;

pub use serial::SerialTransport;
pub use tcp::TcpTransport;

/// Which physical transport backs the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Serial,
    Tcp,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Tcp => "tcp",
        }
    }
}

/// Asynchronous notifications raised by a transport.
#[derive(Debug)]
pub enum TransportEvent {
    /// A pending TCP connect completed.
    Connected,
    /// New bytes are buffered and can be drained with [`Transport::read_all`].
    DataAvailable,
    /// The line failed; the adapter schedules a recovery.
    Error(TransportError),
}

/// Abstraction over the coordinator link.
pub trait Transport {
    fn kind(&self) -> TransportKind;

    /// Notified every time a new event is queued by the I/O task.
    fn set_waker(&mut self, _waker: Arc<Notify>) {}

    /// Human-readable endpoint (device path or socket address).
    fn describe(&self) -> String;

    /// Open the serial port, or start a TCP connect.
    ///
    /// A TCP transport returns `Ok` while name lookup and connect are still
    /// in progress, completion is reported later as
    /// [`TransportEvent::Connected`] or [`TransportEvent::Error`].
    fn open(&mut self) -> Result<(), TransportError>;

    /// Close the port / disconnect the socket. Safe to call when closed.
    fn close(&mut self);

    /// Serial: port is open. TCP: socket is connected.
    fn is_open(&self) -> bool;

    /// Next pending event, if any.
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Drain every buffered inbound byte.
    fn read_all(&mut self) -> Vec<u8>;

    /// Queue one frame. It reaches the line in one piece or not at all
    /// before the next queued frame.
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Drive the DTR line (serial only).
    fn set_data_terminal_ready(&mut self, _level: bool) -> Result<(), TransportError> {
        Err(TransportError::Unsupported(self.kind().as_str()))
    }

    /// Drive the RTS line (serial only).
    fn set_request_to_send(&mut self, _level: bool) -> Result<(), TransportError> {
        Err(TransportError::Unsupported(self.kind().as_str()))
    }
}

/// Build the transport selected by `zigbee.port`.
pub fn from_config(config: &ZigbeeConfig) -> Box<dyn Transport> {
    match config.port_address() {
        PortAddress::Serial(name) => Box::new(SerialTransport::new(name, config.baudrate)),
        PortAddress::Tcp { host, port } => Box::new(TcpTransport::new(&host, port)),
    }
}

/// Colon-separated hex dump used by the port debug output.
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(":")
}
