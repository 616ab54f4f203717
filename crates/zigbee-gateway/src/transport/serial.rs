// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Serial transport, 8N1 with configurable baud rate.

use std::io;
use std::sync::Arc;

use tokio::sync::Notify;
use tokio_serial::{DataBits, Parity, SerialPort, SerialPortBuilderExt, SerialStream, StopBits};

use super::session::{self, pump, Command, Inbound, Line, Session};
use super::{Transport, TransportEvent, TransportKind};
use crate::error::TransportError;

/// Serial port driven through `tokio-serial`.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    waker: Arc<Notify>,
    session: Option<Session>,
    rx: Vec<u8>,
}

impl SerialTransport {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            waker: Arc::new(Notify::new()),
            session: None,
            rx: Vec::new(),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn line(&self, line: Line, level: bool) -> Result<(), TransportError> {
        self.session
            .as_ref()
            .ok_or(TransportError::NotOpen)?
            .send(Command::Line(line, level))
    }
}

fn set_line(port: &mut SerialStream, line: Line, level: bool) -> io::Result<()> {
    let result = match line {
        Line::DataTerminalReady => port.write_data_terminal_ready(level),
        Line::RequestToSend => port.write_request_to_send(level),
    };
    result.map_err(io::Error::from)
}

impl Transport for SerialTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn set_waker(&mut self, waker: Arc<Notify>) {
        self.waker = waker;
    }

    fn describe(&self) -> String {
        self.port_name.clone()
    }

    fn open(&mut self) -> Result<(), TransportError> {
        if self.port_name.trim().is_empty() {
            return Err(TransportError::InvalidAddress);
        }
        let handle = session::runtime()?;
        self.session = None;
        self.rx.clear();

        // Registering the fd with the reactor needs the runtime context.
        let stream = {
            let _guard = handle.enter();
            tokio_serial::new(&self.port_name, self.baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .open_native_async()?
        };

        self.session = Some(Session::spawn(
            &handle,
            self.waker.clone(),
            move |commands, reporter| pump(stream, commands, reporter, set_line),
        ));
        Ok(())
    }

    fn close(&mut self) {
        self.session = None;
        self.rx.clear();
    }

    fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        let inbound = self.session.as_mut()?.try_recv()?;
        match inbound {
            Inbound::Data(bytes) => {
                self.rx.extend_from_slice(&bytes);
                Some(TransportEvent::DataAvailable)
            }
            Inbound::Error(e) => {
                // Unplugged adapters surface here, drop the handle so the
                // next init() reopens the device.
                self.session = None;
                Some(TransportEvent::Error(e))
            }
            Inbound::Connected => None,
        }
    }

    fn read_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.rx)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.session
            .as_ref()
            .ok_or(TransportError::NotOpen)?
            .send(Command::Frame(data.to_vec()))
    }

    fn set_data_terminal_ready(&mut self, level: bool) -> Result<(), TransportError> {
        self.line(Line::DataTerminalReady, level)
    }

    fn set_request_to_send(&mut self, level: bool) -> Result<(), TransportError> {
        self.line(Line::RequestToSend, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_port_behaviour() {
        let mut transport = SerialTransport::new("/dev/does-not-exist", 115200);
        assert!(!transport.is_open());
        assert!(transport.poll_event().is_none());
        assert!(transport.read_all().is_empty());
        assert!(matches!(transport.write(&[1]), Err(TransportError::NotOpen)));
        assert!(matches!(
            transport.set_request_to_send(true),
            Err(TransportError::NotOpen)
        ));
    }

    #[test]
    fn test_empty_port_name_is_invalid() {
        let mut transport = SerialTransport::new("", 115200);
        assert!(matches!(transport.open(), Err(TransportError::InvalidAddress)));
    }

    #[tokio::test]
    async fn test_missing_device_fails_to_open() {
        let mut transport = SerialTransport::new("/dev/does-not-exist", 115200);
        assert!(matches!(transport.open(), Err(TransportError::Serial(_))));
        assert!(!transport.is_open());
    }
}
