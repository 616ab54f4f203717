// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// TCP transport for network-attached coordinators (ser2net style bridges).

use std::io;
use std::sync::Arc;

use tokio::net::{lookup_host, TcpStream};
use tokio::sync::Notify;

use super::session::{self, pump, Command, Inbound, Session};
use super::{Transport, TransportEvent, TransportKind};
use crate::error::TransportError;

/// TCP client. Name lookup, connect and socket I/O run on a tokio task.
pub struct TcpTransport {
    host: String,
    port: u16,
    waker: Arc<Notify>,
    session: Option<Session>,
    connected: bool,
    rx: Vec<u8>,
}

impl TcpTransport {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            waker: Arc::new(Notify::new()),
            session: None,
            connected: false,
            rx: Vec::new(),
        }
    }

    fn drop_session(&mut self) {
        self.session = None;
        self.connected = false;
    }
}

/// Resolve and connect, trying every address the lookup returns.
async fn connect(host: &str, port: u16) -> Result<TcpStream, TransportError> {
    let addrs = lookup_host((host, port))
        .await
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            source,
        })?;

    let mut last = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                configure(&stream)?;
                return Ok(stream);
            }
            Err(e) => last = Some(e),
        }
    }

    Err(match last {
        Some(e) => e.into(),
        None => TransportError::Resolve {
            host: host.to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        },
    })
}

fn configure(stream: &TcpStream) -> io::Result<()> {
    stream.set_nodelay(true)?;
    // Bridges that vanish without a FIN are noticed by keepalive.
    socket2::SockRef::from(stream).set_keepalive(true)
}

impl Transport for TcpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Tcp
    }

    fn set_waker(&mut self, waker: Arc<Notify>) {
        self.waker = waker;
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn open(&mut self) -> Result<(), TransportError> {
        if self.host.is_empty() || self.port == 0 {
            return Err(TransportError::InvalidAddress);
        }
        let handle = session::runtime()?;
        self.drop_session();
        self.rx.clear();

        let host = self.host.clone();
        let port = self.port;
        self.session = Some(Session::spawn(
            &handle,
            self.waker.clone(),
            move |commands, reporter| async move {
                let stream = match connect(&host, port).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        reporter.send(Inbound::Error(e));
                        return;
                    }
                };
                reporter.send(Inbound::Connected);
                pump(stream, commands, reporter, |_, _, _| {
                    Err(io::Error::from(io::ErrorKind::Unsupported))
                })
                .await;
            },
        ));
        Ok(())
    }

    fn close(&mut self) {
        self.drop_session();
        self.rx.clear();
    }

    fn is_open(&self) -> bool {
        self.connected
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        let inbound = self.session.as_mut()?.try_recv()?;
        match inbound {
            Inbound::Connected => {
                self.connected = true;
                Some(TransportEvent::Connected)
            }
            Inbound::Data(bytes) => {
                self.rx.extend_from_slice(&bytes);
                Some(TransportEvent::DataAvailable)
            }
            Inbound::Error(e) => {
                self.drop_session();
                Some(TransportEvent::Error(e))
            }
        }
    }

    fn read_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.rx)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotOpen);
        }
        self.session
            .as_ref()
            .ok_or(TransportError::NotOpen)?
            .send(Command::Frame(data.to_vec()))
    }
}
