// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// I/O task shared by the serial and TCP transports.

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::TransportError;

const READ_CHUNK: usize = 4096;

/// Modem control line driven from the I/O task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Line {
    DataTerminalReady,
    RequestToSend,
}

/// Work queued for the I/O task, executed in order.
#[derive(Debug)]
pub(super) enum Command {
    Frame(Vec<u8>),
    Line(Line, bool),
}

/// What the I/O task reports back.
#[derive(Debug)]
pub(super) enum Inbound {
    Connected,
    Data(Vec<u8>),
    Error(TransportError),
}

/// Sending side of the inbound queue, wakes the adapter on every message.
pub(super) struct Reporter {
    inbound: UnboundedSender<Inbound>,
    waker: Arc<Notify>,
}

impl Reporter {
    pub(super) fn send(&self, message: Inbound) {
        if self.inbound.send(message).is_ok() {
            self.waker.notify_one();
        }
    }
}

/// One open line: the task plus both queues. Dropping it stops the task.
pub(super) struct Session {
    commands: UnboundedSender<Command>,
    inbound: UnboundedReceiver<Inbound>,
    task: JoinHandle<()>,
}

impl Session {
    pub(super) fn spawn<F, Fut>(handle: &Handle, waker: Arc<Notify>, io: F) -> Self
    where
        F: FnOnce(UnboundedReceiver<Command>, Reporter) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let reporter = Reporter {
            inbound: inbound_tx,
            waker,
        };
        let task = handle.spawn(io(command_rx, reporter));
        Self {
            commands,
            inbound,
            task,
        }
    }

    pub(super) fn send(&self, command: Command) -> Result<(), TransportError> {
        self.commands
            .send(command)
            .map_err(|_| TransportError::Closed)
    }

    /// Next report, without waiting. A task that ended silently reads as
    /// a closed line.
    pub(super) fn try_recv(&mut self) -> Option<Inbound> {
        match self.inbound.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Inbound::Error(TransportError::Closed)),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub(super) fn runtime() -> Result<Handle, TransportError> {
    Handle::try_current().map_err(|_| TransportError::NoRuntime)
}

/// Move bytes both ways until the stream fails or the session is dropped.
///
/// Reads are cancel-safe, so a queued command interrupts a pending read
/// without losing data. Frames are written with `write_all` outside the
/// select, a slow peer stalls the queue instead of splitting a frame.
pub(super) async fn pump<S, F>(
    mut stream: S,
    mut commands: UnboundedReceiver<Command>,
    reporter: Reporter,
    mut control: F,
) where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FnMut(&mut S, Line, bool) -> io::Result<()>,
{
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        tokio::select! {
            read = stream.read(&mut buf) => match read {
                Ok(0) => {
                    reporter.send(Inbound::Error(TransportError::Closed));
                    return;
                }
                Ok(n) => reporter.send(Inbound::Data(buf[..n].to_vec())),
                Err(e) => {
                    reporter.send(Inbound::Error(e.into()));
                    return;
                }
            },
            command = commands.recv() => {
                let result = match command {
                    Some(Command::Frame(frame)) => stream.write_all(&frame).await,
                    Some(Command::Line(line, level)) => control(&mut stream, line, level),
                    None => return,
                };
                if let Err(e) = result {
                    reporter.send(Inbound::Error(e.into()));
                    return;
                }
            }
        }
    }
}
