// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared across the gateway layers.
//!
//! Transport errors are transient and feed the adapter recovery cycle.
//! Action errors are local validation failures: they never reach the
//! transport. Decoders have no error type at all, malformed input is
//! simply ignored.

use thiserror::Error;

/// Errors raised by a physical transport (serial line or TCP socket).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured address cannot be used (empty host, port 0).
    #[error("invalid connection address or port number")]
    InvalidAddress,

    /// Host name lookup failed. Retried on the next recovery cycle.
    #[error("cannot resolve {host}: {source}")]
    Resolve {
        host: String,
        source: std::io::Error,
    },

    /// Transports run their I/O on the tokio runtime and cannot open
    /// outside of it.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// The transport is not open / not connected.
    #[error("transport not open")]
    NotOpen,

    /// The requested line control is not available on this transport.
    #[error("operation not supported by {0} transport")]
    Unsupported(&'static str),

    /// The remote end closed the connection.
    #[error("connection closed by peer")]
    Closed,

    /// Serial driver error (message only).
    #[error("serial port error: {0}")]
    Serial(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio_serial::Error> for TransportError {
    fn from(e: tokio_serial::Error) -> Self {
        Self::Serial(e.to_string())
    }
}

/// Validation failures produced while encoding an action request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The name is not part of the action's accepted set.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The value cannot be coerced to what the action expects.
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

impl ActionError {
    pub(crate) fn invalid(name: &str, value: &serde_json::Value) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Errors surfaced by adapter request builders.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The coordinator refused (or failed) to submit the unicast request.
    #[error("request rejected by coordinator (cluster 0x{cluster_id:04x})")]
    RequestRejected { cluster_id: u16 },

    /// A bind destination must be a 2-byte group or an 8-byte IEEE address.
    #[error("invalid bind destination length: {0}")]
    InvalidDestination(usize),
}
