// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Gateway configuration.
//!
//! Loaded from a TOML file whose sections follow the historical key paths
//! (`zigbee/port`, `gpio/boot`, `debug/port`, ...).

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

/// Lowest usable 2.4 GHz channel.
pub const CHANNEL_MIN: u8 = 11;
/// Highest usable 2.4 GHz channel.
pub const CHANNEL_MAX: u8 = 26;

const TCP_SCHEME: &str = "tcp://";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Full gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub zigbee: ZigbeeConfig,

    #[serde(default)]
    pub gpio: GpioConfig,

    #[serde(default)]
    pub debug: DebugConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// `[zigbee]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZigbeeConfig {
    /// Serial device path or `tcp://host:port`.
    #[serde(default = "default_port")]
    pub port: String,

    #[serde(default = "default_baudrate")]
    pub baudrate: u32,

    /// PAN identifier, accepts `"0x1A62"` or a plain integer.
    #[serde(default = "default_pan_id", deserialize_with = "deserialize_pan_id")]
    pub panid: u16,

    /// Radio channel. Out-of-range values fall back to 11.
    #[serde(default)]
    pub channel: u8,

    /// Allow the coordinator to overwrite its stored network parameters.
    #[serde(default)]
    pub write: bool,

    /// Reset strategy name: "gpio", "flow", anything else means soft reset.
    #[serde(default)]
    pub reset: String,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baudrate() -> u32 {
    115_200
}

fn default_pan_id() -> u16 {
    0x1A62
}

impl Default for ZigbeeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baudrate: default_baudrate(),
            panid: default_pan_id(),
            channel: CHANNEL_MIN,
            write: false,
            reset: String::new(),
        }
    }
}

impl ZigbeeConfig {
    /// Channel clamped to the valid range (anything outside 11..=26 becomes 11).
    pub fn effective_channel(&self) -> u8 {
        if (CHANNEL_MIN..=CHANNEL_MAX).contains(&self.channel) {
            self.channel
        } else {
            CHANNEL_MIN
        }
    }

    pub fn port_address(&self) -> PortAddress {
        PortAddress::parse(&self.port)
    }

    pub fn reset_strategy(&self) -> ResetStrategy {
        ResetStrategy::from_name(&self.reset)
    }
}

/// `[gpio]` section. Pin names are kept as strings; "-1" or empty disables a pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpioConfig {
    #[serde(default = "disabled_pin")]
    pub boot: String,

    #[serde(default = "disabled_pin")]
    pub reset: String,
}

fn disabled_pin() -> String {
    "-1".to_string()
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            boot: disabled_pin(),
            reset: disabled_pin(),
        }
    }
}

/// `[debug]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Dump every transmitted and received buffer.
    #[serde(default)]
    pub port: bool,

    /// Verbose adapter state logging.
    #[serde(default)]
    pub adapter: bool,
}

/// `[log]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// A malformed `tcp://` address is not rejected here, the adapter
    /// reports it from `init()`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zigbee.port.trim().is_empty() {
            return Err(ConfigError::Invalid("zigbee.port must not be empty".into()));
        }
        if self.zigbee.baudrate == 0 {
            return Err(ConfigError::Invalid("zigbee.baudrate must be > 0".into()));
        }
        if self.zigbee.reset_strategy() == ResetStrategy::Gpio
            && !pin_enabled(&self.gpio.reset)
        {
            tracing::warn!("zigbee.reset = \"gpio\" without gpio.reset, the reset pulse is a no-op");
        }
        Ok(())
    }
}

/// Physical address of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortAddress {
    /// Serial device path.
    Serial(String),
    /// TCP endpoint. `port == 0` marks an unusable address.
    Tcp { host: String, port: u16 },
}

impl PortAddress {
    /// Parse `tcp://host:port`, anything else is a serial device name.
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix(TCP_SCHEME) {
            Some(rest) => {
                let (host, port) = match rest.rsplit_once(':') {
                    Some((host, port)) => (host, port.parse().unwrap_or(0)),
                    None => (rest, 0),
                };
                Self::Tcp {
                    host: host.to_string(),
                    port,
                }
            }
            None => Self::Serial(value.to_string()),
        }
    }

    pub fn is_tcp(&self) -> bool {
        matches!(self, Self::Tcp { .. })
    }
}

/// Hardware reset strategy, exactly one is used per adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStrategy {
    /// Toggle the boot / reset GPIO lines.
    Gpio,
    /// Toggle DTR / RTS on the serial line.
    Flow,
    /// Send the vendor in-band reset command.
    Soft,
}

impl ResetStrategy {
    pub fn from_name(name: &str) -> Self {
        match name {
            "gpio" => Self::Gpio,
            "flow" => Self::Flow,
            _ => Self::Soft,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpio => "gpio",
            Self::Flow => "flow",
            Self::Soft => "soft",
        }
    }
}

/// A pin name is usable unless it is empty or negative.
pub fn pin_enabled(pin: &str) -> bool {
    let pin = pin.trim();
    !pin.is_empty() && !pin.starts_with('-')
}

fn deserialize_pan_id<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u16),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => {
            let digits = text
                .trim()
                .trim_start_matches("0x")
                .trim_start_matches("0X");
            u16::from_str_radix(digits, 16).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_out_of_range_defaults_to_11() {
        let mut cfg = ZigbeeConfig::default();
        for (channel, expected) in [(0, 11), (10, 11), (11, 11), (20, 20), (26, 26), (27, 11)] {
            cfg.channel = channel;
            assert_eq!(cfg.effective_channel(), expected, "channel {}", channel);
        }
    }

    #[test]
    fn test_port_address_parse() {
        assert_eq!(
            PortAddress::parse("/dev/ttyACM0"),
            PortAddress::Serial("/dev/ttyACM0".into())
        );
        assert_eq!(
            PortAddress::parse("tcp://192.168.1.2:8888"),
            PortAddress::Tcp {
                host: "192.168.1.2".into(),
                port: 8888
            }
        );
        assert_eq!(
            PortAddress::parse("tcp://gateway"),
            PortAddress::Tcp {
                host: "gateway".into(),
                port: 0
            }
        );
    }

    #[test]
    fn test_reset_strategy_names() {
        assert_eq!(ResetStrategy::from_name("gpio"), ResetStrategy::Gpio);
        assert_eq!(ResetStrategy::from_name("flow"), ResetStrategy::Flow);
        assert_eq!(ResetStrategy::from_name(""), ResetStrategy::Soft);
        assert_eq!(ResetStrategy::from_name("GPIO"), ResetStrategy::Soft);
    }

    #[test]
    fn test_pan_id_hex_string_and_number() {
        let cfg = GatewayConfig::from_toml_str("[zigbee]\npanid = \"0x1A63\"\n").unwrap();
        assert_eq!(cfg.zigbee.panid, 0x1A63);

        let cfg = GatewayConfig::from_toml_str("[zigbee]\npanid = 4660\n").unwrap();
        assert_eq!(cfg.zigbee.panid, 0x1234);
    }

    #[test]
    fn test_gpio_reset_without_pin_is_accepted() {
        let cfg = GatewayConfig::from_toml_str("[zigbee]\nreset = \"gpio\"\n").unwrap();
        assert_eq!(cfg.zigbee.reset_strategy(), ResetStrategy::Gpio);
        assert!(!pin_enabled(&cfg.gpio.reset));
    }
}
