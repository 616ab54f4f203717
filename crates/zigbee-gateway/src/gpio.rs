// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GPIO lines used by the hardware reset strategy.
//!
//! Pins are addressed by their configured name (the sysfs GPIO number).
//! A pin configured as `"-1"` or left empty is disabled and every call on
//! it is a no-op.

use std::io;
use std::path::PathBuf;

use crate::config::pin_enabled;

const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

impl PinMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Output => "out",
        }
    }
}

/// GPIO access used by the adapter.
pub trait Gpio {
    /// Configure the direction of `pin`.
    fn direction(&mut self, pin: &str, mode: PinMode) -> io::Result<()>;

    /// Drive `pin` high (`true`) or low.
    fn set_level(&mut self, pin: &str, level: bool) -> io::Result<()>;
}

/// Legacy sysfs GPIO interface (`/sys/class/gpio`).
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl SysfsGpio {
    pub fn new() -> Self {
        Self::with_root(SYSFS_GPIO_ROOT)
    }

    /// Use an alternate sysfs root (tests, containers with remapped sysfs).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pin_dir(&self, pin: &str) -> PathBuf {
        self.root.join(format!("gpio{}", pin.trim()))
    }

    fn ensure_exported(&self, pin: &str) -> io::Result<()> {
        if self.pin_dir(pin).exists() {
            return Ok(());
        }
        std::fs::write(self.root.join("export"), pin.trim())
    }
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl Gpio for SysfsGpio {
    fn direction(&mut self, pin: &str, mode: PinMode) -> io::Result<()> {
        if !pin_enabled(pin) {
            return Ok(());
        }
        self.ensure_exported(pin)?;
        std::fs::write(self.pin_dir(pin).join("direction"), mode.as_str())
    }

    fn set_level(&mut self, pin: &str, level: bool) -> io::Result<()> {
        if !pin_enabled(pin) {
            return Ok(());
        }
        std::fs::write(self.pin_dir(pin).join("value"), if level { "1" } else { "0" })
    }
}

/// No-op GPIO for hosts without accessible pins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGpio;

impl Gpio for NullGpio {
    fn direction(&mut self, _pin: &str, _mode: PinMode) -> io::Result<()> {
        Ok(())
    }

    fn set_level(&mut self, _pin: &str, _level: bool) -> io::Result<()> {
        Ok(())
    }
}
