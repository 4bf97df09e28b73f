//! Common types shared across pin implementations.

use facegate_core::PinNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Electrical level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }

    /// Value written to a sysfs `value` file.
    pub fn as_sysfs(&self) -> &'static str {
        match self {
            Self::Low => "0",
            Self::High => "1",
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Which level means "asserted" for an input.
///
/// The trigger button is wired to ground with a pull-up, so pressing it
/// reads LOW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    /// Whether `level` counts as asserted under this polarity.
    pub fn is_asserted(&self, level: Level) -> bool {
        match self {
            Self::ActiveLow => level == Level::Low,
            Self::ActiveHigh => level == Level::High,
        }
    }
}

/// Line direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Value written to a sysfs `direction` file.
    pub fn as_sysfs(&self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Output => "out",
        }
    }
}

/// Pin metadata for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinInfo {
    /// GPIO line.
    pub pin: PinNumber,

    /// Configured direction.
    pub direction: Direction,

    /// Backend name (e.g. "sysfs", "mock").
    pub backend: String,
}

impl PinInfo {
    pub fn new(pin: PinNumber, direction: Direction, backend: impl Into<String>) -> Self {
        Self {
            pin,
            direction,
            backend: backend.into(),
        }
    }
}

impl fmt::Display for PinInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.pin,
            self.direction.as_sysfs(),
            self.backend
        )
    }
}
