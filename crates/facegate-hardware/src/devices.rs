//! Enum wrappers for runtime backend selection.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) is not object
//! safe, so `Box<dyn InputPin>` is not available. The binary picks a backend
//! at startup (sysfs on the door unit, mocks in simulation) and wraps it in
//! one of these enums, which implement the same traits by delegation.
//!
//! # Examples
//!
//! ```
//! use facegate_core::PinNumber;
//! use facegate_hardware::devices::AnyInputPin;
//! use facegate_hardware::mock::MockInputPin;
//! use facegate_hardware::traits::InputPin;
//! use facegate_hardware::types::Level;
//!
//! #[tokio::main]
//! async fn main() -> facegate_hardware::Result<()> {
//!     let (pin, _handle) = MockInputPin::new(PinNumber::new(13).unwrap(), Level::High);
//!     let mut any_pin = AnyInputPin::Mock(pin);
//!
//!     assert_eq!(any_pin.read().await?, Level::High);
//!     Ok(())
//! }
//! ```

use facegate_core::ImagePayload;

use crate::camera::PlaceholderCamera;
use crate::mock::{MockCamera, MockInputPin, MockOutputPin};
use crate::sysfs::{SysfsInputPin, SysfsOutputPin};
use crate::traits::{ImageProvider, InputPin, OutputPin};
use crate::types::{Level, PinInfo};
use crate::Result;

/// Enum wrapper for input pin dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyInputPin {
    /// Mock input for development and testing.
    Mock(MockInputPin),

    /// Linux sysfs GPIO line.
    Sysfs(SysfsInputPin),
}

impl InputPin for AnyInputPin {
    async fn read(&mut self) -> Result<Level> {
        match self {
            Self::Mock(pin) => pin.read().await,
            Self::Sysfs(pin) => pin.read().await,
        }
    }

    fn info(&self) -> PinInfo {
        match self {
            Self::Mock(pin) => pin.info(),
            Self::Sysfs(pin) => pin.info(),
        }
    }
}

/// Enum wrapper for output pin dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputPin {
    /// Mock output for development and testing.
    Mock(MockOutputPin),

    /// Linux sysfs GPIO line.
    Sysfs(SysfsOutputPin),
}

impl OutputPin for AnyOutputPin {
    async fn write(&mut self, level: Level) -> Result<()> {
        match self {
            Self::Mock(pin) => pin.write(level).await,
            Self::Sysfs(pin) => pin.write(level).await,
        }
    }

    fn level(&self) -> Level {
        match self {
            Self::Mock(pin) => pin.level(),
            Self::Sysfs(pin) => pin.level(),
        }
    }

    fn info(&self) -> PinInfo {
        match self {
            Self::Mock(pin) => pin.info(),
            Self::Sysfs(pin) => pin.info(),
        }
    }
}

/// Enum wrapper for image provider dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyImageProvider {
    /// No camera fitted; always empty.
    Placeholder(PlaceholderCamera),

    /// Queued frames for development and testing.
    Mock(MockCamera),
}

impl ImageProvider for AnyImageProvider {
    async fn capture(&mut self) -> ImagePayload {
        match self {
            Self::Placeholder(camera) => camera.capture().await,
            Self::Mock(camera) => camera.capture().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Placeholder(camera) => camera.name(),
            Self::Mock(camera) => camera.name(),
        }
    }
}
