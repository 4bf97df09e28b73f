//! Peripheral abstraction layer for the facegate door unit.
//!
//! This crate provides trait-based abstractions for the raw I/O the access
//! controller drives, and the [`PeripheralInterface`] that gives those lines
//! door-level meaning. Mock implementations allow the whole loop to run
//! without hardware; the sysfs backend drives real GPIO lines on Linux.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: Runtime backend choice goes through the `Any*` wrappers
//!   in [`devices`] instead of trait objects.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Fail-closed**: Pin errors stop at [`PeripheralInterface`], which resolves
//!   them to "trigger released" and "lock unchanged".
//!
//! # Capabilities
//!
//! - [`InputPin`]: one digital input (the trigger).
//! - [`OutputPin`]: one digital output (the lock actuator, each indicator).
//! - [`ImageProvider`]: still images for recognition.
//!
//! ```no_run
//! use facegate_hardware::traits::{InputPin, OutputPin};
//! use facegate_hardware::types::Level;
//! use facegate_hardware::error::Result;
//!
//! async fn mirror<I: InputPin, O: OutputPin>(input: &mut I, output: &mut O) -> Result<()> {
//!     let level = input.read().await?;
//!     output.write(level).await
//! }
//! ```
//!
//! [`InputPin`]: traits::InputPin
//! [`OutputPin`]: traits::OutputPin
//! [`ImageProvider`]: traits::ImageProvider

pub mod camera;
pub mod devices;
pub mod error;
pub mod mock;
pub mod peripherals;
pub mod sysfs;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use peripherals::PeripheralInterface;
pub use traits::{ImageProvider, InputPin, OutputPin};
pub use types::{Direction, Level, PinInfo, Polarity};
