//! Peripheral capability traits.
//!
//! These traits are the contract between the controller and the raw I/O it
//! drives: one digital input for the trigger, digital outputs for the lock
//! actuator and the two indicators, and an image source. Mock, sysfs and
//! placeholder implementations live in sibling modules.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use facegate_core::ImagePayload;

use crate::error::Result;
use crate::types::{Level, PinInfo};

/// Digital input line.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the
/// [`AnyInputPin`](crate::devices::AnyInputPin) enum wrapper when the backend
/// is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use facegate_hardware::traits::InputPin;
/// use facegate_hardware::error::Result;
///
/// async fn is_pressed<P: InputPin>(pin: &mut P) -> Result<bool> {
///     // Active-low button: pressed reads LOW.
///     Ok(!pin.read().await?.is_high())
/// }
/// ```
pub trait InputPin: Send + Sync {
    /// Sample the current level of the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be read.
    async fn read(&mut self) -> Result<Level>;

    /// Get pin information.
    fn info(&self) -> PinInfo;
}

/// Digital output line.
///
/// # Examples
///
/// ```no_run
/// use facegate_hardware::traits::OutputPin;
/// use facegate_hardware::types::Level;
/// use facegate_hardware::error::Result;
///
/// async fn pulse<P: OutputPin>(pin: &mut P) -> Result<()> {
///     pin.write(Level::High).await?;
///     pin.write(Level::Low).await
/// }
/// ```
pub trait OutputPin: Send + Sync {
    /// Drive the line to `level`.
    ///
    /// Writing the level the line already has is allowed and harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be written.
    async fn write(&mut self, level: Level) -> Result<()>;

    /// Last level written, or `Level::Low` if never written.
    fn level(&self) -> Level;

    /// Get pin information.
    fn info(&self) -> PinInfo;
}

/// Source of still images for recognition.
///
/// Capture never fails from the caller's point of view: when no image is
/// available the provider returns an empty [`ImagePayload`], which the
/// recognition service will reject.
///
/// # Examples
///
/// ```
/// use facegate_hardware::traits::ImageProvider;
/// use facegate_hardware::camera::PlaceholderCamera;
///
/// #[tokio::main]
/// async fn main() {
///     let mut camera = PlaceholderCamera::new();
///     let frame = camera.capture().await;
///     assert!(frame.is_empty());
/// }
/// ```
pub trait ImageProvider: Send + Sync {
    /// Capture one image.
    async fn capture(&mut self) -> ImagePayload;

    /// Human-readable provider name for logs.
    fn name(&self) -> &str;
}
