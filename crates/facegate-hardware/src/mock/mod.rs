//! Mock device implementations for testing and development.
//!
//! This module provides simulated pins and an image source that can be
//! controlled programmatically without requiring physical hardware.

pub mod camera;
pub mod pin;

// Re-export commonly used types
pub use camera::MockCamera;
pub use pin::{MockInputHandle, MockInputPin, MockOutputPin, PinEvent, PinRecorder};
