//! Placeholder image source.
//!
//! The door unit has no camera driver yet. [`PlaceholderCamera`] stands in for
//! it so the rest of the loop runs end to end: every capture yields an empty
//! payload, which the recognition service rejects, so the door always denies
//! until a real provider is plugged in through [`ImageProvider`].

use facegate_core::ImagePayload;
use tracing::warn;

use crate::traits::ImageProvider;

/// Image provider that never has an image.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderCamera;

impl PlaceholderCamera {
    pub fn new() -> Self {
        Self
    }
}

impl ImageProvider for PlaceholderCamera {
    async fn capture(&mut self) -> ImagePayload {
        warn!("Camera not implemented - sending empty image");
        ImagePayload::empty()
    }

    fn name(&self) -> &str {
        "Placeholder Camera"
    }
}
