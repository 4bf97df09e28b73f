//! Mock image source.

use std::collections::VecDeque;

use facegate_core::ImagePayload;

use crate::traits::ImageProvider;

/// Image provider that returns queued frames.
///
/// Once the queue is exhausted every capture yields an empty payload, the
/// same as an unwired camera.
///
/// # Examples
///
/// ```
/// use facegate_hardware::mock::MockCamera;
/// use facegate_hardware::traits::ImageProvider;
///
/// #[tokio::main]
/// async fn main() {
///     let mut camera = MockCamera::with_frames(vec![vec![0xFF, 0xD8]]);
///
///     assert_eq!(camera.capture().await.len(), 2);
///     assert!(camera.capture().await.is_empty());
///     assert_eq!(camera.capture_count(), 2);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockCamera {
    frames: VecDeque<ImagePayload>,
    captures: usize,
}

impl MockCamera {
    /// Camera with no frames queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera that returns `frames` in order.
    pub fn with_frames<F: Into<ImagePayload>>(frames: Vec<F>) -> Self {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            captures: 0,
        }
    }

    /// Queue another frame.
    pub fn push_frame(&mut self, frame: impl Into<ImagePayload>) {
        self.frames.push_back(frame.into());
    }

    /// Number of `capture` calls so far.
    pub fn capture_count(&self) -> usize {
        self.captures
    }
}

impl ImageProvider for MockCamera {
    async fn capture(&mut self) -> ImagePayload {
        self.captures += 1;
        self.frames.pop_front().unwrap_or_default()
    }

    fn name(&self) -> &str {
        "Mock Camera"
    }
}
