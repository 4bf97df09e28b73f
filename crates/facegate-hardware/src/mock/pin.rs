//! Mock digital pins.
//!
//! [`MockInputPin`] follows a level set through its [`MockInputHandle`], or
//! replays a scripted sequence of samples. [`MockOutputPin`] records every
//! write into a [`PinRecorder`] that can be shared between pins, so a test can
//! check the combined order of lock and indicator writes against virtual time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use facegate_core::PinNumber;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{HardwareError, Result};
use crate::traits::{InputPin, OutputPin};
use crate::types::{Direction, Level, PinInfo};

/// Mock digital input.
///
/// # Examples
///
/// ```
/// use facegate_core::PinNumber;
/// use facegate_hardware::mock::MockInputPin;
/// use facegate_hardware::traits::InputPin;
/// use facegate_hardware::types::Level;
///
/// #[tokio::main]
/// async fn main() -> facegate_hardware::Result<()> {
///     let (mut pin, handle) = MockInputPin::new(PinNumber::new(13).unwrap(), Level::High);
///
///     assert_eq!(pin.read().await?, Level::High);
///     handle.set_level(Level::Low);
///     assert_eq!(pin.read().await?, Level::Low);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockInputPin {
    pin: PinNumber,
    level_rx: watch::Receiver<Level>,
    script: VecDeque<Level>,
    reads: Arc<AtomicUsize>,
}

impl MockInputPin {
    /// Create a pin resting at `initial`, plus a handle that moves it.
    pub fn new(pin: PinNumber, initial: Level) -> (Self, MockInputHandle) {
        let (level_tx, level_rx) = watch::channel(initial);
        let reads = Arc::new(AtomicUsize::new(0));

        let input = Self {
            pin,
            level_rx,
            script: VecDeque::new(),
            reads: Arc::clone(&reads),
        };
        let handle = MockInputHandle {
            level_tx: Arc::new(level_tx),
            reads,
        };

        (input, handle)
    }

    /// Create a pin that returns `samples` in order, then rests at `rest`.
    pub fn scripted(
        pin: PinNumber,
        samples: impl IntoIterator<Item = Level>,
        rest: Level,
    ) -> (Self, MockInputHandle) {
        let (mut input, handle) = Self::new(pin, rest);
        input.script = samples.into_iter().collect();
        (input, handle)
    }
}

impl InputPin for MockInputPin {
    async fn read(&mut self) -> Result<Level> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(level) = self.script.pop_front() {
            return Ok(level);
        }
        Ok(*self.level_rx.borrow())
    }

    fn info(&self) -> PinInfo {
        PinInfo::new(self.pin, Direction::Input, "mock")
    }
}

/// Handle for driving a mock input.
///
/// Cheap to clone; every clone drives the same pin.
#[derive(Debug, Clone)]
pub struct MockInputHandle {
    level_tx: Arc<watch::Sender<Level>>,
    reads: Arc<AtomicUsize>,
}

impl MockInputHandle {
    /// Move the line to `level`. Scripted samples still take precedence.
    pub fn set_level(&self, level: Level) {
        self.level_tx.send_replace(level);
    }

    /// Current resting level.
    pub fn level(&self) -> Level {
        *self.level_tx.borrow()
    }

    /// Number of samples taken so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// One recorded output write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub pin: PinNumber,
    pub level: Level,
    pub at: Instant,
}

/// Shared, ordered log of output writes.
#[derive(Debug, Clone, Default)]
pub struct PinRecorder {
    events: Arc<Mutex<Vec<PinEvent>>>,
}

impl PinRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PinEvent>> {
        // A poisoned log is still a valid log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, pin: PinNumber, level: Level) {
        self.lock().push(PinEvent {
            pin,
            level,
            at: Instant::now(),
        });
    }

    /// Every write so far, oldest first.
    pub fn events(&self) -> Vec<PinEvent> {
        self.lock().clone()
    }

    /// Writes to `pin`, oldest first.
    pub fn events_for(&self, pin: PinNumber) -> Vec<PinEvent> {
        self.lock().iter().filter(|e| e.pin == pin).copied().collect()
    }

    /// Last level written to `pin`, `Level::Low` if never written.
    pub fn level_of(&self, pin: PinNumber) -> Level {
        self.lock()
            .iter()
            .rev()
            .find(|e| e.pin == pin)
            .map(|e| e.level)
            .unwrap_or_default()
    }

    /// Forget recorded writes.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Mock digital output.
///
/// # Examples
///
/// ```
/// use facegate_core::PinNumber;
/// use facegate_hardware::mock::{MockOutputPin, PinRecorder};
/// use facegate_hardware::traits::OutputPin;
/// use facegate_hardware::types::Level;
///
/// #[tokio::main]
/// async fn main() -> facegate_hardware::Result<()> {
///     let recorder = PinRecorder::new();
///     let pin = PinNumber::new(12).unwrap();
///     let mut lock = MockOutputPin::new(pin, &recorder);
///
///     lock.write(Level::High).await?;
///     assert_eq!(recorder.level_of(pin), Level::High);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockOutputPin {
    pin: PinNumber,
    level: Level,
    recorder: PinRecorder,
    failing: bool,
}

impl MockOutputPin {
    /// Create an output that logs into `recorder`.
    pub fn new(pin: PinNumber, recorder: &PinRecorder) -> Self {
        Self {
            pin,
            level: Level::Low,
            recorder: recorder.clone(),
            failing: false,
        }
    }

    /// Create an output whose writes always fail.
    pub fn failing(pin: PinNumber, recorder: &PinRecorder) -> Self {
        Self {
            failing: true,
            ..Self::new(pin, recorder)
        }
    }
}

impl OutputPin for MockOutputPin {
    async fn write(&mut self, level: Level) -> Result<()> {
        if self.failing {
            return Err(HardwareError::unavailable(self.pin.to_string()));
        }
        self.level = level;
        self.recorder.record(self.pin, level);
        Ok(())
    }

    fn level(&self) -> Level {
        self.level
    }

    fn info(&self) -> PinInfo {
        PinInfo::new(self.pin, Direction::Output, "mock")
    }
}
