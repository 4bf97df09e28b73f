//! Peripheral interface for the door unit.
//!
//! [`PeripheralInterface`] owns the four lines the controller uses and gives
//! them door-level meaning: a debounced trigger, a lock actuator, and two
//! indicator lights.
//!
//! None of its operations fail from the caller's point of view. A pin error
//! is logged and resolved to the safe reading: a trigger that cannot be read
//! counts as released, and a lock write that fails leaves the recorded lock
//! state unchanged.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use facegate_core::{Indicator, LockState, PinNumber};
//! use facegate_hardware::mock::{MockInputPin, MockOutputPin, PinRecorder};
//! use facegate_hardware::peripherals::PeripheralInterface;
//! use facegate_hardware::types::Level;
//!
//! #[tokio::main]
//! async fn main() {
//!     let recorder = PinRecorder::new();
//!     let pin = |n| PinNumber::new(n).unwrap();
//!     let (trigger, _handle) = MockInputPin::new(pin(13), Level::High);
//!
//!     let mut io = PeripheralInterface::new(
//!         trigger,
//!         MockOutputPin::new(pin(12), &recorder),
//!         MockOutputPin::new(pin(14), &recorder),
//!         MockOutputPin::new(pin(15), &recorder),
//!         Duration::from_millis(50),
//!     );
//!
//!     io.safe_state().await;
//!     assert_eq!(io.lock_state(), LockState::Locked);
//!     assert!(!io.indicator(Indicator::Success));
//!     assert!(!io.read_trigger().await);
//! }
//! ```

use std::time::Duration;

use facegate_core::{Indicator, LockState};
use tracing::{debug, error, trace};

use crate::traits::{InputPin, OutputPin};
use crate::types::{Level, Polarity};

/// Trigger, lock and indicator lines.
#[derive(Debug)]
pub struct PeripheralInterface<I, O> {
    trigger: I,
    lock: O,
    success_led: O,
    failure_led: O,
    polarity: Polarity,
    debounce: Duration,
    lock_state: LockState,
}

impl<I: InputPin, O: OutputPin> PeripheralInterface<I, O> {
    /// Bundle the lines. The trigger is treated as active-low.
    ///
    /// Outputs are not touched here; call [`safe_state`](Self::safe_state)
    /// before entering the control loop.
    pub fn new(trigger: I, lock: O, success_led: O, failure_led: O, debounce: Duration) -> Self {
        Self {
            trigger,
            lock,
            success_led,
            failure_led,
            polarity: Polarity::ActiveLow,
            debounce,
            lock_state: LockState::Locked,
        }
    }

    /// Override the trigger polarity.
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Sample the trigger once, without debouncing.
    ///
    /// Used while waiting for release, where a stray bounce only delays
    /// re-arming by one poll.
    pub async fn trigger_asserted(&mut self) -> bool {
        match self.trigger.read().await {
            Ok(level) => self.polarity.is_asserted(level),
            Err(e) => {
                error!(pin = %self.trigger.info(), error = %e, "Trigger read failed");
                false
            }
        }
    }

    /// Debounced trigger read.
    ///
    /// Returns `true` only when the trigger is asserted now and still asserted
    /// after the debounce delay.
    pub async fn read_trigger(&mut self) -> bool {
        if !self.trigger_asserted().await {
            return false;
        }
        tokio::time::sleep(self.debounce).await;
        let confirmed = self.trigger_asserted().await;
        trace!(confirmed, "Trigger edge sampled");
        confirmed
    }

    /// Drive the lock actuator. Idempotent.
    pub async fn set_lock(&mut self, state: LockState) {
        let level = Level::from(state.output_level());
        match self.lock.write(level).await {
            Ok(()) => {
                debug!(%state, %level, "Lock actuator set");
                self.lock_state = state;
            }
            Err(e) => {
                error!(%state, pin = %self.lock.info(), error = %e, "Lock write failed");
            }
        }
    }

    /// Switch one indicator on or off. Channels are independent.
    pub async fn set_indicator(&mut self, channel: Indicator, on: bool) {
        let pin = match channel {
            Indicator::Success => &mut self.success_led,
            Indicator::Failure => &mut self.failure_led,
        };
        if let Err(e) = pin.write(Level::from(on)).await {
            error!(%channel, on, pin = %pin.info(), error = %e, "Indicator write failed");
        }
    }

    /// Locked, both indicators off.
    pub async fn safe_state(&mut self) {
        self.set_lock(LockState::Locked).await;
        self.set_indicator(Indicator::Success, false).await;
        self.set_indicator(Indicator::Failure, false).await;
    }

    /// Last lock state successfully written.
    pub fn lock_state(&self) -> LockState {
        self.lock_state
    }

    /// Whether an indicator is currently driven on.
    pub fn indicator(&self, channel: Indicator) -> bool {
        match channel {
            Indicator::Success => self.success_led.level().is_high(),
            Indicator::Failure => self.failure_led.level().is_high(),
        }
    }

    /// Configured debounce window.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}
