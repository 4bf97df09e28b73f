//! Common test utilities for controller integration tests.
//!
//! [`Rig`] wires an [`AccessController`] to mock pins, a mock camera, a mock
//! link and a mock transport, and keeps handles to all of them so a test can
//! press the trigger and inspect every output write against virtual time.
//!
//! All helpers expect a runtime with paused time.

#![allow(dead_code)]

use std::time::Duration;

use facegate_controller::{AccessController, CycleReport};
use facegate_core::{DeviceConfig, PinNumber};
use facegate_hardware::PeripheralInterface;
use facegate_hardware::mock::{
    MockCamera, MockInputHandle, MockInputPin, MockOutputPin, PinEvent, PinRecorder,
};
use facegate_hardware::types::Level;
use facegate_network::mock::{MockLink, MockLinkHandle, MockReply, MockTransport};
use facegate_network::{ConnectivityManager, RecognitionClient};
use tokio::time::sleep;

pub const ALICE: &str = r#"{"success": true, "name": "alice", "confidence": 0.97}"#;
pub const UNKNOWN: &str = r#"{"success": false, "message": "Face not recognized"}"#;

pub type MockController =
    AccessController<MockInputPin, MockOutputPin, MockCamera, MockLink, MockTransport>;

/// Controller plus handles onto every mock it drives.
pub struct Rig {
    pub controller: MockController,
    pub trigger: MockInputHandle,
    pub recorder: PinRecorder,
    pub transport: MockTransport,
    pub link: MockLinkHandle,
    pub config: DeviceConfig,
}

impl Rig {
    /// Initialized controller on a link that is up immediately, answering
    /// every request with `reply`.
    pub async fn connected(reply: MockReply) -> Self {
        Self::new(MockLink::up_after(0), MockTransport::always(reply)).await
    }

    pub async fn new(link: MockLink, transport: MockTransport) -> Self {
        Self::with_config(DeviceConfig::default(), link, transport).await
    }

    pub async fn with_config(config: DeviceConfig, link: MockLink, transport: MockTransport) -> Self {
        let recorder = PinRecorder::new();
        let (trigger_pin, trigger) = MockInputPin::new(config.pins.trigger, Level::High);
        let peripherals = PeripheralInterface::new(
            trigger_pin,
            MockOutputPin::new(config.pins.lock, &recorder),
            MockOutputPin::new(config.pins.success_led, &recorder),
            MockOutputPin::new(config.pins.failure_led, &recorder),
            config.timing.debounce,
        );

        let link_handle = link.handle();
        let network = ConnectivityManager::new(link, &config.network);
        let client = RecognitionClient::new(transport.clone(), &config.service);

        let mut controller =
            AccessController::new(peripherals, MockCamera::new(), network, client, &config);
        controller.initialize().await;

        Self {
            controller,
            trigger,
            recorder,
            transport,
            link: link_handle,
            config,
        }
    }

    /// Press the trigger (active-low), keep it held for `hold`, release it,
    /// and poll the controller once while that happens.
    pub async fn press(&mut self, hold: Duration) -> Option<CycleReport> {
        self.trigger.set_level(Level::Low);
        let trigger = self.trigger.clone();
        let (report, ()) = tokio::join!(self.controller.poll_once(), async move {
            sleep(hold).await;
            trigger.set_level(Level::High);
        });
        report
    }

    pub fn lock_pin(&self) -> PinNumber {
        self.config.pins.lock
    }

    pub fn success_pin(&self) -> PinNumber {
        self.config.pins.success_led
    }

    pub fn failure_pin(&self) -> PinNumber {
        self.config.pins.failure_led
    }

    /// Durations `pin` spent HIGH, from all writes so far.
    pub fn high_windows(&self, pin: PinNumber) -> Vec<Duration> {
        high_windows(&self.recorder.events(), pin)
    }

    /// Every output LOW and the controller idle and locked.
    pub fn assert_at_rest(&self) {
        assert_eq!(self.recorder.level_of(self.lock_pin()), Level::Low);
        assert_eq!(self.recorder.level_of(self.success_pin()), Level::Low);
        assert_eq!(self.recorder.level_of(self.failure_pin()), Level::Low);
        assert_eq!(self.controller.lock_state(), facegate_core::LockState::Locked);
        assert_eq!(
            self.controller.state(),
            facegate_controller::AccessState::Idle
        );
    }

    /// Replay every write and check the indicators were never lit together.
    pub fn assert_indicators_exclusive(&self) {
        assert_indicators_exclusive(
            &self.recorder.events(),
            self.success_pin(),
            self.failure_pin(),
        );
    }
}

/// Durations `pin` spent HIGH within `events`. A window still open at the end
/// of `events` is not counted.
pub fn high_windows(events: &[PinEvent], pin: PinNumber) -> Vec<Duration> {
    let mut windows = Vec::new();
    let mut raised = None;
    for event in events.iter().filter(|e| e.pin == pin) {
        match (event.level, raised) {
            (Level::High, None) => raised = Some(event.at),
            (Level::Low, Some(start)) => {
                windows.push(event.at - start);
                raised = None;
            }
            _ => {}
        }
    }
    windows
}

pub fn assert_indicators_exclusive(events: &[PinEvent], success: PinNumber, failure: PinNumber) {
    let (mut success_on, mut failure_on) = (false, false);
    for event in events {
        if event.pin == success {
            success_on = event.level.is_high();
        } else if event.pin == failure {
            failure_on = event.level.is_high();
        }
        assert!(
            !(success_on && failure_on),
            "both indicators lit after {event:?}"
        );
    }
}
