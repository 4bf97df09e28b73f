//! Access controller.
//!
//! [`AccessController`] is the single task that owns the door: it polls the
//! trigger, runs one access cycle per debounced press, and is the only writer
//! of the lock, the indicators and the connectivity state.
//!
//! One cycle:
//!
//! 1. `Idle → Capturing`: take an image from the provider (may be empty).
//! 2. `Capturing → Authenticating`: one recognition exchange. Any error is a
//!    denial.
//! 3. `Authenticating → Unlocked`: failure off, success on, unlock, hold,
//!    lock, success off.
//!    `Authenticating → Denied`: success off, failure on, hold, failure off.
//! 4. Wait for the trigger to be released, then `→ Idle`.
//!
//! Cycles are never cancelled. A shutdown request is only honored while idle.

use chrono::Utc;
use facegate_core::{
    ConnectivityState, Credentials, DeviceConfig, Error, Indicator, LockState, Result, TimingConfig,
};
use facegate_hardware::{ImageProvider, InputPin, OutputPin, PeripheralInterface};
use facegate_network::{ConnectivityManager, HttpTransport, NetworkLink, RecognitionClient};
use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::report::{AccessOutcome, CycleReport, DenialReason};
use crate::state_machine::{AccessState, StateMachine};

/// Door access loop.
///
/// Generic over the trigger pin `I`, the output pins `O`, the image
/// provider `C`, the network link `L` and the HTTP transport `T`.
#[derive(Debug)]
pub struct AccessController<I, O, C, L, T> {
    peripherals: PeripheralInterface<I, O>,
    camera: C,
    network: ConnectivityManager<L>,
    client: RecognitionClient<T>,
    credentials: Credentials,
    timing: TimingConfig,
    machine: StateMachine,
    cycles: u64,
    last_report: Option<CycleReport>,
}

impl<I, O, C, L, T> AccessController<I, O, C, L, T>
where
    I: InputPin,
    O: OutputPin,
    C: ImageProvider,
    L: NetworkLink,
    T: HttpTransport,
{
    /// Assemble the controller. Nothing is driven until
    /// [`initialize`](Self::initialize).
    pub fn new(
        peripherals: PeripheralInterface<I, O>,
        camera: C,
        network: ConnectivityManager<L>,
        client: RecognitionClient<T>,
        config: &DeviceConfig,
    ) -> Self {
        Self {
            peripherals,
            camera,
            network,
            client,
            credentials: config.network.credentials.clone(),
            timing: config.timing.clone(),
            machine: StateMachine::new(),
            cycles: 0,
            last_report: None,
        }
    }

    /// Drive outputs to the safe state, then connect once.
    ///
    /// A failed connect is logged and returned; the controller still runs and
    /// every recognition attempt fails fast until [`reconnect`](Self::reconnect)
    /// succeeds.
    pub async fn initialize(&mut self) -> ConnectivityState {
        self.peripherals.safe_state().await;
        self.machine.reset();
        info!(
            lock = %self.peripherals.lock_state(),
            camera = self.camera.name(),
            "Outputs in safe state"
        );

        let state = self.network.connect(&self.credentials).await;
        if state != ConnectivityState::Connected {
            warn!("Starting without network; recognition will be denied until reconnect");
        }
        state
    }

    /// Re-run `connect` with the configured credentials.
    pub async fn reconnect(&mut self) -> ConnectivityState {
        self.network.connect(&self.credentials).await
    }

    /// Check the trigger once; run a full cycle if it is pressed.
    pub async fn poll_once(&mut self) -> Option<CycleReport> {
        if !self.peripherals.read_trigger().await {
            return None;
        }
        Some(self.run_cycle().await)
    }

    /// Run one access cycle unconditionally.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let id = Uuid::new_v4();
        let span = info_span!("cycle", cycle_id = %id);
        async move {
            let started_at = Utc::now();
            let start = Instant::now();
            let mut path = vec![self.machine.current_state()];
            let mut image_bytes = 0;

            info!("Trigger pressed, starting access cycle");
            let outcome = match self.cycle(&mut path, &mut image_bytes).await {
                Ok(outcome) => outcome,
                Err(e) => self.fail_closed(e, &mut path).await,
            };

            self.cycles += 1;
            let report = CycleReport {
                id,
                started_at,
                outcome,
                path,
                image_bytes,
                elapsed: start.elapsed(),
            };
            info!(
                outcome = %report.outcome,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Access cycle complete"
            );
            self.last_report = Some(report.clone());
            report
        }
        .instrument(span)
        .await
    }

    async fn cycle(
        &mut self,
        path: &mut Vec<AccessState>,
        image_bytes: &mut usize,
    ) -> Result<AccessOutcome> {
        self.advance(AccessState::Capturing, path)?;
        let image = self.camera.capture().await;
        *image_bytes = image.len();
        debug!(provider = self.camera.name(), bytes = image.len(), "Image captured");

        self.advance(AccessState::Authenticating, path)?;
        self.network.refresh().await;
        let verdict = self.client.recognize(&self.network, &image).await;
        let outcome = AccessOutcome::from_recognition(verdict);

        if outcome.is_granted() {
            self.advance(AccessState::Unlocked, path)?;
            self.grant().await;
        } else {
            self.advance(AccessState::Denied, path)?;
            self.deny().await;
        }

        self.await_release().await;
        self.advance(AccessState::Idle, path)?;
        Ok(outcome)
    }

    fn advance(&mut self, state: AccessState, path: &mut Vec<AccessState>) -> Result<()> {
        let transition = self.machine.transition_to(state)?;
        debug!(from = %transition.from, to = %transition.to, "State transition");
        path.push(state);
        Ok(())
    }

    async fn grant(&mut self) {
        self.light(Indicator::Success).await;
        self.peripherals.set_lock(LockState::Unlocked).await;
        info!(
            hold_ms = self.timing.unlock_duration.as_millis() as u64,
            "Access granted, door unlocked"
        );

        sleep(self.timing.unlock_duration).await;

        self.peripherals.set_lock(LockState::Locked).await;
        self.peripherals.set_indicator(Indicator::Success, false).await;
        info!("Door locked");
    }

    async fn deny(&mut self) {
        self.light(Indicator::Failure).await;
        info!(
            hold_ms = self.timing.denial_duration.as_millis() as u64,
            "Access denied"
        );

        sleep(self.timing.denial_duration).await;

        self.peripherals.set_indicator(Indicator::Failure, false).await;
    }

    /// Light `channel`, switching the opposite one off first so the two are
    /// never lit together.
    async fn light(&mut self, channel: Indicator) {
        self.peripherals.set_indicator(channel.other(), false).await;
        self.peripherals.set_indicator(channel, true).await;
    }

    async fn await_release(&mut self) {
        if !self.peripherals.trigger_asserted().await {
            return;
        }
        debug!("Waiting for trigger release");
        let start = Instant::now();
        while self.peripherals.trigger_asserted().await {
            sleep(self.timing.release_poll).await;
        }
        debug!(
            held_ms = start.elapsed().as_millis() as u64,
            "Trigger released"
        );
    }

    async fn fail_closed(
        &mut self,
        e: Error,
        path: &mut Vec<AccessState>,
    ) -> AccessOutcome {
        let state = self.machine.current_state();
        error!(error = %e, %state, "Access cycle fault, locking");
        self.peripherals.safe_state().await;
        // From a verdict state the release wait has already run.
        if !state.is_verdict() {
            self.await_release().await;
        }
        if self.machine.reset().is_some() {
            path.push(AccessState::Idle);
        }
        AccessOutcome::Denied(DenialReason::Fault {
            detail: e.to_string(),
        })
    }

    /// Poll the trigger until `shutdown` reads `true` or its sender is
    /// dropped. Returns the number of cycles run.
    ///
    /// The shutdown signal is only observed between cycles. On exit the
    /// outputs are driven to the safe state and the link is released.
    pub async fn run_until(&mut self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let first = self.cycles;
        info!(
            poll_ms = self.timing.poll_interval.as_millis() as u64,
            "Access loop started"
        );

        while !*shutdown.borrow_and_update() {
            self.poll_once().await;

            tokio::select! {
                () = sleep(self.timing.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("Shutdown sender dropped");
                        break;
                    }
                }
            }
        }

        let ran = self.cycles - first;
        info!(cycles = ran, "Access loop stopping");
        self.shutdown().await;
        ran
    }

    /// Poll the trigger forever.
    pub async fn run(&mut self) {
        let (_keep, shutdown) = watch::channel(false);
        self.run_until(shutdown).await;
    }

    /// Lock, switch the indicators off and release the link.
    pub async fn shutdown(&mut self) {
        self.peripherals.safe_state().await;
        self.network.disconnect().await;
    }

    pub fn state(&self) -> AccessState {
        self.machine.current_state()
    }

    pub fn lock_state(&self) -> LockState {
        self.peripherals.lock_state()
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn peripherals(&self) -> &PeripheralInterface<I, O> {
        &self.peripherals
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn network(&self) -> &ConnectivityManager<L> {
        &self.network
    }

    pub fn client(&self) -> &RecognitionClient<T> {
        &self.client
    }

    /// Cycles completed since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }
}
