//! Access cycle state machine.
//!
//! This module tracks where the door unit is in one access cycle, from the
//! idle poll through capture and recognition to the unlock or denial hold.
//!
//! # States
//!
//! - `Idle`: Polling the trigger
//! - `Capturing`: Acquiring an image from the provider
//! - `Authenticating`: Waiting on the recognition service
//! - `Unlocked`: Lock open, success indicator lit
//! - `Denied`: Lock closed, failure indicator lit
//!
//! # Valid Transitions
//!
//! - Idle → Capturing → Authenticating → Unlocked/Denied
//! - Unlocked → Idle
//! - Denied → Idle
//!
//! # Examples
//!
//! ```
//! use facegate_controller::{AccessState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), AccessState::Idle);
//!
//! machine.transition_to(AccessState::Capturing).unwrap();
//! assert!(machine.transition_to(AccessState::Unlocked).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use facegate_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Maximum number of state transitions to keep in history.
///
/// One cycle is four transitions, so this covers the last 25 cycles.
pub const MAX_HISTORY_SIZE: usize = 100;

/// Phase of the access cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// Polling the trigger.
    #[default]
    Idle,

    /// Acquiring an image.
    Capturing,

    /// Recognition exchange in flight.
    Authenticating,

    /// Lock open for the unlock duration.
    Unlocked,

    /// Failure indicator lit for the denial duration.
    Denied,
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AccessState::Idle => "Idle",
            AccessState::Capturing => "Capturing",
            AccessState::Authenticating => "Authenticating",
            AccessState::Unlocked => "Unlocked",
            AccessState::Denied => "Denied",
        };
        write!(f, "{}", state_str)
    }
}

impl AccessState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_controller::AccessState;
    ///
    /// assert!(AccessState::Idle.can_transition_to(&AccessState::Capturing));
    /// assert!(!AccessState::Idle.can_transition_to(&AccessState::Unlocked));
    /// ```
    pub fn can_transition_to(&self, target: &AccessState) -> bool {
        matches!(
            (self, target),
            (AccessState::Idle, AccessState::Capturing)
                | (AccessState::Capturing, AccessState::Authenticating)
                | (
                    AccessState::Authenticating,
                    AccessState::Unlocked | AccessState::Denied
                )
                | (AccessState::Unlocked, AccessState::Idle)
                | (AccessState::Denied, AccessState::Idle)
        )
    }

    /// Whether this state ends a cycle with a verdict.
    pub fn is_verdict(&self) -> bool {
        matches!(self, AccessState::Unlocked | AccessState::Denied)
    }
}

/// A single state transition with timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: AccessState,
    pub to: AccessState,

    /// When the transition occurred (runtime clock).
    pub at: Instant,
}

impl StateTransition {
    pub fn new(from: AccessState, to: AccessState) -> Self {
        Self {
            from,
            to,
            at: Instant::now(),
        }
    }
}

/// Validated state machine with bounded history.
///
/// The machine has a single owner (the access controller); it is not shared
/// across tasks.
#[derive(Debug)]
pub struct StateMachine {
    current_state: AccessState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self {
            current_state: AccessState::Idle,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> AccessState {
        self.current_state
    }

    pub fn is_idle(&self) -> bool {
        self.current_state == AccessState::Idle
    }

    /// Time elapsed in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).copied().collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the requested transition
    /// is not valid for the current state. The machine is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_controller::{AccessState, StateMachine};
    ///
    /// let mut machine = StateMachine::new();
    ///
    /// let transition = machine.transition_to(AccessState::Capturing).unwrap();
    /// assert_eq!(transition.from, AccessState::Idle);
    /// assert_eq!(transition.to, AccessState::Capturing);
    ///
    /// assert!(machine.transition_to(AccessState::Idle).is_err());
    /// ```
    pub fn transition_to(&mut self, new_state: AccessState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(transition);
        Ok(transition)
    }

    /// Force the machine back to Idle regardless of current state.
    ///
    /// Used for error recovery. Returns `None` if already idle.
    pub fn reset(&mut self) -> Option<StateTransition> {
        if self.is_idle() {
            return None;
        }
        let transition = StateTransition::new(self.current_state, AccessState::Idle);
        self.perform_state_change(transition);
        Some(transition)
    }

    fn perform_state_change(&mut self, transition: StateTransition) {
        self.current_state = transition.to;
        self.state_entered_at = transition.at;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL_STATES: [AccessState; 5] = [
        AccessState::Idle,
        AccessState::Capturing,
        AccessState::Authenticating,
        AccessState::Unlocked,
        AccessState::Denied,
    ];

    #[test]
    fn test_new_machine_starts_idle() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), AccessState::Idle);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_granted_flow() {
        let mut machine = StateMachine::new();
        for state in [
            AccessState::Capturing,
            AccessState::Authenticating,
            AccessState::Unlocked,
            AccessState::Idle,
        ] {
            machine.transition_to(state).unwrap();
        }

        assert!(machine.is_idle());
        assert_eq!(machine.history().len(), 4);
    }

    #[test]
    fn test_denied_flow() {
        let mut machine = StateMachine::new();
        for state in [
            AccessState::Capturing,
            AccessState::Authenticating,
            AccessState::Denied,
            AccessState::Idle,
        ] {
            machine.transition_to(state).unwrap();
        }

        assert!(machine.is_idle());
    }

    #[rstest]
    #[case(AccessState::Idle, false)]
    #[case(AccessState::Capturing, false)]
    #[case(AccessState::Authenticating, false)]
    #[case(AccessState::Unlocked, true)]
    #[case(AccessState::Denied, true)]
    fn test_is_verdict(#[case] state: AccessState, #[case] verdict: bool) {
        assert_eq!(state.is_verdict(), verdict);
    }

    #[rstest]
    #[case::skip_capture(AccessState::Idle, AccessState::Authenticating)]
    #[case::unlock_from_idle(AccessState::Idle, AccessState::Unlocked)]
    #[case::unlock_before_verdict(AccessState::Capturing, AccessState::Unlocked)]
    #[case::abort_capture(AccessState::Capturing, AccessState::Idle)]
    #[case::abort_recognition(AccessState::Authenticating, AccessState::Idle)]
    #[case::flip_verdict(AccessState::Unlocked, AccessState::Denied)]
    #[case::repeat_unlock(AccessState::Unlocked, AccessState::Unlocked)]
    fn test_invalid_transitions(#[case] from: AccessState, #[case] to: AccessState) {
        assert!(!from.can_transition_to(&to));
    }

    #[test]
    fn test_unlocked_reachable_only_from_authenticating() {
        for from in ALL_STATES {
            let allowed = from.can_transition_to(&AccessState::Unlocked);
            assert_eq!(allowed, from == AccessState::Authenticating, "from {from}");
        }
    }

    #[test]
    fn test_invalid_transition_leaves_machine_unchanged() {
        let mut machine = StateMachine::new();

        let err = machine.transition_to(AccessState::Unlocked).unwrap_err();

        assert_eq!(
            err,
            Error::InvalidStateTransition {
                from: "Idle".to_string(),
                to: "Unlocked".to_string(),
            }
        );
        assert_eq!(machine.current_state(), AccessState::Idle);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut machine = StateMachine::new();
        machine.transition_to(AccessState::Capturing).unwrap();
        machine.transition_to(AccessState::Authenticating).unwrap();

        let transition = machine.reset().unwrap();

        assert_eq!(transition.from, AccessState::Authenticating);
        assert!(machine.is_idle());
        assert!(machine.reset().is_none());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = StateMachine::new();
        for _ in 0..40 {
            machine.transition_to(AccessState::Capturing).unwrap();
            machine.transition_to(AccessState::Authenticating).unwrap();
            machine.transition_to(AccessState::Denied).unwrap();
            machine.transition_to(AccessState::Idle).unwrap();
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        let last = machine.last_transitions(2);
        assert_eq!(last[0].to, AccessState::Denied);
        assert_eq!(last[1].to, AccessState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_in_current_state() {
        let mut machine = StateMachine::new();
        machine.transition_to(AccessState::Capturing).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(machine.time_in_current_state(), Duration::from_millis(300));
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&AccessState::Authenticating).unwrap();
        assert_eq!(json, "\"authenticating\"");
    }
}
