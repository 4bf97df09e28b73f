//! Access control loop for the facegate door unit.
//!
//! This crate contains the access state machine and the controller that
//! drives it: trigger → capture → recognition → actuation → indicators →
//! re-arm. Everything runs on one task; cycles are strictly serialized.

pub mod controller;
pub mod report;
pub mod state_machine;

pub use controller::AccessController;
pub use report::{AccessOutcome, CycleReport, DenialReason};
pub use state_machine::{AccessState, MAX_HISTORY_SIZE, StateMachine, StateTransition};
