//! Dialogue state machine and driver for the member assistant
//!
//! The split follows one rule: the machine ([`DialogueMachine`]) is a
//! synchronous reducer (state in, event in, effects out) and everything
//! that suspends (classifier calls, slot hints) or touches shared state
//! (the record store, the appointment log) lives in the [`Assistant`]
//! driver wrapped around it.

pub mod assistant;
pub mod machine;
pub mod otp;

pub use assistant::Assistant;
pub use machine::{DialogueEvent, DialogueMachine, MachineConfig};
