//! Attendance session lifecycle engine.
//!
//! - [`lifecycle`]: pure state machine for a single session.
//! - [`maintenance`]: one bulk pass over every session that may need to move.
//! - [`trigger`]: debounce gate deciding whether a pass runs now.
//! - [`scheduler`]: background loop driving the trigger.
//! - [`keys`]: second-phase key issuance and verification.

pub mod error;
pub mod keys;
pub mod lifecycle;
pub mod maintenance;
pub mod scheduler;
pub mod trigger;
