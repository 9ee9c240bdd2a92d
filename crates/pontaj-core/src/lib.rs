//! Shared domain types for the pontaj device-sync bridge.
//!
//! Everything here is a plain value type: the employee/device records as the
//! backend delivers them, and the [`SyncOutcome`] produced by every device
//! operation and consumed by orchestration and aggregation.

pub mod outcome;
pub mod types;

pub use outcome::{OutcomeKind, SyncOutcome, SyncStep};
pub use types::{BiometricProfile, Device, Employee};
