//! Outcome model for device sync operations.
//!
//! Every operation against a terminal resolves to exactly one
//! [`SyncOutcome`]. Outcomes are created once by classification logic and
//! never revised afterwards; drivers only aggregate them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a single sync operation ended.
///
/// - `Success`: the goal state holds, including the idempotent case where it
///   already held before the call.
/// - `Partial`: the primary step succeeded but a secondary step failed, or a
///   secondary step failed in a way that must not stop the batch.
/// - `Skipped`: a precondition was missing; no device call was made.
/// - `Fatal`: auth failure, unreachable device, or an unparseable success
///   response; processing for the current (employee, device) pair stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Partial,
    Skipped,
    Fatal,
}

impl OutcomeKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Partial => "partial",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Fatal => "fatal",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which operation produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Person,
    Photo,
    Delete,
    Validation,
    Complete,
}

impl SyncStep {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStep::Person => "person",
            SyncStep::Photo => "photo",
            SyncStep::Delete => "delete",
            SyncStep::Validation => "validation",
            SyncStep::Complete => "complete",
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal result of one sync operation.
///
/// The message preserves vendor status codes and strings verbatim so a
/// failed batch can be diagnosed from the aggregated report alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    #[serde(rename = "status")]
    pub kind: OutcomeKind,
    pub message: String,
    pub step: SyncStep,
}

impl SyncOutcome {
    #[must_use]
    pub fn new(kind: OutcomeKind, message: impl Into<String>, step: SyncStep) -> Self {
        Self {
            kind,
            message: message.into(),
            step,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>, step: SyncStep) -> Self {
        Self::new(OutcomeKind::Success, message, step)
    }

    #[must_use]
    pub fn partial(message: impl Into<String>, step: SyncStep) -> Self {
        Self::new(OutcomeKind::Partial, message, step)
    }

    #[must_use]
    pub fn skipped(message: impl Into<String>, step: SyncStep) -> Self {
        Self::new(OutcomeKind::Skipped, message, step)
    }

    #[must_use]
    pub fn fatal(message: impl Into<String>, step: SyncStep) -> Self {
        Self::new(OutcomeKind::Fatal, message, step)
    }

    /// Whether this is the idempotent "record already on device" success.
    ///
    /// The classifier encodes idempotence only in the message text, so the
    /// probe lives here, next to the messages it matches against.
    #[must_use]
    pub fn already_existed(&self) -> bool {
        self.kind == OutcomeKind::Success && self.message.to_lowercase().contains("already exist")
    }
}
