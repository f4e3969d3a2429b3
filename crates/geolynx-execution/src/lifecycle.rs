//! ---
//! glx_section: "06-execution-tracking"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Execution tracking: assignment cache, state machine, activity control."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
//! Pure state-transition rules for one (polygon, operation) pair.
//!
//! The chain is `unassigned -> assigned -> ongoing -> completed`, with
//! `ongoing -> assigned` only through an explicit stop. Assignment is merged
//! into the first start, matching the backend command surface. The client
//! never computes a post-command status itself: commands are validated here,
//! and the resulting status is always read back from the refreshed
//! authoritative record.

use geolynx_model::OperationStatus;

/// Local-state violations detected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Start requested while activity is already running.
    #[error("activity is already ongoing")]
    AlreadyOngoing,
    /// Stop requested while no activity is running.
    #[error("no ongoing activity (status is {0})")]
    NotOngoing(OperationStatus),
    /// Any command on a completed operation. Completed is terminal.
    #[error("operation is completed; no further transitions are permitted")]
    TerminalState,
}

/// Validate a start command against the cached status.
///
/// Start succeeds from `unassigned` (assign+start merged) and `assigned`.
pub fn validate_start(status: OperationStatus) -> Result<(), TransitionError> {
    match status {
        OperationStatus::Unassigned | OperationStatus::Assigned => Ok(()),
        OperationStatus::Ongoing => Err(TransitionError::AlreadyOngoing),
        OperationStatus::Completed => Err(TransitionError::TerminalState),
    }
}

/// Validate a stop command against the cached status.
///
/// Whether the stop lands on `assigned` or `completed` is the backend's
/// decision, reflected by the refresh that follows the command.
pub fn validate_stop(status: OperationStatus) -> Result<(), TransitionError> {
    match status {
        OperationStatus::Ongoing => Ok(()),
        OperationStatus::Completed => Err(TransitionError::TerminalState),
        other => Err(TransitionError::NotOngoing(other)),
    }
}
