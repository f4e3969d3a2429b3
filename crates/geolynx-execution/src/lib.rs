//! ---
//! glx_section: "06-execution-tracking"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Execution tracking: assignment cache, state machine, activity control."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
//! Field-operation execution tracking.
//!
//! The [`ExecutionAssignmentStore`] is a read-through cache of the operator's
//! execution sheets; the lifecycle module is the pure state machine for one
//! (polygon, operation) pair; the [`ActivityLifecycleController`] issues
//! start/stop commands, guarded against double submission, and refreshes the
//! cache from the authoritative backend afterwards.

#![warn(missing_docs)]

pub mod controller;
pub mod lifecycle;
pub mod store;

use geolynx_model::OperationKey;

/// Shared result type for execution tracking operations.
pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Errors surfaced by execution tracking.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    /// Assignment fetch failed; the cached sheets are retained.
    /// Transient: pull-to-refresh retries.
    #[error("assignment fetch failed: {0}")]
    FetchFailed(String),
    /// No cached record matches the requested identifiers.
    #[error("no record found for {0}")]
    NotFound(String),
    /// A start/stop command for this operation is already in flight.
    /// Transient: the caller should wait for the outstanding command.
    #[error("a command for operation {0} is already in flight")]
    OperationBusy(OperationKey),
    /// Local state forbids the transition; detected before any network call.
    #[error(transparent)]
    Transition(#[from] lifecycle::TransitionError),
    /// The backend rejected the command; local state was not mutated.
    #[error("backend rejected command for {key}: {message}")]
    CommandRejected {
        /// Operation the command addressed.
        key: OperationKey,
        /// Backend-supplied message.
        message: String,
    },
}

pub use controller::ActivityLifecycleController;
pub use lifecycle::TransitionError;
pub use store::ExecutionAssignmentStore;
