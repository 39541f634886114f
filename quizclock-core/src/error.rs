// ABOUTME: Error taxonomy for the quiz state machine and its question source.
// ABOUTME: Load failures surface as the Error status, invalid transitions are rejected as no-ops.

use thiserror::Error;

use crate::state::Status;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Fetching or decoding the question list failed.
    #[error("failed to load questions: {0}")]
    LoadFailure(String),
    /// A textual event name that maps to no event.
    #[error("unknown event: {0:?}")]
    UnknownEvent(String),
    /// The event has no defined effect in the current status.
    #[error("event {event} is not valid while {status}")]
    InvalidTransition { status: Status, event: String },
}
