use ulid::Ulid;

use crate::model::{InvalidTransition, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Caller input rejected before any resolution logic runs.
    Validation {
        field: &'static str,
        message: String,
    },
    UnknownTherapist(Ulid),
    UnknownServiceOption(Ulid),
    Transition(InvalidTransition),
    /// Candidate booking collides with an existing allocation.
    Conflict(Ulid),
    /// All concurrent slots for the time range are taken.
    CapacityExceeded(u32),
    /// Candidate booking falls outside resolved availability.
    OutsideAvailability(Span),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation { field, message } => {
                write!(f, "invalid {field}: {message}")
            }
            EngineError::UnknownTherapist(id) => write!(f, "unknown therapist: {id}"),
            EngineError::UnknownServiceOption(id) => {
                write!(f, "unknown service option: {id}")
            }
            EngineError::Transition(t) => write!(f, "{t}"),
            EngineError::Conflict(id) => write!(f, "conflict with booking: {id}"),
            EngineError::CapacityExceeded(cap) => {
                write!(f, "capacity {cap} exceeded: all slots occupied")
            }
            EngineError::OutsideAvailability(span) => {
                write!(
                    f,
                    "requested time [{}, {}) is outside availability",
                    span.start, span.end
                )
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<InvalidTransition> for EngineError {
    fn from(t: InvalidTransition) -> Self {
        EngineError::Transition(t)
    }
}
