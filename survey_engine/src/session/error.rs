use super::PhaseState;
use crate::answers::QuestionId;
use crate::logging::codes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {action} while the phase is {state}")]
    InvalidTransition {
        state: PhaseState,
        action: &'static str,
    },

    #[error("Section '{identification}' must be completed before '{requested}'")]
    IdentificationPending {
        identification: String,
        requested: String,
    },

    #[error("Section '{section}' is not a selectable phase")]
    UnknownSection { section: String },

    #[error("Question {id} does not belong to section '{section}'")]
    QuestionOutsideSection { id: QuestionId, section: String },
}

impl SessionError {
    pub fn invalid_transition(state: PhaseState, action: &'static str) -> Self {
        Self::InvalidTransition { state, action }
    }

    pub fn unknown_section(section: &str) -> Self {
        Self::UnknownSection {
            section: section.trim().to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::InvalidTransition { .. } => codes::session::INVALID_TRANSITION,
            Self::IdentificationPending { .. } => codes::session::IDENTIFICATION_PENDING,
            Self::UnknownSection { .. } => codes::session::UNKNOWN_SECTION,
            Self::QuestionOutsideSection { .. } => codes::session::QUESTION_OUTSIDE_SECTION,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
