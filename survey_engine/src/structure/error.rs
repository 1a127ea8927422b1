//! Form structure loading errors

use crate::answers::QuestionId;
use crate::logging::{codes, Code};

pub type StructureResult<T> = Result<T, StructureError>;

#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("Duplicate question id {id} (sections '{first_section}' and '{second_section}')")]
    DuplicateQuestionId {
        id: QuestionId,
        first_section: String,
        second_section: String,
    },

    #[error("Question {id} has no section name")]
    BlankSection { id: QuestionId },

    #[error("Section '{section}' has {count} questions, limit is {limit}")]
    SectionTooLarge {
        section: String,
        count: usize,
        limit: usize,
    },

    #[error("Invalid question structure data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

impl StructureError {
    pub fn duplicate_question_id(id: QuestionId, first: &str, second: &str) -> Self {
        Self::DuplicateQuestionId {
            id,
            first_section: first.to_string(),
            second_section: second.to_string(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::DuplicateQuestionId { .. } => codes::structure::DUPLICATE_QUESTION_ID,
            Self::BlankSection { .. } => codes::structure::BLANK_SECTION,
            Self::SectionTooLarge { .. } => codes::structure::SECTION_TOO_LARGE,
            Self::InvalidData(_) => codes::structure::INVALID_STRUCTURE_DATA,
        }
    }
}
