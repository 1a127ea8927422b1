use crate::lexical::LexerError;
use crate::logging::codes;
use crate::syntax::TermKey;

/// Failures while evaluating a condition. The caller hides the question.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error(transparent)]
    Limit(#[from] LexerError),

    #[error("Value of '{key}' cannot be compared: {shape}")]
    UnsupportedValue { key: String, shape: &'static str },
}

impl ConditionError {
    pub fn unsupported_value(key: &TermKey, shape: &'static str) -> Self {
        Self::UnsupportedValue {
            key: key.to_string(),
            shape,
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::Limit(inner) => inner.error_code(),
            Self::UnsupportedValue { .. } => codes::condition::UNSUPPORTED_VALUE,
        }
    }
}

pub type ConditionResult<T> = Result<T, ConditionError>;
