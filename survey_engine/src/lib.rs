//! # Survey Engine
//!
//! Conditional visibility and section validation for phased audit forms.
//!
//! Questions are grouped into sections that are answered one phase at a time.
//! Whether a question is shown depends on a small condition language over
//! earlier answers (`9 = Oui ET 10 <> Non OU 11 = Oui`), and each section is
//! validated atomically before it is appended to the collected phases.

// Internal modules
pub mod answers;
pub mod condition;
pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod project;
pub mod session;
pub mod structure;
pub mod syntax;
pub mod tokens;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use answers::{combine_answers, AnswerMap, AnswerValue, AttachmentRef, CollectedPhase, QuestionId};
pub use condition::{question_is_visible, ConditionContext, Visibility};
pub use project::ProjectContext;
pub use session::{PhaseSession, PhaseState, SessionError, SubmitOutcome};
pub use structure::{FormStructure, NumericKind, Question, QuestionType, StructureError};
pub use validation::{validate_section, MissingField, SectionValidation, ValidatorConfig};

pub mod prelude {
    pub use crate::answers::{combine_answers, AnswerMap, AnswerValue, CollectedPhase};
    pub use crate::condition::{evaluate_condition, question_is_visible, ConditionContext};
    pub use crate::config::runtime::RuntimeConfig;
    pub use crate::project::ProjectContext;
    pub use crate::session::{PhaseSession, SubmitOutcome};
    pub use crate::structure::{FormStructure, Question, QuestionType};
    pub use crate::validation::{
        validate_section, PhotoRule, PhotoRuleSet, SectionValidation, ValidatorConfig,
    };
}
