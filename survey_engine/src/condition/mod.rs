//! Visibility decisions for conditional questions
//!
//! Structurally empty or unusable conditions show the question; failures
//! while evaluating a well-formed condition hide it. Neither case panics or
//! propagates to the caller of [`evaluate_condition`].

pub mod error;
pub mod expression;
pub mod term;

pub use error::{ConditionError, ConditionResult};

use crate::answers::AnswerMap;
use crate::logging::codes;
use crate::project::ProjectContext;
use crate::structure::Question;
use crate::syntax::{parse_condition, ParsedCondition, Term, UnconditionalReason};
use crate::{log_debug, log_warning};

/// Lookups a condition is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    /// Union of collected and in-progress answers
    pub answers: &'a AnswerMap,
    pub project: &'a ProjectContext,
    pub log_decisions: bool,
}

impl<'a> ConditionContext<'a> {
    pub fn new(answers: &'a AnswerMap, project: &'a ProjectContext) -> Self {
        Self {
            answers,
            project,
            log_decisions: false,
        }
    }

    /// Emit a debug event for every visibility decision
    pub fn with_decision_logging(mut self, enabled: bool) -> Self {
        self.log_decisions = enabled;
        self
    }
}

/// Detailed outcome of a visibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Conditions are switched off for the question
    AlwaysShown,
    Unconditional(UnconditionalReason),
    Satisfied,
    Unsatisfied,
    Failed(ConditionError),
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            Self::AlwaysShown | Self::Unconditional(_) | Self::Satisfied
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlwaysShown => "always_shown",
            Self::Unconditional(UnconditionalReason::Empty) => "empty_condition",
            Self::Unconditional(UnconditionalReason::NoValidTerms) => "no_valid_terms",
            Self::Satisfied => "satisfied",
            Self::Unsatisfied => "unsatisfied",
            Self::Failed(_) => "failed",
        }
    }
}

/// Parse and evaluate a raw condition string
pub fn assess_condition(raw: &str, ctx: &ConditionContext<'_>) -> Visibility {
    let outcome = match parse_condition(raw) {
        Err(limit) => Visibility::Failed(limit.into()),
        Ok(ParsedCondition::Unconditional(reason)) => {
            if reason == UnconditionalReason::NoValidTerms {
                log_warning!(code = codes::condition::NO_VALID_TERMS,
                    "Condition has no valid terms; question shown",
                    "condition" => raw
                );
            }
            Visibility::Unconditional(reason)
        }
        Ok(ParsedCondition::Expression(expr)) => {
            for term in expr.terms() {
                if let Term::Malformed { text, reason, span } = term {
                    log_warning!(code = codes::condition::MALFORMED_TERM,
                        "Malformed condition term evaluates false",
                        "term" => text,
                        "reason" => reason,
                        "at" => span
                    );
                }
            }
            match expr.evaluate(ctx) {
                Ok(true) => Visibility::Satisfied,
                Ok(false) => Visibility::Unsatisfied,
                Err(error) => Visibility::Failed(error),
            }
        }
    };

    if let Visibility::Failed(error) = &outcome {
        log_warning!(code = codes::condition::EVALUATION_FAILED,
            "Condition evaluation failed; question hidden",
            "condition" => raw,
            "cause" => error.error_code(),
            "error" => error
        );
    }

    if ctx.log_decisions {
        log_debug!("Visibility decided",
            "condition" => raw,
            "outcome" => outcome.as_str()
        );
    }

    outcome
}

/// Whether a question guarded by `raw` is shown
pub fn evaluate_condition(raw: &str, ctx: &ConditionContext<'_>) -> bool {
    assess_condition(raw, ctx).is_visible()
}

/// Visibility of a question, honouring its condition switch
pub fn question_visibility(question: &Question, ctx: &ConditionContext<'_>) -> Visibility {
    if !question.condition_on {
        return Visibility::AlwaysShown;
    }
    assess_condition(&question.condition_expression, ctx)
}

pub fn question_is_visible(question: &Question, ctx: &ConditionContext<'_>) -> bool {
    question_visibility(question, ctx).is_visible()
}
