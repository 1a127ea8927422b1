//! Section validation
//!
//! A section is validated as a whole: every visible mandatory question must
//! be answered and, when a photo rule applies, the photos supplied must match
//! the expected count or be justified in the reserved comment answer.

pub mod photo_rules;

pub use photo_rules::{PhotoRule, PhotoRuleSet};

use crate::answers::{combine_answers, AnswerMap, CollectedPhase, QuestionId};
use crate::condition::{question_is_visible, ConditionContext};
use crate::config::constants::compile_time::validation::{
    COMMENT_LABEL, DEFAULT_COMMENT_QUESTION_ID,
};
use crate::config::runtime::{ConfigResult, RuntimeConfig};
use crate::logging::codes;
use crate::project::ProjectContext;
use crate::structure::FormStructure;
use crate::{log_debug, log_success, log_warning};
use serde::Serialize;
use std::fmt;

/// Settings the validator needs, usually derived from [`RuntimeConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    pub comment_question_id: QuestionId,
    pub blank_text_is_missing: bool,
    pub log_visibility_decisions: bool,
    pub photo_rules: PhotoRuleSet,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            comment_question_id: DEFAULT_COMMENT_QUESTION_ID,
            blank_text_is_missing: true,
            log_visibility_decisions: false,
            photo_rules: PhotoRuleSet::new(),
        }
    }
}

impl ValidatorConfig {
    pub fn from_runtime(config: &RuntimeConfig) -> ConfigResult<Self> {
        Ok(Self {
            comment_question_id: config.validation.comment_question_id,
            blank_text_is_missing: config.validation.blank_text_is_missing,
            log_visibility_decisions: config.validation.log_visibility_decisions,
            photo_rules: config.photo_rule_set()?,
        })
    }

    pub fn with_comment_question_id(mut self, id: QuestionId) -> Self {
        self.comment_question_id = id;
        self
    }

    pub fn with_photo_rules(mut self, rules: PhotoRuleSet) -> Self {
        self.photo_rules = rules;
        self
    }

    /// Label of the justification answer in missing-field messages
    pub fn comment_label(&self) -> String {
        format!("{} (ID {})", COMMENT_LABEL, self.comment_question_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingReason {
    Unanswered,
    /// Photo count differs from the rule and no justification was given
    JustificationRequired { expected: u32, actual: usize },
}

/// One entry of the missing list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    pub question_id: QuestionId,
    pub label: String,
    pub reason: MissingReason,
}

impl MissingField {
    pub fn is_justification(&self) -> bool {
        matches!(self.reason, MissingReason::JustificationRequired { .. })
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            MissingReason::Unanswered => write!(f, "{} (ID {})", self.label, self.question_id),
            MissingReason::JustificationRequired { expected, actual } => write!(
                f,
                "{}: justification required, {} photo(s) provided for {} expected",
                self.label, actual, expected
            ),
        }
    }
}

/// Expected versus supplied photos for a section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhotoCheck {
    pub visible_photo_questions: usize,
    /// `None` when no rule covers the section
    pub per_question: Option<u32>,
    pub expected: Option<u32>,
    pub actual: usize,
}

impl PhotoCheck {
    pub fn is_enforced(&self) -> bool {
        matches!(self.expected, Some(expected) if expected > 0)
    }

    pub fn is_mismatch(&self) -> bool {
        match self.expected {
            Some(expected) if expected > 0 => expected as usize != self.actual,
            _ => false,
        }
    }
}

/// Result of validating one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionValidation {
    pub section: String,
    pub is_valid: bool,
    pub missing: Vec<MissingField>,
    pub photo_check: PhotoCheck,
    /// Visible questions in id order, comment question excluded
    pub visible_questions: Vec<QuestionId>,
}

impl SectionValidation {
    pub fn messages(&self) -> Vec<String> {
        self.missing.iter().map(ToString::to_string).collect()
    }

    /// Whether the operator must be prompted for the justification comment
    pub fn requires_justification(&self) -> bool {
        self.missing.iter().any(MissingField::is_justification)
    }
}

/// Validate the in-progress answers of `section`.
///
/// Visibility is decided against the collected phases merged with `answers`.
/// When there is no photo mismatch, a stale justification answer is removed
/// from `answers`; nothing else is modified.
pub fn validate_section(
    structure: &FormStructure,
    section: &str,
    answers: &mut AnswerMap,
    collected: &[CollectedPhase],
    project: &ProjectContext,
    config: &ValidatorConfig,
) -> SectionValidation {
    let questions = structure.questions_in_section(section);
    if questions.is_empty() {
        log_warning!(code = codes::validation::EMPTY_SECTION,
            "Section has no questions",
            "section" => section
        );
    }

    let combined = combine_answers(collected, answers);
    let ctx = ConditionContext::new(&combined, project)
        .with_decision_logging(config.log_visibility_decisions);

    let mut missing = Vec::new();
    let mut visible_questions = Vec::new();
    let mut photo_check = PhotoCheck::default();

    for question in questions {
        if question.id == config.comment_question_id || !question_is_visible(question, &ctx) {
            continue;
        }
        visible_questions.push(question.id);

        let stored = answers.get(&question.id);
        if question.is_photo() {
            photo_check.visible_photo_questions += 1;
            photo_check.actual += stored.map_or(0, |v| v.attachment_count());
        }

        let unanswered = stored.map_or(true, |v| v.is_unanswered(config.blank_text_is_missing));
        if question.mandatory && unanswered {
            log_debug!("Mandatory question unanswered",
                "section" => section,
                "question" => question.id
            );
            missing.push(MissingField {
                question_id: question.id,
                label: question.label().to_string(),
                reason: MissingReason::Unanswered,
            });
        }
    }

    if let Some(rule) = config.photo_rules.rule_for(section) {
        let per_question = rule.expected_per_question(project);
        let questions = u32::try_from(photo_check.visible_photo_questions).unwrap_or(u32::MAX);
        photo_check.per_question = Some(per_question);
        photo_check.expected = Some(per_question.saturating_mul(questions));
    }

    let comment_id = config.comment_question_id;
    if photo_check.is_mismatch() {
        let expected = photo_check.expected.unwrap_or_default();
        log_warning!(code = codes::validation::PHOTO_COUNT_MISMATCH,
            "Photo count differs from expected",
            "section" => section,
            "expected" => expected,
            "actual" => photo_check.actual
        );

        let justified = answers
            .get(&comment_id)
            .is_some_and(|v| !v.is_unanswered(true));
        if !justified {
            log_warning!(code = codes::validation::JUSTIFICATION_MISSING,
                "Photo count mismatch needs a justification",
                "section" => section,
                "comment_id" => comment_id
            );
            missing.push(MissingField {
                question_id: comment_id,
                label: config.comment_label(),
                reason: MissingReason::JustificationRequired {
                    expected,
                    actual: photo_check.actual,
                },
            });
        }
    } else if answers.remove(&comment_id).is_some() {
        log_success!(codes::success::JUSTIFICATION_CLEARED,
            "Stale justification removed",
            "section" => section,
            "comment_id" => comment_id
        );
    }

    let is_valid = missing.is_empty();
    if is_valid {
        log_success!(codes::success::SECTION_VALIDATED,
            "Section validated",
            "section" => section,
            "visible" => visible_questions.len()
        );
    } else {
        log_warning!(code = codes::validation::MANDATORY_MISSING,
            "Section has missing answers",
            "section" => section,
            "missing" => missing.len()
        );
    }

    SectionValidation {
        section: section.trim().to_string(),
        is_valid,
        missing,
        photo_check,
        visible_questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::{AnswerValue, AttachmentRef};
    use crate::structure::{Question, QuestionType};

    fn structure() -> FormStructure {
        FormStructure::new(vec![
            Question::new(1, "Identification", "Nom du site", QuestionType::Text).mandatory(),
            Question::new(9, "Installation", "Bornes posées ?", QuestionType::Radio)
                .mandatory()
                .with_options(["Oui", "Non"]),
            Question::new(10, "Installation", "Photos bornes", QuestionType::Photo)
                .with_condition("9 = Oui"),
            Question::new(11, "Installation", "Photos compteur", QuestionType::Photo)
                .with_condition("9 = Oui"),
            Question::new(12, "Installation", "Motif", QuestionType::Text)
                .mandatory()
                .with_condition("9 = Non"),
            Question::new(13, "Installation", "Nb câbles", QuestionType::Number).mandatory(),
        ])
        .unwrap()
    }

    fn photos(count: usize) -> AnswerValue {
        AnswerValue::Attachments(
            (0..count)
                .map(|i| AttachmentRef::named(format!("photo_{}.jpg", i)))
                .collect(),
        )
    }

    fn config() -> ValidatorConfig {
        ValidatorConfig::default().with_photo_rules(
            PhotoRuleSet::from_rules(vec![PhotoRule::new("Installation", ["Nb bornes"])]).unwrap(),
        )
    }

    fn project() -> ProjectContext {
        ProjectContext::new().with_field("Nb bornes", "3")
    }

    #[test]
    fn test_mandatory_empty_values_are_missing() {
        let structure = structure();
        for value in [
            AnswerValue::text(""),
            AnswerValue::Null,
            AnswerValue::Integer(0),
            AnswerValue::Attachments(vec![]),
        ] {
            let mut answers = AnswerMap::new();
            answers.insert(1, value);
            let result = validate_section(
                &structure,
                "Identification",
                &mut answers,
                &[],
                &ProjectContext::new(),
                &ValidatorConfig::default(),
            );
            assert!(!result.is_valid);
            assert_eq!(result.missing[0].question_id, 1);
            assert_eq!(result.messages(), vec!["Nom du site (ID 1)".to_string()]);
        }
    }

    #[test]
    fn test_hidden_mandatory_question_is_ignored() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(10, photos(3));
        answers.insert(11, photos(3));
        answers.insert(13, AnswerValue::Integer(4));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &[],
            &project(),
            &config(),
        );

        assert!(result.is_valid, "{:?}", result.missing);
        assert_eq!(result.visible_questions, vec![9, 10, 11, 13]);
        assert_eq!(result.photo_check.expected, Some(6));
        assert_eq!(result.photo_check.actual, 6);
    }

    #[test]
    fn test_photo_mismatch_requires_justification() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(10, photos(3));
        answers.insert(11, photos(2));
        answers.insert(13, AnswerValue::Integer(4));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &[],
            &project(),
            &config(),
        );

        assert!(!result.is_valid);
        assert!(result.requires_justification());
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].question_id, DEFAULT_COMMENT_QUESTION_ID);
        assert!(result.messages()[0].contains("Commentaire (ID 100)"));
        assert_eq!(
            result.missing[0].reason,
            MissingReason::JustificationRequired { expected: 6, actual: 5 }
        );
    }

    #[test]
    fn test_justification_accepts_mismatch() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(10, photos(1));
        answers.insert(13, AnswerValue::Integer(4));
        answers.insert(100, AnswerValue::text("Borne inaccessible"));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &[],
            &project(),
            &config(),
        );

        assert!(result.is_valid);
        assert!(result.photo_check.is_mismatch());
        assert!(answers.contains_key(&100));
    }

    #[test]
    fn test_blank_justification_is_missing() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(13, AnswerValue::Integer(4));
        answers.insert(100, AnswerValue::text("   "));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &[],
            &project(),
            &config(),
        );
        assert!(result.requires_justification());
    }

    #[test]
    fn test_matching_count_removes_stale_justification() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(10, photos(3));
        answers.insert(11, photos(3));
        answers.insert(13, AnswerValue::Integer(4));
        answers.insert(100, AnswerValue::text("ancien commentaire"));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &[],
            &project(),
            &config(),
        );

        assert!(result.is_valid);
        assert!(!answers.contains_key(&100));
    }

    #[test]
    fn test_no_rule_means_no_photo_enforcement() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(13, AnswerValue::Integer(2));
        answers.insert(100, AnswerValue::text("inutile"));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &[],
            &project(),
            &ValidatorConfig::default(),
        );

        assert!(result.is_valid);
        assert_eq!(result.photo_check.expected, None);
        assert_eq!(result.photo_check.visible_photo_questions, 2);
        assert!(!answers.contains_key(&100));
    }

    #[test]
    fn test_zero_expected_is_not_enforced() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(10, photos(2));
        answers.insert(13, AnswerValue::Integer(2));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &[],
            &ProjectContext::new(),
            &config(),
        );

        assert!(result.is_valid);
        assert_eq!(result.photo_check.expected, Some(0));
        assert!(!result.photo_check.is_enforced());
    }

    #[test]
    fn test_visibility_uses_collected_history() {
        let mut history_answers = AnswerMap::new();
        history_answers.insert(9, AnswerValue::text("Non"));
        let collected = vec![CollectedPhase::new("Installation", history_answers)];

        let mut answers = AnswerMap::new();
        answers.insert(13, AnswerValue::Integer(1));

        let result = validate_section(
            &structure(),
            "Installation",
            &mut answers,
            &collected,
            &project(),
            &config(),
        );

        let ids: Vec<QuestionId> = result.missing.iter().map(|m| m.question_id).collect();
        assert_eq!(ids, vec![9, 12]);
        assert_eq!(result.photo_check.visible_photo_questions, 0);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut answers = AnswerMap::new();
        answers.insert(9, AnswerValue::text("Oui"));
        answers.insert(10, photos(3));
        answers.insert(11, photos(3));
        answers.insert(13, AnswerValue::Decimal(2.5));

        let structure = structure();
        let project = project();
        let config = config();
        let first = validate_section(&structure, "Installation", &mut answers, &[], &project, &config);
        let snapshot = answers.clone();
        let second = validate_section(&structure, "Installation", &mut answers, &[], &project, &config);

        assert!(first.is_valid && second.is_valid);
        assert!(first.missing.is_empty() && second.missing.is_empty());
        assert_eq!(answers, snapshot);
    }

    #[test]
    fn test_unknown_section_is_trivially_valid() {
        let mut answers = AnswerMap::new();
        let result = validate_section(
            &structure(),
            "Inconnue",
            &mut answers,
            &[],
            &project(),
            &config(),
        );
        assert!(result.is_valid);
        assert!(result.visible_questions.is_empty());
    }

    #[test]
    fn test_from_runtime_config() {
        let runtime = RuntimeConfig::from_toml_str(
            r#"
            [validation]
            comment_question_id = 500

            [[photo_rules]]
            section = "Installation"
            fields = ["Nb bornes"]
            "#,
        )
        .unwrap();
        let config = ValidatorConfig::from_runtime(&runtime).unwrap();
        assert_eq!(config.comment_question_id, 500);
        assert_eq!(config.comment_label(), "Commentaire (ID 500)");
        assert_eq!(config.photo_rules.len(), 1);
    }
}
