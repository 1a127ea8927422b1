//! Atomic term evaluation

use super::error::{ConditionError, ConditionResult};
use super::ConditionContext;
use crate::answers::ComparisonText;
use crate::syntax::{Comparison, Term, TermKey};

impl Comparison {
    /// Compare the resolved value with the expected one, ignoring case and
    /// surrounding whitespace. A missing value never satisfies the term,
    /// whatever the operator.
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> ConditionResult<bool> {
        let resolved = match &self.key {
            TermKey::Question(id) => ctx
                .answers
                .get(id)
                .map(|value| value.comparison_text())
                .unwrap_or(ComparisonText::Absent),
            TermKey::UnknownQuestion(_) => ComparisonText::Absent,
            TermKey::Project(field) => ctx.project.comparison_text(field),
        };

        match resolved {
            ComparisonText::Absent => Ok(false),
            ComparisonText::Unsupported(shape) => {
                Err(ConditionError::unsupported_value(&self.key, shape))
            }
            ComparisonText::Text(actual) => Ok(self
                .op
                .holds(&fold(&actual), &fold(&self.expected))),
        }
    }
}

impl Term {
    /// Malformed terms are false
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> ConditionResult<bool> {
        match self {
            Term::Comparison { comparison, .. } => comparison.evaluate(ctx),
            Term::Malformed { .. } => Ok(false),
        }
    }
}

fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::{AnswerMap, AnswerValue, AttachmentRef};
    use crate::project::ProjectContext;
    use crate::syntax::parse_term;
    use crate::utils::Span;
    use assert_matches::assert_matches;

    fn eval(text: &str, answers: &AnswerMap, project: &ProjectContext) -> ConditionResult<bool> {
        let ctx = ConditionContext::new(answers, project);
        parse_term(text, Span::covering(text)).evaluate(&ctx)
    }

    fn answers() -> AnswerMap {
        let mut map = AnswerMap::new();
        map.insert(9, AnswerValue::text("Oui"));
        map.insert(10, AnswerValue::text("  non "));
        map.insert(11, AnswerValue::Integer(3));
        map.insert(12, AnswerValue::Decimal(12.0));
        map.insert(13, AnswerValue::Null);
        map.insert(14, AnswerValue::Attachments(vec![AttachmentRef::named("a.jpg")]));
        map
    }

    #[test]
    fn test_equality_ignores_case_and_whitespace() {
        let project = ProjectContext::new();
        assert!(eval("9 = oui", &answers(), &project).unwrap());
        assert!(eval("9 = 'OUI'", &answers(), &project).unwrap());
        assert!(eval("10 = Non", &answers(), &project).unwrap());
        assert!(!eval("9 = Non", &answers(), &project).unwrap());
        assert!(eval("9 <> Non", &answers(), &project).unwrap());
        assert!(!eval("9 <> oui", &answers(), &project).unwrap());
    }

    #[test]
    fn test_absent_value_is_false_for_both_operators() {
        let project = ProjectContext::new();
        assert!(!eval("99 = Oui", &answers(), &project).unwrap());
        assert!(!eval("99 <> Oui", &answers(), &project).unwrap());
        assert!(!eval("13 <> Oui", &answers(), &project).unwrap());
    }

    #[test]
    fn test_numbers_compare_as_text() {
        let project = ProjectContext::new();
        assert!(eval("11 = 3", &answers(), &project).unwrap());
        assert!(eval("12 = 12.0", &answers(), &project).unwrap());
        assert!(!eval("12 = 12", &answers(), &project).unwrap());
    }

    #[test]
    fn test_project_field_lookup() {
        let project = ProjectContext::new()
            .with_field("Type de site", "Parking")
            .with_field("Nb bornes", 4);
        assert!(eval("Type de site = parking", &AnswerMap::new(), &project).unwrap());
        assert!(eval("'Nb bornes' = 4", &AnswerMap::new(), &project).unwrap());
        assert!(!eval("Région <> Nord", &AnswerMap::new(), &project).unwrap());
    }

    #[test]
    fn test_malformed_term_is_false() {
        let project = ProjectContext::new();
        assert!(!eval("9 Oui", &answers(), &project).unwrap());
        assert!(!eval(" = Oui", &answers(), &project).unwrap());
    }

    #[test]
    fn test_attachment_list_is_unsupported() {
        let project = ProjectContext::new();
        assert_matches!(
            eval("14 = a.jpg", &answers(), &project),
            Err(ConditionError::UnsupportedValue { ref key, .. }) if key == "14"
        );
    }
}
