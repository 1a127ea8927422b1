//! Form structure: the ordered question collection and its sections

pub mod error;
pub mod question;

pub use error::{StructureError, StructureResult};
pub use question::{NumericKind, Question, QuestionType};

use crate::answers::QuestionId;
use crate::config::constants::compile_time::structure::{
    MAX_SECTION_QUESTIONS, RESERVED_PHASE_SECTION,
};
use crate::logging::codes;
use std::collections::HashMap;

/// Immutable, validated question collection
#[derive(Debug, Clone, Default)]
pub struct FormStructure {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
}

impl FormStructure {
    /// Validate and index a question collection.
    ///
    /// Question ids must be unique across the whole form, since answers of
    /// every phase are merged into one map keyed by id.
    pub fn new(questions: Vec<Question>) -> StructureResult<Self> {
        let mut index = HashMap::with_capacity(questions.len());
        let mut section_sizes: HashMap<&str, usize> = HashMap::new();

        for (position, question) in questions.iter().enumerate() {
            let section = question.section.trim();
            if section.is_empty() {
                return Err(StructureError::BlankSection { id: question.id });
            }

            if let Some(&existing) = index.get(&question.id) {
                let first: &Question = &questions[existing];
                return Err(StructureError::duplicate_question_id(
                    question.id,
                    &first.section,
                    &question.section,
                ));
            }
            index.insert(question.id, position);

            let size = section_sizes.entry(section).or_insert(0);
            *size += 1;
            if *size > MAX_SECTION_QUESTIONS {
                return Err(StructureError::SectionTooLarge {
                    section: section.to_string(),
                    count: *size,
                    limit: MAX_SECTION_QUESTIONS,
                });
            }
        }

        crate::log_success!(
            codes::success::STRUCTURE_LOADED,
            "Form structure loaded",
            "questions" => questions.len(),
            "sections" => section_sizes.len()
        );

        Ok(Self { questions, index })
    }

    /// Load from a JSON array of question records
    pub fn from_json(text: &str) -> StructureResult<Self> {
        let questions: Vec<Question> = serde_json::from_str(text)?;
        Self::new(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.index.get(&id).map(|&position| &self.questions[position])
    }

    /// Questions of a section, ordered by numeric id so that parents are
    /// answered before the questions whose conditions depend on them
    pub fn questions_in_section(&self, section: &str) -> Vec<&Question> {
        let wanted = section.trim();
        let mut selected: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.section.trim() == wanted)
            .collect();
        selected.sort_by_key(|q| q.id);
        selected
    }

    pub fn has_section(&self, section: &str) -> bool {
        let wanted = section.trim();
        self.questions.iter().any(|q| q.section.trim() == wanted)
    }

    /// Section names in order of first appearance
    pub fn sections(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for question in &self.questions {
            let section = question.section.trim();
            if !seen.contains(&section) {
                seen.push(section);
            }
        }
        seen
    }

    /// The identification section is the section of the first question
    pub fn identification_section(&self) -> Option<&str> {
        self.questions.first().map(|q| q.section.trim())
    }

    /// Sections an operator may pick as the next phase: every section except
    /// the identification section and the reserved `phase` section
    pub fn available_phases(&self) -> Vec<&str> {
        let identification = self
            .identification_section()
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        self.sections()
            .into_iter()
            .filter(|section| {
                let lowered = section.to_lowercase();
                lowered != identification && lowered != RESERVED_PHASE_SECTION
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample() -> FormStructure {
        FormStructure::new(vec![
            Question::new(2, "Identification", "Nom", QuestionType::Text).mandatory(),
            Question::new(1, "Identification", "Date", QuestionType::Date),
            Question::new(20, "Installation", "Bornes posées ?", QuestionType::Radio),
            Question::new(10, "Installation", "Photos", QuestionType::Photo)
                .with_condition("20 = Oui"),
            Question::new(30, "Phase", "Phase", QuestionType::Select),
            Question::new(40, "Mise en service", "Essais", QuestionType::Text),
        ])
        .unwrap()
    }

    #[test]
    fn test_section_questions_ordered_by_id() {
        let structure = sample();
        let ids: Vec<QuestionId> = structure
            .questions_in_section("Installation")
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![10, 20]);
        assert!(structure.questions_in_section("Inconnue").is_empty());
    }

    #[test]
    fn test_sections_and_phases() {
        let structure = sample();
        assert_eq!(
            structure.sections(),
            vec!["Identification", "Installation", "Phase", "Mise en service"]
        );
        assert_eq!(structure.identification_section(), Some("Identification"));
        assert_eq!(structure.available_phases(), vec!["Installation", "Mise en service"]);
    }

    #[test]
    fn test_lookup_by_id() {
        let structure = sample();
        assert_eq!(structure.question(10).map(|q| q.kind), Some(QuestionType::Photo));
        assert!(structure.question(99).is_none());
        assert_eq!(structure.len(), 6);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = FormStructure::new(vec![
            Question::new(1, "A", "x", QuestionType::Text),
            Question::new(1, "B", "y", QuestionType::Text),
        ]);
        assert_matches!(
            result,
            Err(StructureError::DuplicateQuestionId { id: 1, .. })
        );
    }

    #[test]
    fn test_blank_section_rejected() {
        let result = FormStructure::new(vec![Question::new(4, "  ", "x", QuestionType::Text)]);
        let error = result.unwrap_err();
        assert_eq!(error.error_code(), codes::structure::BLANK_SECTION);
    }

    #[test]
    fn test_from_json() {
        let structure = FormStructure::from_json(
            r#"[
                {"id": 1, "section": "Identification", "text": "Nom", "type": "text", "mandatory": true},
                {"id": 2, "section": "Travaux", "text": "Photos", "type": "photo"}
            ]"#,
        )
        .unwrap();
        assert_eq!(structure.available_phases(), vec!["Travaux"]);
    }

    #[test]
    fn test_from_json_invalid() {
        let result = FormStructure::from_json(r#"[{"id": "abc"}]"#);
        assert_matches!(result, Err(StructureError::InvalidData(_)));
    }
}
