//! Answer values, per-phase answer maps, and the answer aggregator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric question identifier
pub type QuestionId = u32;

/// Answers of one phase instance, keyed by question id
pub type AnswerMap = BTreeMap<QuestionId, AnswerValue>;

/// Reference to an uploaded file attached to a photo question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl AttachmentRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            size_bytes: None,
        }
    }
}

/// Textual form of a looked-up value inside a condition term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonText {
    /// Unanswered or null
    Absent,
    Text(String),
    /// The value has no textual form; names the value shape
    Unsupported(&'static str),
}

/// A single answer as stored in an [`AnswerMap`]
///
/// Deserializes from plain JSON: `null`, integers, decimals, strings, and
/// arrays of attachment objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Integer(i64),
    Decimal(f64),
    Text(String),
    Attachments(Vec<AttachmentRef>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Whether this answer leaves a mandatory question unanswered:
    /// null, empty text, zero, or no attachments. Whitespace-only text counts
    /// as empty when `blank_is_empty` is set.
    pub fn is_unanswered(&self, blank_is_empty: bool) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) if blank_is_empty => s.trim().is_empty(),
            Self::Text(s) => s.is_empty(),
            Self::Integer(i) => *i == 0,
            Self::Decimal(d) => *d == 0.0 || d.is_nan(),
            Self::Attachments(files) => files.is_empty(),
        }
    }

    /// Number of attached files (zero for non-attachment answers)
    pub fn attachment_count(&self) -> usize {
        match self {
            Self::Attachments(files) => files.len(),
            _ => 0,
        }
    }

    /// Text used when this answer is compared inside a condition term
    pub fn comparison_text(&self) -> ComparisonText {
        match self {
            Self::Null => ComparisonText::Absent,
            Self::Attachments(_) => ComparisonText::Unsupported("attachment list"),
            other => ComparisonText::Text(other.to_string()),
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(i) => write!(f, "{}", i),
            // Whole decimals keep one fractional digit so "12.0" stays distinct
            // from an integer answer of 12.
            Self::Decimal(d) if d.is_finite() && d.fract() == 0.0 => write!(f, "{:.1}", d),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Text(s) => write!(f, "{}", s),
            Self::Attachments(files) => {
                let names: Vec<&str> = files.iter().map(|a| a.name.as_str()).collect();
                write!(f, "{}", names.join(", "))
            }
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<AttachmentRef>> for AnswerValue {
    fn from(value: Vec<AttachmentRef>) -> Self {
        Self::Attachments(value)
    }
}

/// A validated phase appended to the collected sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedPhase {
    pub phase_name: String,
    pub answers: AnswerMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CollectedPhase {
    /// Entry stamped with the current time
    pub fn new(phase_name: impl Into<String>, answers: AnswerMap) -> Self {
        Self {
            phase_name: phase_name.into(),
            answers,
            completed_at: Some(Utc::now()),
        }
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }
}

/// Merge completed phases and the in-progress answers into one lookup map.
///
/// Later phases override earlier ones for the same question id and the
/// current answers override all history. Inputs are not modified.
pub fn combine_answers(collected: &[CollectedPhase], current: &AnswerMap) -> AnswerMap {
    let mut combined = AnswerMap::new();
    for phase in collected {
        combined.extend(phase.answers.iter().map(|(id, v)| (*id, v.clone())));
    }
    combined.extend(current.iter().map(|(id, v)| (*id, v.clone())));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(QuestionId, &str)]) -> AnswerMap {
        entries
            .iter()
            .map(|(id, v)| (*id, AnswerValue::text(*v)))
            .collect()
    }

    #[test]
    fn test_current_answers_override_history() {
        let history = vec![CollectedPhase::new("Identification", map(&[(1, "A"), (2, "B")]))];
        let current = map(&[(2, "C"), (3, "D")]);

        let combined = combine_answers(&history, &current);

        assert_eq!(combined, map(&[(1, "A"), (2, "C"), (3, "D")]));
        // inputs untouched
        assert_eq!(history[0].answers, map(&[(1, "A"), (2, "B")]));
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn test_later_phases_override_earlier_phases() {
        let history = vec![
            CollectedPhase::new("Identification", map(&[(5, "old")])),
            CollectedPhase::new("Installation", map(&[(5, "new")])),
        ];
        let combined = combine_answers(&history, &AnswerMap::new());
        assert_eq!(combined.get(&5), Some(&AnswerValue::text("new")));
    }

    #[test]
    fn test_unanswered_values() {
        assert!(AnswerValue::Null.is_unanswered(true));
        assert!(AnswerValue::text("").is_unanswered(false));
        assert!(AnswerValue::text("   ").is_unanswered(true));
        assert!(!AnswerValue::text("   ").is_unanswered(false));
        assert!(AnswerValue::Integer(0).is_unanswered(true));
        assert!(AnswerValue::Decimal(0.0).is_unanswered(true));
        assert!(AnswerValue::Attachments(vec![]).is_unanswered(true));

        assert!(!AnswerValue::text("Oui").is_unanswered(true));
        assert!(!AnswerValue::Integer(3).is_unanswered(true));
        assert!(!AnswerValue::Attachments(vec![AttachmentRef::named("a.jpg")]).is_unanswered(true));
    }

    #[test]
    fn test_comparison_text() {
        let text = |s: &str| ComparisonText::Text(s.to_string());
        assert_eq!(AnswerValue::Null.comparison_text(), ComparisonText::Absent);
        assert_eq!(AnswerValue::Integer(4).comparison_text(), text("4"));
        assert_eq!(AnswerValue::Decimal(4.0).comparison_text(), text("4.0"));
        assert_eq!(AnswerValue::Decimal(2.5).comparison_text(), text("2.5"));
        assert_eq!(
            AnswerValue::Attachments(vec![]).comparison_text(),
            ComparisonText::Unsupported("attachment list")
        );
    }

    #[test]
    fn test_untagged_json_decoding() {
        let answers: AnswerMap = serde_json::from_str(
            r#"{"1": "Oui", "2": 3, "3": 2.5, "4": null, "5": [{"name": "p1.jpg"}, {"name": "p2.jpg", "size_bytes": 10}]}"#,
        )
        .unwrap();

        assert_eq!(answers[&1], AnswerValue::text("Oui"));
        assert_eq!(answers[&2], AnswerValue::Integer(3));
        assert_eq!(answers[&3], AnswerValue::Decimal(2.5));
        assert_eq!(answers[&4], AnswerValue::Null);
        assert_eq!(answers[&5].attachment_count(), 2);
    }

    #[test]
    fn test_collected_phase_json_without_timestamp() {
        let phase: CollectedPhase =
            serde_json::from_str(r#"{"phaseName": "Identification", "answers": {"1": "A"}}"#)
                .unwrap();
        assert_eq!(phase.phase_name, "Identification");
        assert_eq!(phase.answer_count(), 1);
        assert!(phase.completed_at.is_none());
    }
}
