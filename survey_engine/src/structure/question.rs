//! Question records as supplied by the form structure feed

use crate::answers::{AnswerValue, QuestionId};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Input widget kind of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Select,
    Radio,
    Number,
    Photo,
    Date,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Number => "number",
            Self::Photo => "photo",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How numeric answers of a `number` question are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    Integer,
    #[default]
    Decimal,
}

/// One question of the form structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub section: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub mandatory: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, alias = "Condition on", deserialize_with = "deserialize_flag")]
    pub condition_on: bool,
    #[serde(default, alias = "Condition value", deserialize_with = "deserialize_text")]
    pub condition_expression: String,
    #[serde(default)]
    pub numeric_kind: NumericKind,
}

impl Question {
    pub fn new(
        id: QuestionId,
        section: impl Into<String>,
        text: impl Into<String>,
        kind: QuestionType,
    ) -> Self {
        Self {
            id,
            section: section.into(),
            text: text.into(),
            kind,
            mandatory: false,
            options: Vec::new(),
            condition_on: false,
            condition_expression: String::new(),
            numeric_kind: NumericKind::default(),
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Attach a visibility condition and switch it on
    pub fn with_condition(mut self, expression: impl Into<String>) -> Self {
        self.condition_on = true;
        self.condition_expression = expression.into();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_numeric_kind(mut self, kind: NumericKind) -> Self {
        self.numeric_kind = kind;
        self
    }

    pub fn is_photo(&self) -> bool {
        self.kind == QuestionType::Photo
    }

    /// Label used in operator-facing messages
    pub fn label(&self) -> &str {
        if self.text.trim().is_empty() {
            "Question"
        } else {
            self.text.trim()
        }
    }

    /// Store a raw answer the way this question expects it.
    ///
    /// Numbers given to a `number` question follow its numeric kind; every
    /// other combination is kept as given.
    pub fn normalize_answer(&self, value: AnswerValue) -> AnswerValue {
        if self.kind != QuestionType::Number {
            return value;
        }
        match (self.numeric_kind, value) {
            (NumericKind::Integer, AnswerValue::Decimal(d)) if d.is_finite() => {
                AnswerValue::Integer(d.round() as i64)
            }
            (NumericKind::Decimal, AnswerValue::Integer(i)) => AnswerValue::Decimal(i as f64),
            (_, other) => other,
        }
    }
}

/// Accept `true/false`, `0/1`, `"0"/"1"`, `"oui"/"non"` and `null` for flags
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagRepr {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<FlagRepr>::deserialize(deserializer)? {
        None => false,
        Some(FlagRepr::Bool(b)) => b,
        Some(FlagRepr::Int(i)) => i == 1,
        Some(FlagRepr::Float(f)) => f == 1.0,
        Some(FlagRepr::Text(s)) => parse_flag_text(&s),
    })
}

fn parse_flag_text(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    match lowered.as_str() {
        "true" | "oui" | "yes" | "vrai" => true,
        other => other.parse::<f64>().map(|v| v == 1.0).unwrap_or(false),
    }
}

/// Accept a string, a number, or `null` for free text columns
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_camel_case_record() {
        let question: Question = serde_json::from_str(
            r#"{
                "id": 12,
                "section": "Installation",
                "text": "Photos de la borne",
                "type": "photo",
                "mandatory": true,
                "conditionOn": 1,
                "conditionExpression": "9 = Oui"
            }"#,
        )
        .unwrap();

        assert_eq!(question.id, 12);
        assert!(question.is_photo());
        assert!(question.mandatory);
        assert!(question.condition_on);
        assert_eq!(question.condition_expression, "9 = Oui");
        assert_eq!(question.numeric_kind, NumericKind::Decimal);
        assert!(question.options.is_empty());
    }

    #[test]
    fn test_decode_spreadsheet_column_aliases() {
        let question: Question = serde_json::from_str(
            r#"{"id": 3, "section": "Identification", "type": "radio",
                "Condition on": "0", "Condition value": null, "mandatory": "Oui"}"#,
        )
        .unwrap();

        assert!(!question.condition_on);
        assert!(question.condition_expression.is_empty());
        assert!(question.mandatory);
    }

    #[test]
    fn test_flag_text_values() {
        assert!(parse_flag_text("1"));
        assert!(parse_flag_text(" 1.0 "));
        assert!(parse_flag_text("OUI"));
        assert!(!parse_flag_text("2"));
        assert!(!parse_flag_text("non"));
        assert!(!parse_flag_text(""));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = serde_json::from_str::<Question>(r#"{"id": 1, "section": "S", "type": "video"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_number_answers() {
        let integer = Question::new(7, "S", "Nb bornes", QuestionType::Number)
            .with_numeric_kind(NumericKind::Integer);
        let decimal = Question::new(8, "S", "Longueur", QuestionType::Number);
        let text = Question::new(9, "S", "Remarque", QuestionType::Text);

        assert_eq!(integer.normalize_answer(AnswerValue::Decimal(3.6)), AnswerValue::Integer(4));
        assert_eq!(decimal.normalize_answer(AnswerValue::Integer(3)), AnswerValue::Decimal(3.0));
        assert_eq!(text.normalize_answer(AnswerValue::Integer(3)), AnswerValue::Integer(3));
    }

    #[test]
    fn test_label_falls_back_when_text_blank() {
        assert_eq!(Question::new(1, "S", "  ", QuestionType::Text).label(), "Question");
        assert_eq!(Question::new(1, "S", " Nom ", QuestionType::Text).label(), "Nom");
    }
}
