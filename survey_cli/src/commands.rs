//! Subcommand implementations, each returning the JSON to print

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::error::Error;
use std::path::Path;
use survey_engine::condition::{assess_condition, question_visibility};
use survey_engine::config::runtime::RuntimeConfig;
use survey_engine::syntax::parse_condition;
use survey_engine::{
    combine_answers, validate_section, AnswerMap, CollectedPhase, ConditionContext,
    FormStructure, ProjectContext, ValidatorConfig,
};

pub type CommandResult = Result<Value, Box<dyn Error>>;

#[derive(Debug, Default)]
pub struct Inputs {
    pub answers: AnswerMap,
    pub collected: Vec<CollectedPhase>,
    pub project: ProjectContext,
}

/// Deserialize a JSON file, or produce the default value when no path is given
pub fn read_json_or_default<T>(path: Option<&Path>) -> Result<T, Box<dyn Error>>
where
    T: DeserializeOwned + Default,
{
    match path {
        None => Ok(T::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            Ok(serde_json::from_str(&text)
                .map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))?)
        }
    }
}

fn load_structure(path: &Path) -> Result<FormStructure, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(FormStructure::from_json(&text)?)
}

pub fn check(condition: &str, inputs: &Inputs) -> CommandResult {
    let combined = combine_answers(&inputs.collected, &inputs.answers);
    let ctx = ConditionContext::new(&combined, &inputs.project);
    let outcome = assess_condition(condition, &ctx);

    let parsed = match parse_condition(condition) {
        Ok(parsed) => serde_json::to_value(&parsed)?,
        Err(error) => json!({ "error": error.to_string() }),
    };

    Ok(json!({
        "condition": condition,
        "visible": outcome.is_visible(),
        "outcome": outcome.as_str(),
        "parsed": parsed,
    }))
}

pub fn visible(
    structure: &Path,
    section: &str,
    inputs: &Inputs,
    config: &RuntimeConfig,
) -> CommandResult {
    let structure = load_structure(structure)?;
    let combined = combine_answers(&inputs.collected, &inputs.answers);
    let ctx = ConditionContext::new(&combined, &inputs.project)
        .with_decision_logging(config.validation.log_visibility_decisions);
    let comment_id = config.validation.comment_question_id;

    let questions: Vec<Value> = structure
        .questions_in_section(section)
        .into_iter()
        .filter(|q| q.id != comment_id)
        .map(|q| {
            let visibility = question_visibility(q, &ctx);
            json!({
                "id": q.id,
                "text": q.label(),
                "type": q.kind,
                "visible": visibility.is_visible(),
                "outcome": visibility.as_str(),
            })
        })
        .collect();

    Ok(json!({ "section": section.trim(), "questions": questions }))
}

pub fn validate(
    structure: &Path,
    section: &str,
    mut inputs: Inputs,
    config: &RuntimeConfig,
) -> CommandResult {
    let structure = load_structure(structure)?;
    let validator = ValidatorConfig::from_runtime(config)?;

    let result = validate_section(
        &structure,
        section,
        &mut inputs.answers,
        &inputs.collected,
        &inputs.project,
        &validator,
    );

    let messages = result.messages();
    let requires_justification = result.requires_justification();
    Ok(json!({
        "validation": result,
        "messages": messages,
        "requires_justification": requires_justification,
        "answers": inputs.answers,
    }))
}

pub fn phases(structure: &Path) -> CommandResult {
    let structure = load_structure(structure)?;
    Ok(json!({
        "identification": structure.identification_section(),
        "phases": structure.available_phases(),
        "sections": structure.sections(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const STRUCTURE: &str = r#"[
        {"id": 1, "section": "Identification", "text": "Nom", "type": "text", "mandatory": true},
        {"id": 9, "section": "Installation", "text": "Bornes posées ?", "type": "radio", "mandatory": true},
        {"id": 10, "section": "Installation", "text": "Photos", "type": "photo", "conditionOn": 1, "conditionExpression": "9 = Oui"}
    ]"#;

    #[test]
    fn test_check_command() {
        let mut inputs = Inputs::default();
        inputs.answers.insert(9, "Oui".into());
        let value = check("9 = oui OU 10 = Non", &inputs).unwrap();
        assert_eq!(value["visible"], json!(true));
        assert_eq!(value["outcome"], json!("satisfied"));
    }

    #[test]
    fn test_phases_command() {
        let file = write_fixture(STRUCTURE);
        let value = phases(file.path()).unwrap();
        assert_eq!(value["identification"], json!("Identification"));
        assert_eq!(value["phases"], json!(["Installation"]));
    }

    #[test]
    fn test_visible_command() {
        let file = write_fixture(STRUCTURE);
        let value = visible(
            file.path(),
            "Installation",
            &Inputs::default(),
            &RuntimeConfig::default(),
        )
        .unwrap();
        assert_eq!(value["questions"][0]["visible"], json!(true));
        assert_eq!(value["questions"][1]["visible"], json!(false));
    }

    #[test]
    fn test_validate_command_reports_missing() {
        let file = write_fixture(STRUCTURE);
        let value = validate(
            file.path(),
            "Installation",
            Inputs::default(),
            &RuntimeConfig::default(),
        )
        .unwrap();
        assert_eq!(value["validation"]["is_valid"], json!(false));
        assert_eq!(value["messages"], json!(["Bornes posées ? (ID 9)"]));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result: Result<AnswerMap, _> = read_json_or_default(Some(Path::new("/nonexistent/a.json")));
        assert!(result.is_err());
        let empty: AnswerMap = read_json_or_default(None).unwrap();
        assert!(empty.is_empty());
    }
}
