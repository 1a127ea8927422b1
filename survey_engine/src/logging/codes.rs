//! Error and success codes with their classification metadata
//!
//! Every event the engine emits carries a code. Error codes have metadata
//! (category, severity, description, recommended action) in a registry so
//! that log consumers can group and explain them.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Code wrapper shared by error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Condition language codes (tokenizing, parsing, evaluation)
pub mod condition {
    use super::Code;

    pub const CONDITION_TOO_LONG: Code = Code::new("E020");
    pub const TOO_MANY_ATOMS: Code = Code::new("E021");
    pub const MALFORMED_TERM: Code = Code::new("E022");
    pub const UNSUPPORTED_VALUE: Code = Code::new("E023");
    pub const EVALUATION_FAILED: Code = Code::new("E024");
    pub const NO_VALID_TERMS: Code = Code::new("E025");
}

/// Form structure codes
pub mod structure {
    use super::Code;

    pub const DUPLICATE_QUESTION_ID: Code = Code::new("E040");
    pub const BLANK_SECTION: Code = Code::new("E041");
    pub const SECTION_TOO_LARGE: Code = Code::new("E042");
    pub const INVALID_STRUCTURE_DATA: Code = Code::new("E043");
}

/// Section validation codes
pub mod validation {
    use super::Code;

    pub const MANDATORY_MISSING: Code = Code::new("E060");
    pub const PHOTO_COUNT_MISMATCH: Code = Code::new("E061");
    pub const JUSTIFICATION_MISSING: Code = Code::new("E062");
    pub const EMPTY_SECTION: Code = Code::new("E063");
}

/// Phase session codes
pub mod session {
    use super::Code;

    pub const INVALID_TRANSITION: Code = Code::new("E080");
    pub const IDENTIFICATION_PENDING: Code = Code::new("E081");
    pub const UNKNOWN_SECTION: Code = Code::new("E082");
    pub const QUESTION_OUTSIDE_SECTION: Code = Code::new("E083");
}

/// Configuration codes
pub mod config {
    use super::Code;

    pub const CONFIG_IO_ERROR: Code = Code::new("E100");
    pub const CONFIG_PARSE_ERROR: Code = Code::new("E101");
    pub const CONFIG_INVALID: Code = Code::new("E102");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const STRUCTURE_LOADED: Code = Code::new("I040");
    pub const SECTION_VALIDATED: Code = Code::new("I060");
    pub const JUSTIFICATION_CLEARED: Code = Code::new("I061");
    pub const PHASE_STARTED: Code = Code::new("I080");
    pub const PHASE_COMPLETED: Code = Code::new("I081");
    pub const CONFIG_LOADED: Code = Code::new("I100");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // (code, category, severity, recoverable, description, action)
            (system::INTERNAL_ERROR, "System", Severity::Critical, false,
                "Internal engine error",
                "File a bug report with the triggering form configuration"),
            (system::INITIALIZATION_FAILURE, "System", Severity::Critical, false,
                "Engine initialization failed",
                "Check logging and runtime configuration"),
            (condition::CONDITION_TOO_LONG, "Condition", Severity::Medium, true,
                "Condition string exceeds the maximum length; question hidden",
                "Shorten the condition or split the question"),
            (condition::TOO_MANY_ATOMS, "Condition", Severity::Medium, true,
                "Condition has more terms than allowed; question hidden",
                "Reduce the number of ET/OU terms"),
            (condition::MALFORMED_TERM, "Condition", Severity::Low, true,
                "Condition term has no '=' or '<>' operator; term is false",
                "Write terms as '<id> = <value>' or '<id> <> <value>'"),
            (condition::UNSUPPORTED_VALUE, "Condition", Severity::Medium, true,
                "Condition references an answer that cannot be compared as text",
                "Do not use photo questions as condition keys"),
            (condition::EVALUATION_FAILED, "Condition", Severity::Medium, true,
                "Condition evaluation failed; question hidden",
                "Inspect the condition and the referenced answers"),
            (condition::NO_VALID_TERMS, "Condition", Severity::Low, true,
                "Condition has no valid terms; question shown unconditionally",
                "Fix the condition expression in the form structure"),
            (structure::DUPLICATE_QUESTION_ID, "Structure", Severity::High, false,
                "Two questions share the same id",
                "Deduplicate the question structure before loading"),
            (structure::BLANK_SECTION, "Structure", Severity::High, false,
                "Question has no section name",
                "Assign every question to a section"),
            (structure::SECTION_TOO_LARGE, "Structure", Severity::High, false,
                "Section exceeds the maximum number of questions",
                "Split the section into several phases"),
            (structure::INVALID_STRUCTURE_DATA, "Structure", Severity::High, false,
                "Question structure could not be decoded",
                "Check the structure feed against the question schema"),
            (validation::MANDATORY_MISSING, "Validation", Severity::Low, true,
                "Mandatory question left unanswered",
                "Answer the question before submitting the phase"),
            (validation::PHOTO_COUNT_MISMATCH, "Validation", Severity::Low, true,
                "Submitted photo count differs from the expected count",
                "Add the missing photos or justify the difference"),
            (validation::JUSTIFICATION_MISSING, "Validation", Severity::Low, true,
                "Photo count mismatch without justification comment",
                "Fill in the justification comment"),
            (validation::EMPTY_SECTION, "Validation", Severity::Low, true,
                "Validated section has no questions",
                "Check the section name against the structure"),
            (session::INVALID_TRANSITION, "Session", Severity::Medium, true,
                "Operation not allowed in the current phase state",
                "Follow the start, answer, submit sequence"),
            (session::IDENTIFICATION_PENDING, "Session", Severity::Medium, true,
                "Identification section must be completed first",
                "Complete the identification phase"),
            (session::UNKNOWN_SECTION, "Session", Severity::Medium, true,
                "Section is not part of the form structure",
                "Select one of the available phases"),
            (session::QUESTION_OUTSIDE_SECTION, "Session", Severity::Medium, true,
                "Answer recorded for a question outside the current section",
                "Record answers only for questions of the active phase"),
            (config::CONFIG_IO_ERROR, "Config", Severity::High, false,
                "Configuration file could not be read",
                "Check the configuration path and permissions"),
            (config::CONFIG_PARSE_ERROR, "Config", Severity::High, false,
                "Configuration file is not valid TOML",
                "Fix the TOML syntax"),
            (config::CONFIG_INVALID, "Config", Severity::High, false,
                "Configuration values violate a constraint",
                "Correct the reported configuration value"),
        ];

        entries
            .into_iter()
            .map(|(code, category, severity, recoverable, description, action)| {
                (
                    code.as_str(),
                    ErrorMetadata {
                        code: code.as_str(),
                        category,
                        severity,
                        recoverable,
                        description,
                        recommended_action: action,
                    },
                )
            })
            .collect()
    })
}

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.category)
        .unwrap_or("Unknown")
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Medium)
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.recommended_action)
        .unwrap_or("Consult documentation")
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.recoverable)
        .unwrap_or(false)
}
