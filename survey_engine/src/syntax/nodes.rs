//! Parsed condition nodes

use crate::answers::QuestionId;
use crate::config::constants::compile_time::condition::{
    AND_KEYWORD, EQUAL_OPERATOR, NOT_EQUAL_OPERATOR, OR_KEYWORD,
};
use crate::utils::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => EQUAL_OPERATOR,
            Self::NotEqual => NOT_EQUAL_OPERATOR,
        }
    }

    /// Apply to already-normalized operands
    pub fn holds(&self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equal => actual == expected,
            Self::NotEqual => actual != expected,
        }
    }
}

/// Left-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TermKey {
    /// Integer key, looked up in the combined answers
    Question(QuestionId),
    /// Integer key no question id can carry (negative or too large).
    /// It is never answered, so the comparison is always false.
    UnknownQuestion(String),
    /// Anything else, looked up in the project context
    Project(String),
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question(id) => write!(f, "{}", id),
            Self::UnknownQuestion(key) | Self::Project(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub key: TermKey,
    pub op: ComparisonOp,
    /// Expected value with quotes and whitespace stripped, original case
    pub expected: String,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key, self.op.symbol(), self.expected)
    }
}

/// Why an atom is not a usable comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MalformedTerm {
    MissingOperator,
    EmptyKey,
}

impl fmt::Display for MalformedTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOperator => f.write_str("no '=' or '<>' operator"),
            Self::EmptyKey => f.write_str("empty key"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Term {
    Comparison { comparison: Comparison, span: Span },
    /// Always evaluates false
    Malformed {
        text: String,
        reason: MalformedTerm,
        span: Span,
    },
}

impl Term {
    pub fn span(&self) -> Span {
        match self {
            Self::Comparison { span, .. } | Self::Malformed { span, .. } => *span,
        }
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            Self::Comparison { comparison, .. } => Some(comparison),
            Self::Malformed { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.comparison().is_some()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison { comparison, .. } => write!(f, "{}", comparison),
            Self::Malformed { text, .. } => f.write_str(text),
        }
    }
}

/// Terms joined by `ET`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AndBlock {
    pub terms: Vec<Term>,
}

/// Blocks joined by `OU`. Parse once, evaluate against many answer states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionExpr {
    source: String,
    blocks: Vec<AndBlock>,
}

impl ConditionExpr {
    pub fn new(source: impl Into<String>, blocks: Vec<AndBlock>) -> Self {
        Self {
            source: source.into(),
            blocks,
        }
    }

    /// Normalized text the term spans refer to
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn blocks(&self) -> &[AndBlock] {
        &self.blocks
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.blocks.iter().flat_map(|b| b.terms.iter())
    }

    pub fn term_count(&self) -> usize {
        self.terms().count()
    }

    pub fn valid_term_count(&self) -> usize {
        self.terms().filter(|t| t.is_valid()).count()
    }

    /// Question ids referenced by valid terms, ascending and deduplicated
    pub fn referenced_questions(&self) -> Vec<QuestionId> {
        let mut ids: Vec<QuestionId> = self
            .terms()
            .filter_map(|t| match t.comparison().map(|c| &c.key) {
                Some(TermKey::Question(id)) => Some(*id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", OR_KEYWORD)?;
            }
            let wrap = block.terms.len() > 1 && self.blocks.len() > 1;
            if wrap {
                f.write_str("(")?;
            }
            for (j, term) in block.terms.iter().enumerate() {
                if j > 0 {
                    write!(f, " {} ", AND_KEYWORD)?;
                }
                write!(f, "{}", term)?;
            }
            if wrap {
                f.write_str(")")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnconditionalReason {
    /// Blank after normalization
    Empty,
    /// No atom contains a usable comparison
    NoValidTerms,
}

/// Outcome of parsing a raw condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParsedCondition {
    /// Treated as no condition: the question is shown
    Unconditional(UnconditionalReason),
    Expression(ConditionExpr),
}

impl ParsedCondition {
    pub fn expression(&self) -> Option<&ConditionExpr> {
        match self {
            Self::Expression(expr) => Some(expr),
            Self::Unconditional(_) => None,
        }
    }
}
