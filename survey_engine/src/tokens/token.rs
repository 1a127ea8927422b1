//! Condition tokens
//!
//! A condition is a flat sequence of atoms separated by connectives. Atoms
//! keep their raw text; the parser decides whether they are valid terms.
use crate::config::constants::compile_time::condition::{AND_KEYWORD, OR_KEYWORD};
use crate::utils::{Span, Spanned};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical connective between atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connective {
    /// `ET`, binds tighter than `OU`
    And,
    /// `OU`
    Or,
}

impl Connective {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => AND_KEYWORD,
            Self::Or => OR_KEYWORD,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Raw text of one atomic term, trimmed
    Atom(String),
    Connective(Connective),
}

impl Token {
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }

    pub fn as_connective(&self) -> Option<Connective> {
        match self {
            Self::Connective(c) => Some(*c),
            Self::Atom(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(text) => f.write_str(text),
            Self::Connective(c) => write!(f, "{}", c),
        }
    }
}

/// Tokens of one normalized condition, with the text they were cut from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    source: String,
    tokens: Vec<Spanned<Token>>,
}

impl TokenStream {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            tokens: Vec::new(),
        }
    }

    pub fn push_atom(&mut self, text: &str, span: Span) {
        self.tokens
            .push(Spanned::new(Token::Atom(text.trim().to_string()), span));
    }

    pub fn push_connective(&mut self, connective: Connective, span: Span) {
        self.tokens
            .push(Spanned::new(Token::Connective(connective), span));
    }

    /// Normalized condition text the spans refer to
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Spanned<Token>] {
        &self.tokens
    }

    pub fn atom_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.value.is_atom()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spanned<Token>> {
        self.tokens.iter()
    }
}
