//! Lexical analysis of condition strings
//!
//! Cuts a raw condition into atoms and `ET` / `OU` connectives. The lexer
//! never judges the atoms themselves; malformed terms are the parser's
//! concern.

pub mod analyzer;

pub use analyzer::{normalize_condition, LexerError, LexicalAnalyzer, LexicalMetrics};

use crate::tokens::TokenStream;

/// Tokenize a raw condition with a fresh analyzer
pub fn tokenize_condition(raw: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(raw)
}
