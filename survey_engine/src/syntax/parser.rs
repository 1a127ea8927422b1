//! Condition parser
//!
//! Turns the token stream into OR-of-AND blocks and each atom into a
//! [`Term`]. Atoms that are not comparisons become [`Term::Malformed`] rather
//! than errors; the only failures are the lexer's limit checks.

use super::nodes::*;
use crate::config::constants::compile_time::condition::{
    EQUAL_OPERATOR, NOT_EQUAL_OPERATOR, QUOTE_CHARS,
};
use crate::lexical::{LexerError, LexicalAnalyzer};
use crate::tokens::{Connective, Token, TokenStream};
use crate::utils::Span;

/// Parse a raw condition string
pub fn parse_condition(raw: &str) -> Result<ParsedCondition, LexerError> {
    ConditionParser::new().parse(raw)
}

#[derive(Debug, Default)]
pub struct ConditionParser {
    analyzer: LexicalAnalyzer,
}

impl ConditionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, raw: &str) -> Result<ParsedCondition, LexerError> {
        let stream = self.analyzer.tokenize(raw)?;
        Ok(build_condition(&stream))
    }
}

fn build_condition(stream: &TokenStream) -> ParsedCondition {
    if stream.is_empty() {
        return ParsedCondition::Unconditional(UnconditionalReason::Empty);
    }

    let mut blocks = Vec::new();
    let mut current = AndBlock::default();
    for token in stream.iter() {
        match &token.value {
            Token::Atom(text) => current.terms.push(parse_term(text, token.span)),
            Token::Connective(Connective::Or) => blocks.push(std::mem::take(&mut current)),
            Token::Connective(Connective::And) => {}
        }
    }
    blocks.push(current);

    let expr = ConditionExpr::new(stream.source(), blocks);
    if expr.valid_term_count() == 0 {
        ParsedCondition::Unconditional(UnconditionalReason::NoValidTerms)
    } else {
        ParsedCondition::Expression(expr)
    }
}

/// Parse one atom such as `9 = Oui`, `Intitulé <> 'Paris'` or `9=Oui`.
///
/// The operator is found by looking for ` <> `, then `<>`, then ` = `, then
/// `=`, and the atom is split on its first occurrence only.
pub fn parse_term(text: &str, span: Span) -> Term {
    let text = text.trim();
    let malformed = |reason| Term::Malformed {
        text: text.to_string(),
        reason,
        span,
    };

    // every not-equal form is tried before any equal form
    let spaced_not_equal = format!(" {} ", NOT_EQUAL_OPERATOR);
    let spaced_equal = format!(" {} ", EQUAL_OPERATOR);
    let candidates = [
        (spaced_not_equal.as_str(), ComparisonOp::NotEqual),
        (NOT_EQUAL_OPERATOR, ComparisonOp::NotEqual),
        (spaced_equal.as_str(), ComparisonOp::Equal),
        (EQUAL_OPERATOR, ComparisonOp::Equal),
    ];

    let Some((position, operator, op)) = candidates
        .iter()
        .find_map(|(operator, op)| text.find(operator).map(|pos| (pos, *operator, *op)))
    else {
        return malformed(MalformedTerm::MissingOperator);
    };

    let key = strip_quotes(&text[..position]);
    let expected = strip_quotes(&text[position + operator.len()..]);

    if key.is_empty() {
        return malformed(MalformedTerm::EmptyKey);
    }

    let key = if is_integer_literal(key) {
        match key.trim_start_matches('+').parse::<u32>() {
            Ok(id) => TermKey::Question(id),
            Err(_) => TermKey::UnknownQuestion(key.to_string()),
        }
    } else {
        TermKey::Project(key.to_string())
    };

    Term::Comparison {
        comparison: Comparison {
            key,
            op,
            expected: expected.to_string(),
        },
        span,
    }
}

/// Trim whitespace and any run of surrounding quote characters
pub(crate) fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| QUOTE_CHARS.contains(&c)).trim()
}

fn is_integer_literal(key: &str) -> bool {
    let digits = key.strip_prefix(['+', '-']).unwrap_or(key);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
