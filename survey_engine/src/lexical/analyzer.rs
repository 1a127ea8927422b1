//! Condition lexer
//!
//! Splitting is two-level: the normalized text is first cut on ` OU `, then
//! each block on ` ET `. Connectives match ASCII case-insensitively and need a
//! space on each side, so `OUI` or `ETAGE` inside a value never split.

use crate::config::constants::compile_time::condition::*;
use crate::logging::codes;
use crate::tokens::{Connective, TokenStream};
use crate::utils::Span;
use crate::log_debug;

/// Condition limit violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Condition too long: {length} bytes (max {MAX_CONDITION_LENGTH})")]
    ConditionTooLong { length: usize },

    #[error("Too many terms in condition: {count} (max {MAX_CONDITION_ATOMS})")]
    TooManyAtoms { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::ConditionTooLong { .. } => codes::condition::CONDITION_TOO_LONG,
            LexerError::TooManyAtoms { .. } => codes::condition::TOO_MANY_ATOMS,
        }
    }
}

/// Counters for the last tokenized condition
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub atoms: usize,
    pub and_connectives: usize,
    pub or_connectives: usize,
    /// Whether one layer of surrounding quotes was removed
    pub unquoted: bool,
}

/// Strip surrounding whitespace and one layer of matching quotes.
///
/// `"'9 = Oui'"` becomes `9 = Oui`. Mismatched or lone quotes are kept.
pub fn normalize_condition(raw: &str) -> &str {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && QUOTE_CHARS.contains(&first) => {
            // quote characters are single-byte
            trimmed[1..trimmed.len() - 1].trim()
        }
        _ => trimmed,
    }
}

#[derive(Debug, Default)]
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a raw condition. Blank input yields an empty stream.
    pub fn tokenize(&mut self, raw: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        let length = raw.trim().len();
        if length > MAX_CONDITION_LENGTH {
            return Err(LexerError::ConditionTooLong { length });
        }

        let source = normalize_condition(raw);
        self.metrics.unquoted = source.len() != length;
        let mut stream = TokenStream::new(source);
        if source.is_empty() {
            return Ok(stream);
        }

        let blocks = split_on_keyword(source, 0, source.len(), OR_KEYWORD);
        for (block_index, &(block_start, block_end)) in blocks.iter().enumerate() {
            if block_index > 0 {
                let previous_end = blocks[block_index - 1].1;
                stream.push_connective(Connective::Or, Span::new(previous_end, block_start));
                self.metrics.or_connectives += 1;
            }

            let atoms = split_on_keyword(source, block_start, block_end, AND_KEYWORD);
            for (atom_index, &(atom_start, atom_end)) in atoms.iter().enumerate() {
                if atom_index > 0 {
                    let previous_end = atoms[atom_index - 1].1;
                    stream.push_connective(Connective::And, Span::new(previous_end, atom_start));
                    self.metrics.and_connectives += 1;
                }

                let raw_atom = &source[atom_start..atom_end];
                let leading = raw_atom.len() - raw_atom.trim_start().len();
                let trimmed = raw_atom.trim();
                let start = atom_start + leading;
                stream.push_atom(trimmed, Span::new(start, start + trimmed.len()));

                self.metrics.atoms += 1;
                if self.metrics.atoms > MAX_CONDITION_ATOMS {
                    return Err(LexerError::TooManyAtoms {
                        count: count_atoms(source),
                    });
                }
            }
        }

        log_debug!("Condition tokenized",
            "atoms" => self.metrics.atoms,
            "and" => self.metrics.and_connectives,
            "or" => self.metrics.or_connectives
        );

        Ok(stream)
    }
}

/// Byte ranges of `source[start..end]` between occurrences of ` KEYWORD `
fn split_on_keyword(source: &str, start: usize, end: usize, keyword: &str) -> Vec<(usize, usize)> {
    let bytes = source.as_bytes();
    let width = keyword.len() + 2;
    let mut segments = Vec::new();
    let mut segment_start = start;
    let mut cursor = start;

    while cursor + width <= end {
        if is_connective_at(bytes, cursor, keyword) {
            segments.push((segment_start, cursor));
            cursor += width;
            segment_start = cursor;
        } else {
            cursor += 1;
        }
    }
    segments.push((segment_start, end));
    segments
}

fn is_connective_at(bytes: &[u8], at: usize, keyword: &str) -> bool {
    let width = keyword.len() + 2;
    if at + width > bytes.len() {
        return false;
    }
    bytes[at] == b' '
        && bytes[at + width - 1] == b' '
        && bytes[at + 1..at + width - 1].eq_ignore_ascii_case(keyword.as_bytes())
}

/// Full atom count, used only to report the size of an oversized condition
fn count_atoms(source: &str) -> usize {
    split_on_keyword(source, 0, source.len(), OR_KEYWORD)
        .into_iter()
        .map(|(s, e)| split_on_keyword(source, s, e, AND_KEYWORD).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize_condition;
    use crate::tokens::Token;
    use assert_matches::assert_matches;

    fn atoms(stream: &TokenStream) -> Vec<String> {
        stream
            .iter()
            .filter_map(|t| match &t.value {
                Token::Atom(text) => Some(text.clone()),
                Token::Connective(_) => None,
            })
            .collect()
    }

    fn connectives(stream: &TokenStream) -> Vec<Connective> {
        stream.iter().filter_map(|t| t.value.as_connective()).collect()
    }

    #[test]
    fn test_normalize_strips_one_quote_layer() {
        assert_eq!(normalize_condition("  \"9 = Oui\"  "), "9 = Oui");
        assert_eq!(normalize_condition("'\"9 = Oui\"'"), "\"9 = Oui\"");
        assert_eq!(normalize_condition("\"9 = Oui'"), "\"9 = Oui'");
        assert_eq!(normalize_condition("\""), "\"");
        assert_eq!(normalize_condition("   "), "");
    }

    #[test]
    fn test_or_splits_before_and() {
        let stream = tokenize_condition("9 = Oui ET 10 = Non OU 11 = Oui").unwrap();
        assert_eq!(atoms(&stream), vec!["9 = Oui", "10 = Non", "11 = Oui"]);
        assert_eq!(connectives(&stream), vec![Connective::And, Connective::Or]);
    }

    #[test]
    fn test_connectives_are_case_insensitive() {
        let stream = tokenize_condition("9 = Oui et 10 = Non ou 11 = oui").unwrap();
        assert_eq!(atoms(&stream).len(), 3);
        assert_eq!(connectives(&stream), vec![Connective::And, Connective::Or]);
    }

    #[test]
    fn test_connective_words_inside_values_do_not_split() {
        let stream = tokenize_condition("12 = OUI ET 13 = Etage OU 14 = Nouvelle").unwrap();
        assert_eq!(atoms(&stream), vec!["12 = OUI", "13 = Etage", "14 = Nouvelle"]);

        let stream = tokenize_condition("9 = Oui ET").unwrap();
        assert_eq!(atoms(&stream), vec!["9 = Oui ET"]);
    }

    #[test]
    fn test_spans_point_into_normalized_source() {
        let stream = tokenize_condition("\"9 = Oui OU  10 = Non\"").unwrap();
        assert_eq!(stream.source(), "9 = Oui OU  10 = Non");
        let second = &stream.tokens()[2];
        assert_eq!(second.span.slice(stream.source()), "10 = Non");
        let connective = &stream.tokens()[1];
        assert_eq!(connective.span.slice(stream.source()), " OU ");
    }

    #[test]
    fn test_non_ascii_values() {
        let stream = tokenize_condition("Intitulé = Hôtel de Ville ET 3 = Réalisé").unwrap();
        assert_eq!(atoms(&stream), vec!["Intitulé = Hôtel de Ville", "3 = Réalisé"]);
    }

    #[test]
    fn test_blank_condition_is_empty_stream() {
        assert!(tokenize_condition("   ").unwrap().is_empty());
        assert!(tokenize_condition("''").unwrap().is_empty());
    }

    #[test]
    fn test_length_limit() {
        let raw = "x".repeat(MAX_CONDITION_LENGTH + 1);
        let error = tokenize_condition(&raw).unwrap_err();
        assert_matches!(error, LexerError::ConditionTooLong { .. });
        assert_eq!(error.error_code(), codes::condition::CONDITION_TOO_LONG);
    }

    #[test]
    fn test_atom_limit() {
        let raw = vec!["1 = a"; MAX_CONDITION_ATOMS + 2].join(" OU ");
        assert_matches!(
            tokenize_condition(&raw),
            Err(LexerError::TooManyAtoms { count }) if count == MAX_CONDITION_ATOMS + 2
        );

        let at_limit = vec!["1 = a"; MAX_CONDITION_ATOMS].join(" ET ");
        assert!(tokenize_condition(&at_limit).is_ok());
    }

    #[test]
    fn test_metrics() {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer.tokenize("'1 = a ET 2 = b OU 3 = c'").unwrap();
        assert_eq!(
            analyzer.metrics(),
            &LexicalMetrics {
                atoms: 3,
                and_connectives: 1,
                or_connectives: 1,
                unquoted: true,
            }
        );
    }
}
