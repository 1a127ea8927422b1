//! Shared primitive types used by the condition lexer and parser.

pub mod span;

pub use span::{Span, Spanned};
