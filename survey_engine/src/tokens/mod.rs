//! Token types produced by the condition lexer

pub mod token;

pub use token::{Connective, Token, TokenStream};
