//! Condition syntax: atoms become comparison terms grouped in OR-of-AND blocks

pub mod nodes;
pub mod parser;

pub use nodes::{
    AndBlock, Comparison, ComparisonOp, ConditionExpr, MalformedTerm, ParsedCondition, Term,
    TermKey, UnconditionalReason,
};
pub use parser::{parse_condition, parse_term, ConditionParser};
