//! OR-of-AND reduction

use super::error::ConditionResult;
use super::ConditionContext;
use crate::syntax::{AndBlock, ConditionExpr};

impl AndBlock {
    /// True when every term holds; stops at the first false term
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> ConditionResult<bool> {
        for term in &self.terms {
            if !term.evaluate(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl ConditionExpr {
    /// True when any block holds; stops at the first true block.
    ///
    /// A failing term aborts the whole evaluation, but terms after a
    /// short-circuit are never looked at.
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> ConditionResult<bool> {
        for block in self.blocks() {
            if block.evaluate(ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
