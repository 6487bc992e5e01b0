//! Expression construction from classified leaves.
//!
//! The tokenizer hands over leaf atoms in reading order and reports each
//! bracket as it opens and closes. The builder keeps one open list per
//! nesting level. On close it builds:
//! - nil for an empty list
//! - data when every child is trivial (nothing to bind)
//! - otherwise an expression of the bracket kind, bound later
//!
//! Completed top-level expressions are collected in order.

use tracing::{instrument, trace};

use plait_ir::Span;

use crate::elements::Elements;
use crate::errors::{
    mismatched_brackets, missing_end_of_expression, missing_start_of_expression, EvalResult,
};
use crate::lists;
use crate::name::UnboundName;
use crate::node::{ExprKind, Node};
use crate::number::Number;
use crate::runtime::Runtime;
use crate::trivalent::Trivalent;

struct OpenList {
    kind: ExprKind,
    start: Span,
    children: Vec<Node>,
    trivial: bool,
}

/// Builds nodes from a stream of leaves and brackets.
pub struct ExpressionBuilder {
    runtime: Runtime,
    open: Vec<OpenList>,
    done: Vec<Node>,
}

impl ExpressionBuilder {
    pub fn new(runtime: &Runtime) -> Self {
        ExpressionBuilder {
            runtime: runtime.clone(),
            open: Vec::new(),
            done: Vec::new(),
        }
    }

    /// Number of lists currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Add any already-built node at the current level.
    pub fn node(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(list) => {
                list.trivial &= node.is_trivial();
                list.children.push(node);
            }
            None => self.done.push(node),
        }
    }

    pub fn number(&mut self, n: Number, span: Span) {
        self.node(Node::number(n, span));
    }

    pub fn string(&mut self, text: &str, span: Span) {
        self.node(Node::string(text, span));
    }

    pub fn char(&mut self, c: char, span: Span) {
        self.node(Node::char(c, span));
    }

    /// A symbol literal, given without its `#`.
    pub fn symbol(&mut self, text: &str, span: Span) {
        let sym = self.runtime.intern(text);
        self.node(Node::symbol(sym, span));
    }

    /// A name, possibly with a `::` path.
    pub fn name(&mut self, text: &str, span: Span) -> EvalResult<()> {
        let name = UnboundName::parse(self.runtime.interner(), text).map_err(|e| e.or_span(span))?;
        self.node(Node::unbound_name(name, span));
        Ok(())
    }

    pub fn comment(&mut self, text: &str, span: Span) {
        self.node(Node::comment(text, span));
    }

    pub fn trivalent(&mut self, t: Trivalent, span: Span) {
        self.node(Node::trivalent(t, span));
    }

    /// Start a list closed by the matching bracket of `kind`.
    pub fn open(&mut self, kind: ExprKind, span: Span) {
        self.open.push(OpenList {
            kind,
            start: span,
            children: Vec::new(),
            trivial: true,
        });
    }

    /// Close the innermost list with a bracket of `kind`.
    #[instrument(level = "trace", skip(self), fields(depth = self.open.len()))]
    pub fn close(&mut self, kind: ExprKind, span: Span) -> EvalResult<()> {
        let Some(list) = self.open.pop() else {
            return Err(missing_start_of_expression().with_span(span));
        };
        if list.kind != kind {
            return Err(mismatched_brackets().with_span(span));
        }
        let span = list.start.merge(span);
        let node = if list.children.is_empty() {
            Node::nil()
        } else if list.trivial {
            lists::data_of(list.children, span)
        } else {
            Node::expr(kind, Elements::make(list.children), span)
        };
        trace!(trivial = list.trivial, "closed list");
        self.node(node);
        Ok(())
    }

    /// Completed top-level nodes. Fails when a list is still open.
    pub fn finish(self) -> EvalResult<Vec<Node>> {
        if let Some(list) = self.open.first() {
            return Err(missing_end_of_expression().with_span(list.start));
        }
        Ok(self.done)
    }
}

#[cfg(test)]
mod tests;
