//! Binary and unary arithmetic on atoms.
//!
//! The left operand decides. When it does not know the right operand's type
//! it hands over to the right operand's reverse operation, which answers
//! `unknown` unless the right operand is `none`. Data applies the operation
//! element by element; productions and steps are evaluated first.

use plait_ir::Span;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::EvalResult;
use crate::lists;
use crate::number::Number;

use super::{DataKind, Node, NodeKind};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    fn apply(self, a: Number, b: Number) -> EvalResult<Number> {
        match self {
            ArithOp::Add => Ok(a.add(b)),
            ArithOp::Sub => Ok(a.sub(b)),
            ArithOp::Mul => Ok(a.mul(b)),
            ArithOp::Div => a.div(b),
            ArithOp::Rem => a.rem(b),
        }
    }
}

/// Numeric view of an atom: numbers, and chars as their code.
fn numeric(node: &Node) -> Option<Number> {
    match node.kind() {
        NodeKind::Number(n) => Some(*n),
        NodeKind::Char(c) => i32::try_from(u32::from(*c)).ok().map(Number::Int32),
        _ => None,
    }
}

/// Evaluating it yields something else: a production or a complete step.
fn runnable(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Production(_) => true,
        NodeKind::Step(s) => s.is_complete(),
        _ => false,
    }
}

/// Raw text of a string or symbol atom.
fn text_of(node: &Node) -> Option<&str> {
    match node.kind() {
        NodeKind::String(s) => Some(s),
        NodeKind::Symbol(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Same atom type as `like` over new text.
fn text_like(ctx: &ExecutionContext, like: &Node, text: &str, span: Span) -> Node {
    match like.kind() {
        NodeKind::Symbol(_) => Node::symbol(ctx.intern(text), span),
        _ => Node::string(text, span),
    }
}

impl Node {
    /// `self op other`.
    pub fn arith(&self, ctx: &mut ExecutionContext, op: ArithOp, other: &Node) -> EvalResult {
        let (lhs, rhs) = (self.target(), other.target());
        if runnable(lhs) {
            return lhs.evaluate(ctx)?.arith(ctx, op, rhs);
        }
        if runnable(rhs) {
            let rhs = rhs.evaluate(ctx)?;
            return lhs.arith(ctx, op, &rhs);
        }
        let span = lhs.span();
        if let NodeKind::Data(kind, es) = lhs.kind() {
            let mut out = Vec::with_capacity(es.len());
            for e in es.expanded(ctx)? {
                out.push(e.arith(ctx, op, rhs)?);
            }
            let es = Elements::make(out);
            return Ok(match kind {
                DataKind::Injection => lists::new_injected_data(es, span),
                DataKind::Plain | DataKind::Trivial => lists::new_data(es, span),
            });
        }
        if let Some(a) = numeric(lhs) {
            if let Some(b) = numeric(rhs) {
                let n = op.apply(a, b).map_err(|e| e.with_span(span))?;
                return Ok(Node::number(n, span));
            }
            if let (ArithOp::Add, Some(text)) = (op, text_of(rhs)) {
                return Ok(text_like(ctx, rhs, &format!("{a}{text}"), span));
            }
            return Ok(rhs.r_arith(op, lhs));
        }
        match lhs.kind() {
            NodeKind::None => Ok(lhs.clone()),
            NodeKind::Trivalent(_) => Ok(Node::unknown()),
            NodeKind::String(_) | NodeKind::Symbol(_) if op == ArithOp::Add => {
                let left = text_of(lhs).unwrap_or_default();
                let joined = match (text_of(rhs), numeric(rhs)) {
                    (Some(t), _) => format!("{left}{t}"),
                    (None, Some(n)) => format!("{left}{n}"),
                    (None, None) => return Ok(rhs.r_arith(op, lhs)),
                };
                Ok(text_like(ctx, lhs, &joined, span))
            }
            _ => Ok(rhs.r_arith(op, lhs)),
        }
    }

    /// Reverse operation: `_lhs op self` when the left operand gave up.
    pub fn r_arith(&self, _op: ArithOp, _lhs: &Node) -> Node {
        match self.target().kind() {
            NodeKind::None => Node::none(),
            _ => Node::unknown(),
        }
    }

    /// Unary minus; logical not for trivalents.
    pub fn neg(&self, ctx: &mut ExecutionContext) -> EvalResult {
        let this = self.target();
        if let Some(n) = numeric(this) {
            return Ok(Node::number(n.neg(), this.span()));
        }
        match this.kind() {
            NodeKind::Trivalent(t) => Ok(Node::trivalent(t.neg(), this.span())),
            NodeKind::None | NodeKind::Nil => Ok(this.clone()),
            _ if runnable(this) => this.evaluate(ctx)?.neg(ctx),
            NodeKind::Data(_, es) => {
                let mut out = Vec::with_capacity(es.len());
                for e in es.expanded(ctx)? {
                    out.push(e.neg(ctx)?);
                }
                Ok(lists::data_of(out, this.span()))
            }
            _ => Ok(Node::unknown()),
        }
    }
}
