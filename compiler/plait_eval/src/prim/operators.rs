//! Arithmetic primitives. Operands are folded left to right; a lone operand
//! is combined with the zero value of its own type, so `(- 5)` is `-5`.

use crate::context::ExecutionContext;
use crate::errors::EvalResult;
use crate::node::{ArithOp, Node};
use crate::ristic::Primitive;

use super::map_parameters;

fn run_op(ctx: &mut ExecutionContext, op: ArithOp, parms: &Node) -> EvalResult {
    let es = parms.elements().parameters(ctx)?;
    let Some((first, rest)) = es.split_first() else {
        return Ok(Node::nil());
    };
    let mut acc = first.step(ctx)?;
    if rest.is_empty() {
        return acc.zero_value().arith(ctx, op, &acc);
    }
    for e in rest {
        let e = e.step(ctx)?;
        acc = acc.arith(ctx, op, &e)?;
    }
    Ok(acc)
}

pub(super) fn add(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    run_op(ctx, ArithOp::Add, parms)
}

pub(super) fn subtract(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    run_op(ctx, ArithOp::Sub, parms)
}

pub(super) fn multiply(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    run_op(ctx, ArithOp::Mul, parms)
}

pub(super) fn divide(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    run_op(ctx, ArithOp::Div, parms)
}

pub(super) fn remainder(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    run_op(ctx, ArithOp::Rem, parms)
}

pub(super) fn negate(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |ctx, e| e.step(ctx)?.neg(ctx),
        |_| Ok(Node::nil()),
    )
}
