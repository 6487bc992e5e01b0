//! List access, explicit phase calls and printing.

use crate::context::ExecutionContext;
use crate::errors::EvalResult;
use crate::lists;
use crate::node::Node;
use crate::ristic::Primitive;

use super::map_parameters;

/// Parameters themselves when there are none to work on.
fn echo(parms: &Node) -> impl FnOnce(&mut ExecutionContext) -> EvalResult + '_ {
    move |_| Ok(parms.clone())
}

fn nil(_: &mut ExecutionContext) -> EvalResult {
    Ok(Node::nil())
}

pub(super) fn head(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(ctx, parms, |_, e| Ok(e.head_element()), echo(parms))
}

pub(super) fn tail(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |_, e| Ok(lists::new_data(e.elements().tail(), e.span())),
        echo(parms),
    )
}

pub(super) fn end(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(ctx, parms, |_, e| Ok(e.end_element()), echo(parms))
}

pub(super) fn front(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |_, e| Ok(lists::new_data(e.elements().front(), e.span())),
        echo(parms),
    )
}

/// `(append a b c)`: `b` and `c` stepped and appended to `a` in turn.
pub(super) fn append(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    let es = parms.elements().parameters(ctx)?;
    let Some((first, rest)) = es.split_first() else {
        return Ok(parms.clone());
    };
    if rest.is_empty() {
        return Ok(first.clone());
    }
    let mut list = first.step(ctx)?;
    for e in rest {
        let e = e.step(ctx)?;
        list = lists::new_data(list.elements().append(&e), parms.span());
    }
    Ok(list)
}

pub(super) fn dealias(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |ctx, e| e.evaluate(ctx)?.dealias(ctx),
        echo(parms),
    )
}

pub(super) fn bind(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |ctx, e| {
            let e = e.evaluate(ctx)?;
            ctx.bind(&e)
        },
        nil,
    )
}

/// `(step x)` binds `x` and steps it once. Data is read as a call: the head
/// is stepped with the rest as its parameters.
pub(super) fn step(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |ctx, e| {
            let bound = ctx.bind(e)?;
            if !bound.is_data() {
                return bound.step(ctx);
            }
            let es = bound.elements().expanded(ctx)?;
            match es.split_first() {
                None => Ok(Node::nil()),
                Some((head, [])) => head.step(ctx),
                Some((head, rest)) => {
                    head.step_with(ctx, &lists::data_of(rest.to_vec(), bound.span()))
                }
            }
        },
        nil,
    )
}

pub(super) fn evaluate(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |ctx, e| {
            let e = e.evaluate(ctx)?;
            ctx.bind(&e)?.evaluate(ctx)
        },
        nil,
    )
}

pub(super) fn reduce(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |ctx, e| {
            let e = e.evaluate(ctx)?;
            ctx.bind(&e)?.reduce(ctx)
        },
        nil,
    )
}

/// What `print` does to each parameter before rendering it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum PrintMode {
    AsIs,
    Evaluate,
    Reduce,
    Bind,
}

/// Decode the mode option: 0 to 4 print, 5 to 9 the extended rendering.
fn print_mode(code: i32) -> (PrintMode, bool) {
    let mode = match code % 5 {
        1 => PrintMode::Evaluate,
        2 => PrintMode::Reduce,
        3 => PrintMode::Bind,
        _ => PrintMode::AsIs,
    };
    (mode, code >= 5)
}

/// `(prim #core #print [mode])`: write each parameter on its own line.
pub(super) fn print(ctx: &mut ExecutionContext, prim: &Primitive, parms: &Node) -> EvalResult {
    let code = prim
        .extra()
        .first()
        .and_then(Node::as_number)
        .map_or(0, |n| n.to_i32());
    let (mode, extended) = print_mode(code);
    for e in parms.elements().parameters(ctx)? {
        let e = match mode {
            PrintMode::AsIs => e,
            PrintMode::Evaluate => e.evaluate(ctx)?,
            PrintMode::Reduce => e.reduce(ctx)?,
            PrintMode::Bind => ctx.bind(&e)?,
        };
        let text = if extended {
            let mut out = String::new();
            e.xprint(&mut out);
            out
        } else {
            e.to_string()
        };
        ctx.runtime().config().print.println(&text);
    }
    Ok(Node::nil())
}
