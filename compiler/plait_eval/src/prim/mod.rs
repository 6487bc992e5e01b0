//! Native functions reachable through `(prim class method)`.
//!
//! Two classes are registered:
//! - `core`: list access, explicit phase calls, definitions, namespaces and
//!   printing
//! - `operators`: arithmetic
//!
//! Most primitives share one shape: no parameters answers a fallback, one
//! parameter answers the function applied to it, several answer data of the
//! function applied to each.

mod basics;
mod namespaces;
mod operators;

use rustc_hash::FxHashMap;

use crate::context::ExecutionContext;
use crate::errors::EvalResult;
use crate::lists;
use crate::node::Node;
use crate::ristic::PrimitiveFn;

pub const CORE: &str = "core";
pub const OPERATORS: &str = "operators";

/// Every registered primitive, keyed by (class, method).
pub(crate) fn primitive_table() -> FxHashMap<(&'static str, &'static str), PrimitiveFn> {
    let entries: &[(&'static str, &'static str, PrimitiveFn)] = &[
        (CORE, "head", basics::head),
        (CORE, "tail", basics::tail),
        (CORE, "end", basics::end),
        (CORE, "front", basics::front),
        (CORE, "append", basics::append),
        (CORE, "dealias", basics::dealias),
        (CORE, "bind", basics::bind),
        (CORE, "step", basics::step),
        (CORE, "evaluate", basics::evaluate),
        (CORE, "reduce", basics::reduce),
        (CORE, "print", basics::print),
        (CORE, "define", namespaces::define),
        (CORE, "undefine", namespaces::undefine),
        (CORE, "namespace", namespaces::namespace),
        (CORE, "parent-namespace", namespaces::parent_namespace),
        (CORE, "new-namespace", namespaces::new_namespace),
        (CORE, "set-namespace", namespaces::set_namespace),
        (CORE, "push-private-namespace", namespaces::push_private_namespace),
        (CORE, "push-public-namespace", namespaces::push_public_namespace),
        (OPERATORS, "add", operators::add),
        (OPERATORS, "subtract", operators::subtract),
        (OPERATORS, "multiply", operators::multiply),
        (OPERATORS, "divide", operators::divide),
        (OPERATORS, "remainder", operators::remainder),
        (OPERATORS, "negate", operators::negate),
    ];
    entries
        .iter()
        .map(|&(class, method, f)| ((class, method), f))
        .collect()
}

/// Apply `f` to each of `es`: nothing gives `fallback()`, one gives its
/// result, several give data of the results.
fn each_parameter(
    ctx: &mut ExecutionContext,
    es: Vec<Node>,
    parms: &Node,
    mut f: impl FnMut(&mut ExecutionContext, &Node) -> EvalResult,
    fallback: impl FnOnce(&mut ExecutionContext) -> EvalResult,
) -> EvalResult {
    match es.as_slice() {
        [] => fallback(ctx),
        [single] => f(ctx, single),
        _ => {
            let mut out = Vec::with_capacity(es.len());
            for e in &es {
                out.push(f(ctx, e)?);
            }
            Ok(lists::data_of(out, parms.span()))
        }
    }
}

/// `each_parameter` over the parameters of `parms`, variables resolved.
fn map_parameters(
    ctx: &mut ExecutionContext,
    parms: &Node,
    f: impl FnMut(&mut ExecutionContext, &Node) -> EvalResult,
    fallback: impl FnOnce(&mut ExecutionContext) -> EvalResult,
) -> EvalResult {
    let es = parms.elements().parameters(ctx)?;
    each_parameter(ctx, es, parms, f, fallback)
}

#[cfg(test)]
mod tests;
