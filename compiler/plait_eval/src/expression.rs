//! Binding of written expressions.
//!
//! `( ... )` binds element by element. A bound syntax form at the head takes
//! over the whole expression. A binding pipeline runs at once on everything
//! to its right and its result is injected in its place, after which binding
//! resumes at that position. What is left is compiled into a production, or
//! becomes data or a bound expression when there is nothing to compile.
//!
//! `[ ... ]` binds its elements and yields data.

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::EvalResult;
use crate::lists;
use crate::node::{BoundExpr, ExprKind, Node};
use crate::pipeline::map_execute;
use crate::production::new_production;
use crate::ristic;
use crate::stack::ensure_sufficient_stack;

/// Bind an expression of the given bracket kind.
pub fn bind_expression(
    ctx: &mut ExecutionContext,
    source: &Node,
    kind: ExprKind,
    elements: &Elements,
) -> EvalResult {
    if elements.is_empty() {
        return Ok(Node::nil());
    }
    ensure_sufficient_stack(|| {
        ctx.with_flow(source, |ctx| match kind {
            ExprKind::Prod => bind_prod(ctx, source, elements),
            ExprKind::Data => bind_data(ctx, source, elements),
        })
    })
}

fn bind_prod(ctx: &mut ExecutionContext, source: &Node, elements: &Elements) -> EvalResult {
    let mut es = elements.expanded(ctx)?;
    let mut reducing = false;
    let mut i = 0;
    while i < es.len() {
        let e = es[i].bind(ctx)?;
        es[i] = e.clone();

        if i == 0 && e.as_ristic().is_some_and(ristic::Ristic::is_bound) {
            return ristic::head_ristic_reduction(ctx, source, &es);
        }

        if let Some(pipe) = e.as_binding_pipeline().map(Arc::clone) {
            reducing = true;
            let map = map_execute(&pipe, &es, i, i, es.len() - 1)?;
            let parms = lists::data_of(map.parms.clone(), e.span());
            let result = map.prod.binding_step_with(ctx, &parms)?;
            // A pipeline answering itself would be rebound forever.
            let unchanged = result.ptr_eq(&e);
            let map = map.inject(ctx, result)?;
            es = map.elements;
            i = if unchanged { map.iep + 1 } else { map.iep };
            continue;
        }
        i += 1;
    }
    reduce_expression(source, Elements::make(es), reducing)
}

fn reduce_expression(source: &Node, es: Elements, reducing: bool) -> EvalResult {
    if reducing {
        if let [single] = es.as_slice() {
            return Ok(single.clone());
        }
    }
    if es.give_production() {
        return new_production(es, source.span());
    }
    if !es.are_bound() {
        return Ok(unbound_prod(es, source));
    }
    Ok(lists::new_data(es, source.span()))
}

fn bind_data(ctx: &mut ExecutionContext, source: &Node, elements: &Elements) -> EvalResult {
    let arr = elements.expanded(ctx)?;
    let mut bound = true;
    let mut es = Vec::with_capacity(arr.len());
    for e in arr {
        if e.is_bound() {
            es.push(e);
            continue;
        }
        let b = e.bind(ctx)?;
        bound &= b.is_bound();
        es.push(b);
    }
    if let [single] = es.as_slice() {
        if single.is_atomic() {
            return Ok(single.clone());
        }
    }
    let es = Elements::make(es);
    if !bound {
        return Ok(Node::bound_expr(
            BoundExpr {
                kind: ExprKind::Data,
                elements: es,
                bind: false,
                names: false,
            },
            source.span(),
        ));
    }
    Ok(lists::new_data(es, source.span()))
}

/// Production expression that stays unresolved until bound again.
pub(crate) fn unbound_prod(elements: Elements, source: &Node) -> Node {
    Node::bound_expr(
        BoundExpr {
            kind: ExprKind::Prod,
            elements,
            bind: false,
            names: false,
        },
        source.span(),
    )
}
