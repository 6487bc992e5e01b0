//! Definitions and namespace control.

use plait_ir::Symbol;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::{duplicate_name, namespace_operation, primitive_error, EvalError, EvalResult};
use crate::lists;
use crate::name::{Define, Name, UnboundName};
use crate::namespace::Namespace;
use crate::node::{ExprKind, Node, NodeKind};
use crate::ristic::Primitive;

use super::{each_parameter, map_parameters};

/// Extra option making `new-namespace` create a local namespace.
const OPT_LOCAL: &str = "local";

/// A name parameter: a name as written, or a symbol spelling one.
fn name_of(ctx: &ExecutionContext, e: &Node) -> EvalResult<Option<Name>> {
    match e.kind() {
        NodeKind::Name(n) => Ok(Some(n.clone())),
        NodeKind::Symbol(s) => UnboundName::parse(ctx.interner(), s.as_str())
            .map(|n| Some(Name::Unbound(n)))
            .map_err(|x| x.or_span(e.span())),
        _ => Ok(None),
    }
}

fn required_name(ctx: &ExecutionContext, e: &Node) -> EvalResult<Name> {
    name_of(ctx, e)?.ok_or_else(|| primitive_error("Invalid name parameter").with_span(e.span()))
}

/// Resolve an unbound name without recording a bind error when it is
/// missing.
fn resolve(ctx: &mut ExecutionContext, name: Name, e: &Node) -> EvalResult<Name> {
    match name {
        Name::Unbound(n) => {
            let bound = ctx.lookup_name(&n, e.span())?;
            Ok(bound.as_name().cloned().unwrap_or(Name::Unbound(n)))
        }
        other => Ok(other),
    }
}

fn dropped_namespace() -> EvalError {
    namespace_operation("Target namespace no longer exists")
}

/// Where a resolved name gets defined: the namespace a path named, else the
/// current one. A name already defined in the current namespace is refused.
fn define_target(ctx: &ExecutionContext, name: &Name) -> EvalResult<(Namespace, Symbol)> {
    let current = ctx.namespace().clone();
    match name {
        Name::Undefined(u) => {
            let ns = u.namespace.upgrade().ok_or_else(dropped_namespace)?;
            Ok((ns, u.symbol))
        }
        Name::Define(d) if d.namespace().is_some_and(|ns| ns.same(&current)) => {
            Err(duplicate_name(d.symbol))
        }
        n => Ok((current, n.symbol())),
    }
}

/// `(define name value)`: bind the value and answer an alias of the new
/// definition.
pub(super) fn define(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    let es = parms.elements().to_vec();
    let [name_parm, value] = es.as_slice() else {
        return Err(primitive_error("Define requires name and definition parameters")
            .with_span(parms.span()));
    };
    let name = required_name(ctx, name_parm)?;
    let name = resolve(ctx, name, name_parm)?;
    let (ns, symbol) = define_target(ctx, &name).map_err(|e| e.or_span(name_parm.span()))?;
    let value = value.resolve_variable(ctx)?;
    let value = ctx.bind(&value)?;
    let value = ns.add_binding(symbol, value)?;
    let span = name_parm.span();
    let def = Node::define(Define::new(&ns, symbol, value), span);
    Ok(Node::alias(Elements::single(def), span))
}

/// `(undefine a b)`: remove each name from the current namespace, or from
/// the namespace its path names. Answers the namespace for each removed
/// name, nil for the others.
pub(super) fn undefine(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    let es = parms.elements().to_vec();
    let mut out = Vec::with_capacity(es.len());
    for e in &es {
        let name = required_name(ctx, e)?;
        let pathed = matches!(&name, Name::Unbound(n) if n.path.is_some());
        let (ns, symbol) = match resolve(ctx, name, e)? {
            Name::Define(d) if pathed => (d.namespace().ok_or_else(dropped_namespace)?, d.symbol),
            Name::Undefined(u) if pathed => {
                (u.namespace.upgrade().ok_or_else(dropped_namespace)?, u.symbol)
            }
            n => (ctx.namespace().clone(), n.symbol()),
        };
        out.push(if ns.remove_binding(symbol) {
            ns.node()
        } else {
            Node::nil()
        });
    }
    Ok(lists::data_of(out, parms.span()))
}

/// `(namespace)` answers the current namespace; `(namespace x)` the
/// namespace `x` is defined in, nil when it is not defined.
pub(super) fn namespace(ctx: &mut ExecutionContext, _: &Primitive, parms: &Node) -> EvalResult {
    map_parameters(
        ctx,
        parms,
        |ctx, e| {
            let Some(name) = name_of(ctx, e)? else {
                return Ok(Node::nil());
            };
            match resolve(ctx, name, e)? {
                Name::Define(d) => Ok(d.namespace().map_or_else(Node::nil, |ns| ns.node())),
                _ => Ok(Node::nil()),
            }
        },
        |ctx| Ok(ctx.namespace().node()),
    )
}

fn parent_node(ns: &Namespace) -> Node {
    ns.parent().map_or_else(Node::nil, |p| p.node())
}

/// `(parent-namespace [ns])`: parent of the given or current namespace.
pub(super) fn parent_namespace(
    ctx: &mut ExecutionContext,
    _: &Primitive,
    parms: &Node,
) -> EvalResult {
    let es = ctx.evaluate_bind_parms(parms)?;
    each_parameter(
        ctx,
        es,
        parms,
        |ctx, e| {
            let e = e.resolve_variable(ctx)?;
            Ok(e.as_namespace().map_or_else(Node::nil, parent_node))
        },
        |ctx| Ok(parent_node(ctx.namespace())),
    )
}

fn namespace_parm(ctx: &mut ExecutionContext, e: &Node, reason: &str) -> EvalResult<Namespace> {
    e.resolve_variable(ctx)?
        .as_namespace()
        .cloned()
        .ok_or_else(|| primitive_error(reason).with_span(e.span()))
}

/// `(new-namespace name [parent])`: a public namespace under the core
/// namespace (or `parent`). With the `local` option the namespace is local
/// to the public namespace (or `parent`). An existing namespace with the
/// same parent is answered as is.
pub(super) fn new_namespace(ctx: &mut ExecutionContext, prim: &Primitive, parms: &Node) -> EvalResult {
    let raw = parms.elements().to_vec();
    match raw.len() {
        0 => return namespace(ctx, prim, parms),
        1 | 2 => {}
        _ => return Err(primitive_error("Too many parameters").with_span(parms.span())),
    }
    let local = prim
        .extra()
        .first()
        .and_then(Node::name_symbol)
        .is_some_and(|s| s.as_str() == OPT_LOCAL);

    // The name is usually not defined yet.
    let es = ctx.with_soft_names(|ctx| ctx.evaluate_bind_parms(parms))?;
    let mut parent = if local {
        ctx.public_namespace().clone()
    } else {
        ctx.runtime().core().clone()
    };
    if let Some(p) = es.get(1) {
        parent = namespace_parm(ctx, p, "Invalid parent namespace")?;
        if parent.is_private() {
            return Err(primitive_error(
                "Private namespace cannot be parent of public or local namespace",
            )
            .with_span(p.span()));
        }
        if !local && parent.is_local() {
            return Err(primitive_error("Local namespace cannot be parent of public namespace")
                .with_span(p.span()));
        }
    }

    if let Some(existing) = es[0].resolve_variable(ctx)?.as_namespace() {
        if existing.parent().as_ref() != Some(&parent) {
            return Err(primitive_error("Existing namespace has a different parent")
                .with_span(es[0].span()));
        }
        return Ok(existing.node());
    }

    let name = required_name(ctx, &raw[0])?;
    if matches!(&name, Name::Unbound(n) if n.path.is_some()) {
        return Err(primitive_error("Name path not allowed for a namespace name")
            .with_span(raw[0].span()));
    }
    let symbol = name.symbol();
    let id = ctx.runtime().pool().next_id();
    let ns = if local {
        Namespace::new_local(id, symbol, &parent)
    } else {
        Namespace::new_public(id, symbol.as_str(), &parent)
    };
    parent.add_binding(symbol, ns.node())
}

/// `(set-namespace ns)`: make `ns` the public namespace of this context.
pub(super) fn set_namespace(ctx: &mut ExecutionContext, prim: &Primitive, parms: &Node) -> EvalResult {
    match parms.elements().len() {
        0 => return namespace(ctx, prim, parms),
        1 => {}
        _ => return Err(primitive_error("Too many parameters").with_span(parms.span())),
    }
    let es = ctx.evaluate_bind_parms(parms)?;
    let Some(e) = es.first() else {
        return namespace(ctx, prim, parms);
    };
    let ns = namespace_parm(ctx, e, "Invalid namespace name")?;
    if ns.is_private() {
        return Err(
            primitive_error("Cannot set a private namespace as public namespace")
                .with_span(e.span()),
        );
    }
    ctx.set_public_namespace(ns.clone());
    Ok(ns.node())
}

/// Bind `es` again as one production expression unless every value is
/// already trivial.
fn rebind(ctx: &mut ExecutionContext, es: Vec<Node>, parms: &Node) -> EvalResult {
    if es.iter().all(Node::is_trivial) {
        return Ok(lists::data_of(es, parms.span()));
    }
    let expr = Node::expr(ExprKind::Prod, Elements::make(es), parms.span());
    ctx.bind(&expr)
}

/// `(push-private-namespace ...)`: bind the rest inside a fresh private
/// namespace.
pub(super) fn push_private_namespace(
    ctx: &mut ExecutionContext,
    _: &Primitive,
    parms: &Node,
) -> EvalResult {
    if parms.elements().is_empty() {
        return Ok(parms.clone());
    }
    ctx.with_private_namespace(|ctx| {
        let es = ctx.evaluate_bind_parms(parms)?;
        rebind(ctx, es, parms)
    })
}

/// `(push-public-namespace ns ...)`: bind the rest with `ns` as the public
/// namespace, then restore the previous one.
pub(super) fn push_public_namespace(
    ctx: &mut ExecutionContext,
    _: &Primitive,
    parms: &Node,
) -> EvalResult {
    let raw = parms.elements().to_vec();
    let [first, rest @ ..] = raw.as_slice() else {
        return Ok(parms.clone());
    };
    if rest.is_empty() {
        return Ok(parms.clone());
    }
    let target = ctx.bind(first)?.evaluate(ctx)?;
    let Some(ns) = target.as_namespace().cloned() else {
        return Err(primitive_error("Missing namespace parameter").with_span(first.span()));
    };
    if ns.is_private() {
        return Err(primitive_error("Invalid use of private namespace").with_span(first.span()));
    }
    let previous = ctx.public_namespace().clone();
    ctx.set_public_namespace(ns);
    let body = lists::data_of(rest.to_vec(), parms.span());
    let result = ctx
        .evaluate_bind_parms(&body)
        .and_then(|es| rebind(ctx, es, parms));
    ctx.set_public_namespace(previous);
    result
}
