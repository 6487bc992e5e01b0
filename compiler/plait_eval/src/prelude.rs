//! Standard definitions bound in the core namespace at startup.
//!
//! Infix operators are executable pipelines over the `operators` primitives:
//! `+` and `-` at precedence 20, `*`, `/` and `%` at 10, so products group
//! first. List and phase primitives are pipelines taking whatever follows
//! them. Definition and namespace primitives are binding pipelines: they
//! run while the enclosing expression is bound and see their parameters as
//! written. `define` takes exactly the two elements to its right.

use plait_ir::Span;
use tracing::debug;

use crate::builder::ExpressionBuilder;
use crate::context::ExecutionContext;
use crate::errors::EvalResult;
use crate::node::{ExprKind, Node};
use crate::number::Number;
use crate::prim::{CORE, OPERATORS};
use crate::runtime::Runtime;

/// (name, precedence, method)
const INFIX: &[(&str, i32, &str)] = &[
    ("+", 20, "add"),
    ("-", 20, "subtract"),
    ("*", 10, "multiply"),
    ("/", 10, "divide"),
    ("%", 10, "remainder"),
];

/// `core` primitives bound as pipelines over evaluated parameters.
const VALUE_PRIMITIVES: &[&str] = &[
    "head", "tail", "end", "front", "append", "dealias", "bind", "step", "evaluate", "reduce",
    "print",
];

/// `core` primitives bound as binding pipelines over parameters as written.
const BINDING_PRIMITIVES: &[&str] = &[
    "undefine",
    "namespace",
    "parent-namespace",
    "new-namespace",
    "set-namespace",
    "push-private-namespace",
    "push-public-namespace",
];

const D: Span = Span::DUMMY;

fn number(b: &mut ExpressionBuilder, n: i32) {
    b.number(Number::Int32(n), D);
}

/// `(form [precedence] [(#nparms n..)])`
fn pipe_head(
    b: &mut ExpressionBuilder,
    form: &str,
    precedence: Option<i32>,
    nparms: &[i32],
) -> EvalResult<()> {
    b.open(ExprKind::Prod, D);
    b.name(form, D)?;
    if let Some(p) = precedence {
        number(b, p);
    }
    if !nparms.is_empty() {
        b.open(ExprKind::Prod, D);
        b.symbol("nparms", D);
        for &n in nparms {
            number(b, n);
        }
        b.close(ExprKind::Prod, D)?;
    }
    b.close(ExprKind::Prod, D)
}

/// `((form [precedence] [(#nparms n..)]) (prim #class #method #extra..))`
fn piped_prim(
    b: &mut ExpressionBuilder,
    form: &str,
    precedence: Option<i32>,
    nparms: &[i32],
    prim: (&str, &str, &[&str]),
) -> EvalResult<()> {
    let (class, method, extra) = prim;
    b.open(ExprKind::Prod, D);
    pipe_head(b, form, precedence, nparms)?;
    prim_form(b, class, method, extra)?;
    b.close(ExprKind::Prod, D)
}

/// `(prim #class #method #extra..)`
fn prim_form(b: &mut ExpressionBuilder, class: &str, method: &str, extra: &[&str]) -> EvalResult<()> {
    b.open(ExprKind::Prod, D);
    b.name("prim", D)?;
    b.symbol(class, D);
    b.symbol(method, D);
    for opt in extra {
        b.symbol(opt, D);
    }
    b.close(ExprKind::Prod, D)
}

/// Run `build`, bind the single expression it produced and define it as
/// `name` in the core namespace.
fn define_core(
    ctx: &mut ExecutionContext,
    name: &str,
    build: impl FnOnce(&mut ExpressionBuilder) -> EvalResult<()>,
) -> EvalResult<()> {
    let mut b = ExpressionBuilder::new(ctx.runtime());
    build(&mut b)?;
    let source = b.finish()?.into_iter().next().unwrap_or_else(Node::nil);
    let node = ctx.bind(&source)?;
    let sym = ctx.intern(name);
    ctx.runtime().core().add_binding(sym, node)?;
    Ok(())
}

pub(crate) fn install(runtime: &Runtime) -> EvalResult<()> {
    let mut ctx = ExecutionContext::for_startup(runtime.clone());
    for &(name, precedence, method) in INFIX {
        define_core(&mut ctx, name, |b| {
            piped_prim(b, "pipeline", Some(precedence), &[2, 1], (OPERATORS, method, &[]))
        })?;
    }
    define_core(&mut ctx, "neg", |b| {
        piped_prim(b, "pipeline", None, &[], (OPERATORS, "negate", &[]))
    })?;
    for &method in VALUE_PRIMITIVES {
        define_core(&mut ctx, method, |b| {
            piped_prim(b, "pipeline", None, &[], (CORE, method, &[]))
        })?;
    }
    define_core(&mut ctx, "define", |b| {
        piped_prim(b, "bindpipe", None, &[2], (CORE, "define", &[]))
    })?;
    for &method in BINDING_PRIMITIVES {
        define_core(&mut ctx, method, |b| {
            piped_prim(b, "bindpipe", None, &[], (CORE, method, &[]))
        })?;
    }
    define_core(&mut ctx, "new-local-namespace", |b| {
        piped_prim(b, "bindpipe", None, &[], (CORE, "new-namespace", &["local"]))
    })?;
    debug!(
        definitions = INFIX.len() + VALUE_PRIMITIVES.len() + BINDING_PRIMITIVES.len() + 3,
        "prelude installed"
    );
    Ok(())
}
