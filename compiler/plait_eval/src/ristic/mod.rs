//! Syntax forms ("ristics").
//!
//! A ristic class is a named descriptor bound in the core namespace. When a
//! bound class or instance heads a production expression it takes over the
//! binding of that expression: a class turns the remaining elements into a
//! configured instance, an instance turns them into its product (a pipeline,
//! a splice, a primitive call and so on).
//!
//! A class that cannot be configured yet, because its options mention
//! variables or are incomplete, answers an unbound ristic that re-runs the
//! class when bound again.
//!
//! New classes are declared at run time through the bootstrap class
//! `.ristic`, which pairs a name with a registered implementation.

mod forms;
mod pipe;
mod prim;

use std::sync::Arc;

use plait_ir::{Span, Symbol};
use tracing::debug;

pub use forms::{ExprClass, SimpleForm, SimpleFormClass};
pub use pipe::{PipeClass, PipeInstance};
pub use prim::{PrimClass, Primitive, PrimitiveFn};

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::{
    invalid_ristic_parameters, ristic_validation, EvalError, EvalErrorKind, EvalResult,
};
use crate::lists;
use crate::node::{ExprKind, Node, NodeKind};

/// Descriptor of a syntax form.
pub trait RisticClass: Send + Sync {
    /// Name the class was declared under.
    fn name(&self) -> Symbol;

    /// Configure an instance from `parms`. `class` is the node holding this
    /// class, kept by unbound forms and instances.
    fn ristic_reduce(&self, ctx: &mut ExecutionContext, class: &Node, parms: &Node) -> EvalResult;
}

/// A configured syntax form.
pub trait RisticInstance: Send + Sync {
    fn class(&self) -> &Node;

    /// Options the instance was configured with.
    fn options(&self) -> &Elements;

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult;
}

/// Constructor registered for an implementation name.
pub type RisticFactory = fn(Symbol) -> Arc<dyn RisticClass>;

#[derive(Clone)]
pub enum Ristic {
    /// Class node followed by the parameters it could not use yet.
    Unbound(Elements),
    Class(Arc<dyn RisticClass>),
    Instance(Arc<dyn RisticInstance>),
}

impl Ristic {
    pub fn is_bound(&self) -> bool {
        !matches!(self, Ristic::Unbound(_))
    }

    pub fn elements(&self) -> Elements {
        match self {
            Ristic::Unbound(es) => es.clone(),
            Ristic::Class(_) => Elements::Empty,
            Ristic::Instance(i) => i.options().clone(),
        }
    }
}

/// Unbound form of `class` over `parms`.
pub fn new_unbound(class: &Node, parms: &[Node], span: Span) -> Node {
    let mut es = Vec::with_capacity(parms.len() + 1);
    es.push(class.clone());
    es.extend_from_slice(parms);
    Node::new(NodeKind::Ristic(Ristic::Unbound(Elements::make(es))), span)
}

pub fn class_node(class: Arc<dyn RisticClass>) -> Node {
    Node::new(NodeKind::Ristic(Ristic::Class(class)), Span::DUMMY)
}

pub fn instance_node(instance: Arc<dyn RisticInstance>, span: Span) -> Node {
    Node::new(NodeKind::Ristic(Ristic::Instance(instance)), span)
}

/// Step a syntax form with `parms`.
pub(crate) fn ristic_step(ctx: &mut ExecutionContext, node: &Node, parms: &Node) -> EvalResult {
    match node.as_ristic() {
        Some(Ristic::Class(c)) => {
            let c = Arc::clone(c);
            reduce_checked(ctx, |ctx| c.ristic_reduce(ctx, node, parms))
        }
        Some(Ristic::Instance(i)) => {
            let i = Arc::clone(i);
            reduce_checked(ctx, |ctx| i.ristic_reduce(ctx, parms))
        }
        Some(Ristic::Unbound(es)) => bind_unbound(ctx, node, &es.clone()),
        None => Ok(node.clone()),
    }
}

/// Re-run the class of an unbound form with its current parameters.
pub(crate) fn bind_unbound(ctx: &mut ExecutionContext, this: &Node, es: &Elements) -> EvalResult {
    ctx.with_flow(this, |ctx| {
        let es = es.parameters(ctx)?;
        let Some((class, rest)) = es.split_first() else {
            return Ok(Node::nil());
        };
        let Some(Ristic::Class(c)) = class.as_ristic() else {
            return Err(invalid_ristic_parameters("Ristic class expected").or_span(class.span()));
        };
        let c = Arc::clone(c);
        let parms = lists::data_of(rest.to_vec(), this.span());
        reduce_checked(ctx, |ctx| c.ristic_reduce(ctx, class, &parms))
    })
}

/// Hand a bound form at the head of `es` the rest of the expression.
///
/// A form whose variables belong to a pipeline still being declared cannot
/// run yet; the expression is handed back unbound so it binds again later.
pub(crate) fn head_ristic_reduction(
    ctx: &mut ExecutionContext,
    source: &Node,
    es: &[Node],
) -> EvalResult {
    let Some((head, rest)) = es.split_first() else {
        return Ok(Node::nil());
    };
    let parms = lists::data_of(rest.to_vec(), source.span());
    match ristic_step(ctx, head, &parms) {
        Err(e)
            if e
                .missing_variable_pipe()
                .is_some_and(|pipe| ctx.is_declared_pipe(pipe)) =>
        {
            debug!(form = %head, "deferring syntax form until its pipeline exists");
            Ok(Node::expr(
                ExprKind::Prod,
                Elements::make(es.to_vec()),
                source.span(),
            ))
        }
        result => result,
    }
}

/// Validation failures are bind errors: they join the collected ones and
/// come back as the aggregate.
fn reduce_checked(
    ctx: &mut ExecutionContext,
    f: impl FnOnce(&mut ExecutionContext) -> EvalResult,
) -> EvalResult {
    match f(ctx) {
        Err(e) if matches!(e.kind, EvalErrorKind::RisticValidation { .. }) => {
            ctx.add_bind_error(e);
            Err(ctx.take_bind_aggregate())
        }
        result => result,
    }
}

/// Collects every problem found in a form's options.
pub(crate) struct Validation {
    form: String,
    errors: Vec<EvalError>,
}

impl Validation {
    pub(crate) fn new(form: impl Into<String>) -> Self {
        Validation {
            form: form.into(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, at: &Node, reason: impl Into<String>) {
        self.errors
            .push(invalid_ristic_parameters(reason).or_span(at.span()));
    }

    pub(crate) fn finish(self, at: &Node) -> EvalResult<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ristic_validation(self.form, self.errors).or_span(at.span()))
    }
}

/// Validation failure carrying one error.
pub(crate) fn rejected(form: &str, at: &Node, e: EvalError) -> EvalError {
    ristic_validation(form, vec![e]).or_span(at.span())
}

/// Single-problem validation failure.
pub(crate) fn invalid(form: &str, at: &Node, reason: &str) -> EvalError {
    rejected(form, at, invalid_ristic_parameters(reason).or_span(at.span()))
}

/// Symbol atom, seen through definitions.
pub(crate) fn symbol_of(node: &Node) -> Option<Symbol> {
    match node.target().kind() {
        NodeKind::Symbol(s) => Some(*s),
        _ => None,
    }
}

/// The bootstrap class: `(.ristic name implementation)`.
pub struct DotRistic {
    name: Symbol,
}

impl DotRistic {
    pub fn new(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(DotRistic { name })
    }
}

impl RisticClass for DotRistic {
    fn name(&self) -> Symbol {
        self.name
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, class: &Node, parms: &Node) -> EvalResult {
        let elements = parms.elements().bind_names(ctx)?;
        let es = elements.as_slice();
        if es.len() > 2 {
            return Err(invalid(".ristic", parms, "Only two parameters required"));
        }
        if elements.has_variable_elements() || es.len() < 2 {
            return Ok(new_unbound(class, es, parms.span()));
        }
        let Some(name) = symbol_of(&es[0]) else {
            return Err(invalid(".ristic", &es[0], "Symbol expected for Ristic class name"));
        };
        let Some(implementation) = symbol_of(&es[1]) else {
            return Err(invalid(
                ".ristic",
                &es[1],
                "Symbol expected for Ristic class implementation name",
            ));
        };
        ctx.runtime()
            .declare_ristic(name, implementation)
            .map_err(|e| rejected(".ristic", parms, e))
    }
}
