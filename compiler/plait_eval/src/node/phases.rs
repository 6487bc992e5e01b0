//! Phase operations on nodes.
//!
//! Every node answers `bind`, `step`, `evaluate` and `reduce` plus the
//! binding-time mirrors. The default is to answer the node itself; each
//! variant overrides only the phases it takes part in. Definitions and frame
//! references forward to what they wrap, variables to the value read from
//! the active frame.

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::{evaluator_misuse, variable_not_found, EvalResult};
use crate::expression::bind_expression;
use crate::frame::Frame;
use crate::lists;
use crate::name::{Define, Name, Variable, VariableKind};
use crate::ristic::{self, Ristic};
use crate::stack::ensure_sufficient_stack;

use super::{BoundExpr, DataKind, Node, NodeKind};

/// Rebuild a data container of `kind` over new elements.
fn rebuild_data(kind: DataKind, es: Elements, node: &Node) -> Node {
    match kind {
        DataKind::Injection => lists::new_injected_data(es, node.span()),
        DataKind::Plain | DataKind::Trivial => lists::new_data(es, node.span()),
    }
}

fn is_sink(var: &Variable) -> bool {
    var.kind == VariableKind::Sink
}

impl Node {
    /// Resolve names and compile expressions.
    pub fn bind(&self, ctx: &mut ExecutionContext) -> EvalResult {
        ensure_sufficient_stack(|| match self.kind() {
            NodeKind::Alias(es) if es.are_bound() => Ok(self.clone()),
            NodeKind::Alias(es) => Ok(Node::alias(es.bind(ctx)?, self.span())),
            NodeKind::Name(Name::Unbound(n)) => ctx.bind_name(n, self.span()),
            NodeKind::Name(Name::Undefined(n)) => {
                let defined = n.namespace.upgrade().and_then(|ns| {
                    ns.try_local_bind(n.symbol)
                        .map(|b| Node::define(Define::new(&ns, n.symbol, b), self.span()))
                });
                Ok(defined.unwrap_or_else(|| self.clone()))
            }
            NodeKind::Data(_, es) if es.are_bound() => Ok(self.clone()),
            NodeKind::Data(kind, es) => Ok(rebuild_data(*kind, es.bind(ctx)?, self)),
            NodeKind::Expr(kind, es) => bind_expression(ctx, self, *kind, es),
            NodeKind::BoundExpr(BoundExpr { kind, elements, .. }) => {
                bind_expression(ctx, self, *kind, elements)
            }
            NodeKind::Ristic(Ristic::Unbound(es)) => ristic::bind_unbound(ctx, self, es),
            NodeKind::FrameRef(frame, inner) => Frame::enter(frame, ctx, |ctx| inner.bind(ctx)),
            _ => Ok(self.clone()),
        })
    }

    /// Step without parameters.
    pub fn step(&self, ctx: &mut ExecutionContext) -> EvalResult {
        match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.step(ctx),
            NodeKind::Name(Name::Variable(v)) if !is_sink(v) => {
                self.resolve_variable(ctx)?.step(ctx)
            }
            NodeKind::FrameRef(frame, inner) => Frame::enter(frame, ctx, |ctx| inner.step(ctx)),
            NodeKind::Evaluator(_) => Err(evaluator_misuse("step")),
            _ => Ok(self.clone()),
        }
    }

    /// Step with parameters: run a pipeline, fill a step, apply a form.
    pub fn step_with(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        ensure_sufficient_stack(|| self.step_in(ctx, parms, false))
    }

    /// Binding-time step: binding pipelines run, syntax forms reduce.
    pub fn binding_step_with(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        ensure_sufficient_stack(|| self.step_in(ctx, parms, true))
    }

    fn step_in(&self, ctx: &mut ExecutionContext, parms: &Node, binding: bool) -> EvalResult {
        match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.step_in(ctx, parms, binding),
            NodeKind::Name(Name::Variable(v)) => match v.kind {
                VariableKind::Sink => {
                    let frame = ctx
                        .current_frame()
                        .ok_or_else(|| variable_not_found(v.symbol, v.pipe))?;
                    frame.set_pipe_variable(v, parms.clone())
                }
                VariableKind::Productive => self
                    .resolve_variable(ctx)?
                    .reduce(ctx)?
                    .step_in(ctx, parms, binding),
                VariableKind::Plain | VariableKind::Injecting => {
                    self.resolve_variable(ctx)?.step_in(ctx, parms, binding)
                }
            },
            NodeKind::Expr(..) => self.bind(ctx)?.step_in(ctx, parms, binding),
            NodeKind::Pipeline(p) if binding => p.binding_step(ctx, parms),
            NodeKind::Pipeline(p) if p.is_binding() => Ok(self.clone()),
            NodeKind::Pipeline(p) => p.step(ctx, parms),
            NodeKind::Step(s) => s.step_with(self, ctx, parms, binding),
            NodeKind::Production(_) if binding => {
                self.binding_evaluate(ctx)?.binding_step_with(ctx, parms)
            }
            NodeKind::Production(_) => self.evaluate(ctx)?.step_with(ctx, parms),
            NodeKind::Evaluator(_) if binding => Err(evaluator_misuse("binding_step")),
            NodeKind::Evaluator(_) => Err(evaluator_misuse("step")),
            NodeKind::Ristic(_) => ristic::ristic_step(ctx, self, parms),
            NodeKind::FrameRef(frame, inner) => {
                Frame::enter(frame, ctx, |ctx| inner.step_in(ctx, parms, binding))
            }
            _ => Ok(self.clone()),
        }
    }

    /// Run whatever is runnable: productions execute, complete steps fire.
    pub fn evaluate(&self, ctx: &mut ExecutionContext) -> EvalResult {
        ensure_sufficient_stack(|| self.evaluate_in(ctx, false))
    }

    pub fn binding_evaluate(&self, ctx: &mut ExecutionContext) -> EvalResult {
        ensure_sufficient_stack(|| self.evaluate_in(ctx, true))
    }

    fn evaluate_in(&self, ctx: &mut ExecutionContext, binding: bool) -> EvalResult {
        match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.evaluate_in(ctx, binding),
            NodeKind::Name(Name::Variable(v)) if !is_sink(v) => self.resolve_variable(ctx),
            NodeKind::Data(_, es) if !es.are_reducible() => Ok(self.clone()),
            NodeKind::Data(kind, es) => {
                let es = if binding {
                    es.binding_evaluate(ctx)?
                } else {
                    es.evaluate(ctx)?
                };
                Ok(rebuild_data(*kind, es, self))
            }
            NodeKind::Step(_) => self.step_in(ctx, &Node::nil(), binding),
            NodeKind::Production(p) if binding => p.binding_execute(ctx)?.binding_evaluate(ctx),
            NodeKind::Production(p) => p.execute(ctx)?.evaluate(ctx),
            NodeKind::Evaluator(_) => Err(evaluator_misuse("evaluate")),
            NodeKind::FrameRef(frame, inner) => {
                Frame::enter(frame, ctx, |ctx| inner.evaluate_in(ctx, binding))
            }
            _ => Ok(self.clone()),
        }
    }

    /// Reduce to a value: aliases open up, single-child data collapses, steps
    /// and productions run.
    pub fn reduce(&self, ctx: &mut ExecutionContext) -> EvalResult {
        ensure_sufficient_stack(|| match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.reduce(ctx),
            NodeKind::Name(Name::Variable(v)) if !is_sink(v) => {
                self.resolve_variable(ctx)?.reduce(ctx)
            }
            NodeKind::Alias(es) => match es.as_slice() {
                [] => Ok(Node::nil()),
                [single] => single.reduce(ctx),
                _ => Ok(lists::new_data(es.reduce(ctx)?, self.span())),
            },
            NodeKind::Data(_, es) if !es.are_reducible() => Ok(self.clone()),
            NodeKind::Data(kind, es) => match es.as_slice() {
                [single] if !single.is_injectable() => single.reduce(ctx),
                _ => Ok(rebuild_data(*kind, es.reduce(ctx)?, self)),
            },
            NodeKind::Step(s) if !s.is_complete() => Ok(self.clone()),
            NodeKind::Step(_) => self.step_with(ctx, &Node::nil())?.reduce(ctx),
            NodeKind::Production(p) => p.execute(ctx)?.reduce(ctx),
            NodeKind::Evaluator(_) => Err(evaluator_misuse("reduce")),
            NodeKind::FrameRef(frame, inner) => Frame::enter(frame, ctx, |ctx| inner.reduce(ctx)),
            _ => Ok(self.clone()),
        })
    }

    /// Replace aliases by their contents.
    pub fn dealias(&self, ctx: &mut ExecutionContext) -> EvalResult {
        match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.dealias(ctx),
            NodeKind::Name(Name::Variable(v)) if !is_sink(v) => {
                self.resolve_variable(ctx)?.dealias(ctx)
            }
            NodeKind::Alias(es) => match es.as_slice() {
                [] => Ok(Node::nil()),
                [single] => single.dealias(ctx),
                _ => Ok(lists::new_data(es.dealias(ctx)?, self.span())),
            },
            NodeKind::FrameRef(frame, inner) => Frame::enter(frame, ctx, |ctx| inner.dealias(ctx)),
            _ => Ok(self.clone()),
        }
    }

    /// Run an evaluator; anything else is already a value.
    pub fn execute(&self, ctx: &mut ExecutionContext) -> EvalResult {
        match self.kind() {
            NodeKind::Evaluator(ev) => ev.execute(ctx, false),
            _ => Ok(self.clone()),
        }
    }

    pub fn binding_execute(&self, ctx: &mut ExecutionContext) -> EvalResult {
        match self.kind() {
            NodeKind::Evaluator(ev) => ev.execute(ctx, true),
            _ => Ok(self.clone()),
        }
    }

    /// Read a variable from the active frame chain. Non-variables come back
    /// unchanged; sinks stay sinks.
    pub fn resolve_variable(&self, ctx: &mut ExecutionContext) -> EvalResult {
        match self.kind() {
            NodeKind::Name(Name::Variable(v)) if !is_sink(v) => {
                let frame = ctx
                    .current_frame()
                    .ok_or_else(|| variable_not_found(v.symbol, v.pipe).with_span(self.span()))?;
                if v.kind == VariableKind::Injecting {
                    return frame.read_injecting_variable(ctx, v);
                }
                frame
                    .read_variable(v)
                    .map_err(|e| e.or_span(self.span()))?
                    .resolve_variable(ctx)
            }
            NodeKind::FrameRef(frame, inner) if inner.is_variable() => {
                Frame::enter(frame, ctx, |ctx| inner.resolve_variable(ctx))
            }
            _ => Ok(self.clone()),
        }
    }

    /// Wrap this node so it can be used after `frame` is no longer active.
    /// Nodes that cannot reach a variable are returned unchanged.
    pub fn as_frame_reference(&self, frame: &Arc<Frame>) -> Node {
        match self.kind() {
            NodeKind::Nil
            | NodeKind::None
            | NodeKind::Number(_)
            | NodeKind::Char(_)
            | NodeKind::String(_)
            | NodeKind::Symbol(_)
            | NodeKind::Namespace(_)
            | NodeKind::Comment(_)
            | NodeKind::Trivalent(_)
            | NodeKind::Data(DataKind::Trivial, _) => self.clone(),
            NodeKind::Name(Name::Define(d)) if d.binding.is_trivial() => d.binding.clone(),
            NodeKind::Name(Name::Define(_)) => self.clone(),
            NodeKind::FrameRef(_, inner) if inner.is_trivial() => inner.clone(),
            NodeKind::FrameRef(..) => self.clone(),
            _ => Node::frame_ref(Arc::clone(frame), self.clone()),
        }
    }

    /// Like `as_frame_reference`, but plain data is opened and its children
    /// are wrapped one by one.
    pub fn propagate_reference(&self, frame: &Arc<Frame>) -> Node {
        match self.kind() {
            NodeKind::Data(DataKind::Plain, es) => {
                lists::new_data(es.propagate_reference(frame), self.span())
            }
            NodeKind::Data(DataKind::Injection, es) => {
                lists::new_injected_data(es.propagate_reference(frame), self.span())
            }
            _ if self.is_trivial() => self.clone(),
            _ => self.as_frame_reference(frame),
        }
    }

    /// This node as the parameter list of a pipeline stage. A container
    /// other than data is passed as a single parameter.
    pub fn as_parameter_list(&self, ctx: &mut ExecutionContext) -> EvalResult {
        match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.as_parameter_list(ctx),
            NodeKind::Name(Name::Variable(v)) if !is_sink(v) => {
                self.resolve_variable(ctx)?.as_parameter_list(ctx)
            }
            NodeKind::FrameRef(frame, inner) => {
                Ok(inner.as_parameter_list(ctx)?.propagate_reference(frame))
            }
            NodeKind::Data(..) => Ok(self.clone()),
            _ if self.is_atomic() => Ok(self.clone()),
            _ => Ok(lists::wrap(self)),
        }
    }
}
