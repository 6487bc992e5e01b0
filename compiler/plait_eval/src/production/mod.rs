//! Productions: bound expressions compiled by operator precedence.
//!
//! Binding `(1 + 2 * 3)` yields a production whose evaluator tree is
//! `+(1, *(2, 3))`. The builder repeatedly picks the productive element with
//! the smallest precedence (leftmost on ties), lets it take its parameters
//! from the neighbouring non-productive elements, and replaces that span by
//! one evaluator, until a single evaluator remains.
//!
//! An expression whose only productive element is short of parameters
//! becomes a [`Step`](crate::pipeline::Step) instead: `(1 +)` is a partial
//! application that can be completed later.
//!
//! Evaluators are internal: every phase operation on one is an error, only
//! `execute` runs it.

use std::fmt;
use std::sync::Arc;

use tracing::{instrument, trace};

use plait_ir::Span;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::EvalResult;
use crate::lists;
use crate::node::{BoundExpr, ExprKind, Node, NodeKind};
use crate::pipeline::{map_execute, map_span, map_step};
use crate::stack::ensure_sufficient_stack;

/// How a productive element and its parameters map onto an expression.
pub struct ProductionMap {
    /// What gets stepped: the mapped element, or a step built from it.
    pub prod: Node,
    /// The element as written, used for the flow trail.
    pub e_prod: Node,
    /// The expression after mapping; `elements[iep]` is the placeholder for
    /// the evaluator.
    pub elements: Vec<Node>,
    pub parms: Vec<Node>,
    pub iep: usize,
}

impl ProductionMap {
    /// Put `e` at the mapped position. A splice replaces the slot by its
    /// contents; an alias is dealiased and the position moves past it.
    pub fn inject(mut self, ctx: &mut ExecutionContext, e: Node) -> EvalResult<ProductionMap> {
        if e.is_injectable() {
            let spliced = e.elements().expanded(ctx)?;
            self.elements.splice(self.iep..=self.iep, spliced);
            return Ok(self);
        }
        if e.is_alias() {
            self.elements[self.iep] = e.dealias(ctx)?;
            self.iep += 1;
        } else {
            self.elements[self.iep] = e;
        }
        Ok(self)
    }
}

/// Parameter handling chosen when an evaluator is built.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum EvaluatorKind {
    /// Parameters are constant and prebuilt.
    Static,
    /// Some parameters are variables, read on every run.
    Variable,
    /// Some parameters are nested evaluators, run first.
    Generic,
    /// No productive element: the parameters form a data list.
    List,
}

/// One node of a production's evaluator tree.
pub struct Evaluator {
    kind: EvaluatorKind,
    prod: Node,
    e_prod: Node,
    parms: Elements,
    static_parms: Node,
    span: Span,
}

impl Evaluator {
    fn apply(prod: Node, e_prod: Node, parms: Vec<Node>, span: Span) -> Node {
        let mut kind = EvaluatorKind::Static;
        for p in &parms {
            if p.is_evaluator() {
                kind = EvaluatorKind::Generic;
                break;
            }
            if p.is_variable() {
                kind = EvaluatorKind::Variable;
            }
        }
        let parms = Elements::make_fixed(parms);
        let static_parms = if kind == EvaluatorKind::Static {
            lists::new_data(parms.clone(), span)
        } else {
            Node::nil()
        };
        Self::into_node(Evaluator {
            kind,
            prod,
            e_prod,
            parms,
            static_parms,
            span,
        })
    }

    fn list(parms: Elements, span: Span) -> Node {
        Self::into_node(Evaluator {
            kind: EvaluatorKind::List,
            prod: Node::nil(),
            e_prod: Node::nil(),
            parms,
            static_parms: Node::nil(),
            span,
        })
    }

    fn into_node(ev: Evaluator) -> Node {
        let span = ev.span;
        Node::new(NodeKind::Evaluator(Arc::new(ev)), span)
    }

    pub fn kind(&self) -> EvaluatorKind {
        self.kind
    }

    pub fn prod(&self) -> &Node {
        &self.prod
    }

    pub fn e_prod(&self) -> &Node {
        &self.e_prod
    }

    pub fn parms(&self) -> &Elements {
        &self.parms
    }

    /// Run the evaluator: gather parameters and step the productive element.
    pub fn execute(&self, ctx: &mut ExecutionContext, binding: bool) -> EvalResult {
        if self.kind == EvaluatorKind::List {
            let es = self.gather(ctx, binding)?;
            return Ok(lists::data_of(es, self.span));
        }
        ctx.with_flow(&self.e_prod, |ctx| {
            let parms = match self.kind {
                EvaluatorKind::Static => self.static_parms.clone(),
                _ => lists::data_of(self.gather(ctx, binding)?, self.span),
            };
            if binding {
                self.prod.binding_step_with(ctx, &parms)
            } else {
                self.prod.step_with(ctx, &parms)
            }
        })
    }

    fn gather(&self, ctx: &mut ExecutionContext, binding: bool) -> EvalResult<Vec<Node>> {
        let run_nested = matches!(self.kind, EvaluatorKind::Generic | EvaluatorKind::List);
        let mut out = Vec::with_capacity(self.parms.len());
        for p in self.parms.as_slice() {
            let v = p.resolve_variable(ctx)?;
            out.push(match (run_nested, binding) {
                (false, _) => v,
                (true, false) => v.execute(ctx)?,
                (true, true) => v.binding_execute(ctx)?,
            });
        }
        Ok(out)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("kind", &self.kind)
            .field("parms", &self.parms.len())
            .finish_non_exhaustive()
    }
}

/// A bound expression together with its evaluator tree.
pub struct Production {
    elements: Elements,
    evaluator: Arc<Evaluator>,
}

impl Production {
    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn evaluator(&self) -> &Arc<Evaluator> {
        &self.evaluator
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> EvalResult {
        ensure_sufficient_stack(|| self.evaluator.execute(ctx, false))
    }

    pub fn binding_execute(&self, ctx: &mut ExecutionContext) -> EvalResult {
        ensure_sufficient_stack(|| self.evaluator.execute(ctx, true))
    }
}

/// Compile bound `elements` into a production. When the elements hold no
/// work for an evaluator the simplified result comes back as is: a step,
/// a single element, data, or a bound expression.
#[instrument(level = "trace", skip_all, fields(len = elements.len()))]
pub fn new_production(elements: Elements, span: Span) -> EvalResult {
    let built = build_evaluator(&elements, span)?;
    match built.kind() {
        NodeKind::Evaluator(ev) => Ok(Node::new(
            NodeKind::Production(Arc::new(Production {
                elements,
                evaluator: Arc::clone(ev),
            })),
            span,
        )),
        _ => Ok(built),
    }
}

fn build_evaluator(elements: &Elements, span: Span) -> EvalResult {
    let mut es = elements.to_vec();
    let mut child_evaluator = false;
    let mut n_steps = 0;
    let mut last_step = None;
    let mut n_prods = 0;

    loop {
        let mut best: Option<(usize, i32)> = None;
        for (i, e) in es.iter().enumerate() {
            if best.is_none() && e.is_step() {
                n_steps += 1;
                last_step = Some(i);
                continue;
            }
            let Some(prec) = e.precedence() else {
                continue;
            };
            n_prods += 1;
            if best.map_or(true, |(_, p)| prec < p) {
                best = Some((i, prec));
            }
        }

        let Some((iep, prec)) = best else {
            if n_steps == 1 {
                if let Some(i) = last_step {
                    if let Some(step) = es[i].as_step() {
                        return Ok(step.map_step(&es[i], &es, i)?.prod);
                    }
                }
            }
            return Ok(finish_elements(es, child_evaluator, span));
        };
        trace!(iep, prec, "mapping productive element");

        let iep1 = es[..iep]
            .iter()
            .rposition(Node::is_productive)
            .map_or(0, |i| i + 1);
        let iep2 = es[iep + 1..]
            .iter()
            .position(Node::is_productive)
            .map_or(es.len() - 1, |i| iep + i);

        let map = if n_prods == 1 {
            let map = map_single(&es, iep)?;
            if map.prod.is_step() {
                return Ok(map.prod);
            }
            map
        } else {
            map_competing(&es, iep, iep1, iep2)?
        };
        let evaluator = Evaluator::apply(map.prod, map.e_prod, map.parms, span);
        if map.elements.len() <= 1 {
            return Ok(evaluator);
        }
        es = map.elements;
        es[map.iep] = evaluator;
        child_evaluator = true;
    }
}

fn map_single(es: &[Node], iep: usize) -> EvalResult<ProductionMap> {
    match es[iep].as_pipeline() {
        Some(pipe) => map_step(pipe, es, iep),
        None => Ok(map_span(es, iep, 0, es.len() - 1)),
    }
}

fn map_competing(es: &[Node], iep: usize, ies: usize, iee: usize) -> EvalResult<ProductionMap> {
    match es[iep].as_pipeline() {
        Some(pipe) => map_execute(pipe, es, iep, ies, iee),
        None => Ok(map_span(es, iep, ies, iee)),
    }
}

/// No productive element is left.
fn finish_elements(es: Vec<Node>, child_evaluator: bool, span: Span) -> Node {
    let single = (es.len() == 1).then(|| es[0].clone());
    let elements = Elements::make(es);
    if !elements.are_bound() {
        return Node::bound_expr(
            BoundExpr {
                kind: ExprKind::Prod,
                elements,
                bind: false,
                names: false,
            },
            span,
        );
    }
    if child_evaluator {
        return Evaluator::list(elements, span);
    }
    match single {
        Some(e) => e,
        None => lists::new_data(elements, span),
    }
}
