//! Partially applied pipelines.

use std::sync::Arc;

use plait_ir::Span;

use crate::context::ExecutionContext;
use crate::errors::{too_many_step_parameters, EvalResult};
use crate::lists;
use crate::node::{Node, NodeKind};
use crate::production::ProductionMap;

use super::Pipeline;

/// A pipeline together with a parameter template whose `none` slots are
/// holes still waiting for values.
pub struct Step {
    pipeline: Arc<Pipeline>,
    /// The element the step was made from; running goes through it so a
    /// captured frame stays in effect.
    e_pipe: Node,
    template: Arc<[Node]>,
    holes: usize,
}

impl Step {
    pub fn new(pipeline: Arc<Pipeline>, e_pipe: Node, template: Vec<Node>, holes: usize) -> Self {
        Step {
            pipeline,
            e_pipe,
            template: template.into(),
            holes,
        }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn e_pipe(&self) -> &Node {
        &self.e_pipe
    }

    pub fn template(&self) -> &[Node] {
        &self.template
    }

    pub fn holes(&self) -> usize {
        self.holes
    }

    pub fn is_complete(&self) -> bool {
        self.holes == 0
    }

    fn refill(&self, template: Vec<Node>, holes: usize, span: Span) -> Node {
        let step = Step::new(Arc::clone(&self.pipeline), self.e_pipe.clone(), template, holes);
        Node::new(NodeKind::Step(Arc::new(step)), span)
    }

    /// Fill holes left to right. `none` inputs are skipped.
    fn fill(&self, inputs: &[Node]) -> EvalResult<(Vec<Node>, usize)> {
        if inputs.len() > self.holes {
            return Err(too_many_step_parameters());
        }
        let mut out = self.template.to_vec();
        let mut values = inputs.iter().filter(|e| !e.is_none());
        let mut filled = 0;
        for slot in out.iter_mut().filter(|s| s.is_none()) {
            let Some(v) = values.next() else { break };
            *slot = v.clone();
            filled += 1;
        }
        Ok((out, filled))
    }

    /// Supply parameters. Runs the pipeline once every hole is filled,
    /// otherwise answers a step with fewer holes. `this` is the node holding
    /// the step.
    pub fn step_with(
        &self,
        this: &Node,
        ctx: &mut ExecutionContext,
        parms: &Node,
        binding: bool,
    ) -> EvalResult {
        let inputs = parms.elements().to_vec();
        if inputs.is_empty() {
            if self.holes > 0 {
                return Ok(this.clone());
            }
            return self.run(ctx, self.template.to_vec(), parms.span(), binding);
        }
        let (filled, n) = self.fill(&inputs).map_err(|e| e.or_span(this.span()))?;
        if n < self.holes {
            return Ok(self.refill(filled, self.holes - n, this.span()));
        }
        self.run(ctx, filled, parms.span(), binding)
    }

    fn run(&self, ctx: &mut ExecutionContext, parms: Vec<Node>, span: Span, binding: bool) -> EvalResult {
        let parms = lists::data_of(parms, span);
        if binding {
            self.e_pipe.binding_step_with(ctx, &parms)
        } else {
            self.e_pipe.step_with(ctx, &parms)
        }
    }

    /// Map the step inside an expression: every other element fills holes.
    pub(crate) fn map_step(&self, this: &Node, es: &[Node], iep: usize) -> EvalResult<ProductionMap> {
        if es.len() == 1 {
            return Ok(ProductionMap {
                prod: this.clone(),
                e_prod: es[iep].clone(),
                elements: es.to_vec(),
                parms: self.template.to_vec(),
                iep,
            });
        }
        let mut rest = es.to_vec();
        rest.remove(iep);
        let (filled, n) = self.fill(&rest).map_err(|e| e.or_span(this.span()))?;
        Ok(ProductionMap {
            prod: self.refill(filled, self.holes - n, this.span()),
            e_prod: self.e_pipe.clone(),
            elements: es.to_vec(),
            parms: rest,
            iep,
        })
    }

    /// Parameters printed before the pipeline element, leading holes
    /// skipped.
    pub(crate) fn split_for_print(&self) -> (&[Node], &[Node]) {
        let n_prefix = self
            .pipeline
            .signature()
            .prefix_count
            .unwrap_or(0)
            .min(self.template.len());
        let (prefix, rest) = self.template.split_at(n_prefix);
        let lead = prefix.iter().take_while(|e| e.is_none()).count();
        let trail = rest.iter().rev().take_while(|e| e.is_none()).count();
        (&prefix[lead..], &rest[..rest.len() - trail])
    }
}
