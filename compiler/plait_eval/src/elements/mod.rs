//! Child sequences of container nodes.
//!
//! The representation is picked once, from a scan of the children:
//!
//! - `Empty`: no children
//! - `Fixed`: a plain array
//! - `Variables`: contains variable references, which are resolved against
//!   the active frame on every traversal
//! - `Injectable`: contains splice children whose length is only known after
//!   expansion
//!
//! Derived sequences re-derive the variant, so an injectable sequence stays
//! injectable until it is expanded.

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::errors::EvalResult;
use crate::frame::Frame;
use crate::name::Name;
use crate::node::{DataKind, Node, NodeKind};

#[derive(Clone, Default)]
pub enum Elements {
    #[default]
    Empty,
    Fixed(Arc<[Node]>),
    Variables(Arc<[Node]>),
    Injectable(Arc<[Node]>),
}

impl Elements {
    /// Scan `nodes` and pick the representation.
    pub fn make(nodes: Vec<Node>) -> Elements {
        if nodes.is_empty() {
            return Elements::Empty;
        }
        if nodes.iter().any(Node::is_injectable) {
            return Elements::Injectable(nodes.into());
        }
        Self::make_fixed(nodes)
    }

    /// Like `make`, for arrays already known to hold no splices.
    pub fn make_fixed(nodes: Vec<Node>) -> Elements {
        if nodes.is_empty() {
            Elements::Empty
        } else if nodes.iter().any(Node::is_variable) {
            Elements::Variables(nodes.into())
        } else {
            Elements::Fixed(nodes.into())
        }
    }

    pub fn single(node: Node) -> Elements {
        Self::make(vec![node])
    }

    /// The stored children, without expansion.
    pub fn as_slice(&self) -> &[Node] {
        match self {
            Elements::Empty => &[],
            Elements::Fixed(es) | Elements::Variables(es) | Elements::Injectable(es) => es,
        }
    }

    pub fn to_vec(&self) -> Vec<Node> {
        self.as_slice().to_vec()
    }

    pub fn is_injectable(&self) -> bool {
        matches!(self, Elements::Injectable(_))
    }

    /// True when some top-level child is a variable reference.
    pub fn has_variable_elements(&self) -> bool {
        match self {
            Elements::Variables(_) => true,
            Elements::Injectable(es) => es.iter().any(Node::is_variable),
            Elements::Empty | Elements::Fixed(_) => false,
        }
    }

    /// Number of children; splices count their statically known contents.
    pub fn len(&self) -> usize {
        match self {
            Elements::Injectable(es) => es
                .iter()
                .map(|e| if e.is_injectable() && !e.is_variable() { e.len() } else { 1 })
                .sum(),
            _ => self.as_slice().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for exactly one child that is atomic.
    pub fn is_atomic(&self) -> bool {
        matches!(self.as_slice(), [e] if e.is_atomic() && !self.is_injectable())
    }

    /// Child at `idx`, or none when out of range.
    pub fn element(&self, idx: usize) -> Node {
        match self {
            Elements::Injectable(_) => self
                .flatten_static()
                .get(idx)
                .cloned()
                .unwrap_or_else(Node::none),
            _ => self.as_slice().get(idx).cloned().unwrap_or_else(Node::none),
        }
    }

    /// Children with literal splices flattened; variables stay in place.
    fn flatten_static(&self) -> Vec<Node> {
        let mut out = Vec::with_capacity(self.as_slice().len());
        for e in self.as_slice() {
            if e.is_injectable() && !e.is_variable() {
                out.extend(e.elements().flatten_static());
            } else {
                out.push(e.clone());
            }
        }
        out
    }

    // Expansion

    /// Fully resolved children: variables read from the active frame and
    /// splices flattened.
    pub fn expanded(&self, ctx: &mut ExecutionContext) -> EvalResult<Vec<Node>> {
        match self {
            Elements::Empty => Ok(Vec::new()),
            Elements::Fixed(es) => Ok(es.to_vec()),
            Elements::Variables(es) => es.iter().map(|e| e.resolve_variable(ctx)).collect(),
            Elements::Injectable(es) => {
                let mut out = Vec::with_capacity(es.len());
                for e in es.iter() {
                    let resolved = e.resolve_variable(ctx)?;
                    if e.is_injectable() {
                        out.extend(resolved.elements().expanded(ctx)?);
                    } else {
                        out.push(resolved);
                    }
                }
                Ok(out)
            }
        }
    }

    /// Children as call parameters: variables are resolved, splices are not
    /// flattened.
    pub fn parameters(&self, ctx: &mut ExecutionContext) -> EvalResult<Vec<Node>> {
        match self {
            Elements::Empty | Elements::Fixed(_) => Ok(self.to_vec()),
            Elements::Variables(es) | Elements::Injectable(es) => {
                es.iter().map(|e| e.resolve_variable(ctx)).collect()
            }
        }
    }

    pub fn expand(&self, ctx: &mut ExecutionContext) -> EvalResult<Elements> {
        match self {
            Elements::Empty | Elements::Fixed(_) => Ok(self.clone()),
            Elements::Variables(_) => Ok(Elements::Fixed(self.expanded(ctx)?.into())),
            Elements::Injectable(_) => Ok(Elements::make(self.expanded(ctx)?)),
        }
    }

    // Element-wise phases

    fn map(
        &self,
        ctx: &mut ExecutionContext,
        mut f: impl FnMut(&Node, &mut ExecutionContext) -> EvalResult,
    ) -> EvalResult<Vec<Node>> {
        let mut out = Vec::with_capacity(self.as_slice().len());
        for e in self.as_slice() {
            out.push(f(e, ctx)?);
        }
        Ok(out)
    }

    pub fn bind(&self, ctx: &mut ExecutionContext) -> EvalResult<Elements> {
        match self {
            Elements::Empty => Ok(Elements::Empty),
            Elements::Fixed(_) if self.are_bound() => Ok(self.clone()),
            Elements::Fixed(_) => Ok(Elements::make(self.map(ctx, |e, ctx| e.bind(ctx))?)),
            Elements::Variables(_) | Elements::Injectable(_) => Ok(Elements::make(
                self.map(ctx, |e, ctx| e.resolve_variable(ctx)?.bind(ctx))?,
            )),
        }
    }

    /// Resolve unbound names without recording failures.
    pub fn bind_names(&self, ctx: &mut ExecutionContext) -> EvalResult<Elements> {
        let es = self.map(ctx, |e, ctx| {
            let e = e.resolve_variable(ctx)?;
            match e.kind() {
                NodeKind::Name(Name::Unbound(n)) => ctx.lookup_name(n, e.span()),
                _ => Ok(e),
            }
        })?;
        Ok(Elements::make_fixed(es))
    }

    pub fn evaluate(&self, ctx: &mut ExecutionContext) -> EvalResult<Elements> {
        match self {
            Elements::Empty => Ok(Elements::Empty),
            Elements::Fixed(_) if !self.can_evaluate() => Ok(self.clone()),
            Elements::Fixed(_) => Ok(Elements::make(self.map(ctx, |e, ctx| e.evaluate(ctx))?)),
            Elements::Variables(_) | Elements::Injectable(_) => Ok(Elements::make(
                self.map(ctx, |e, ctx| e.resolve_variable(ctx)?.evaluate(ctx))?,
            )),
        }
    }

    pub fn binding_evaluate(&self, ctx: &mut ExecutionContext) -> EvalResult<Elements> {
        match self {
            Elements::Empty => Ok(Elements::Empty),
            Elements::Fixed(_) if !self.can_evaluate() => Ok(self.clone()),
            Elements::Fixed(_) => Ok(Elements::make(
                self.map(ctx, |e, ctx| e.binding_evaluate(ctx))?,
            )),
            Elements::Variables(_) | Elements::Injectable(_) => Ok(Elements::make(
                self.map(ctx, |e, ctx| e.resolve_variable(ctx)?.binding_evaluate(ctx))?,
            )),
        }
    }

    pub fn reduce(&self, ctx: &mut ExecutionContext) -> EvalResult<Elements> {
        let es = self.expanded(ctx)?;
        let mut out = Vec::with_capacity(es.len());
        for e in &es {
            out.push(e.reduce(ctx)?);
        }
        Ok(Elements::make(out))
    }

    pub fn dealias(&self, ctx: &mut ExecutionContext) -> EvalResult<Elements> {
        let es = self.expanded(ctx)?;
        let mut out = Vec::with_capacity(es.len());
        for e in &es {
            out.push(e.dealias(ctx)?);
        }
        Ok(Elements::make(out))
    }

    /// Wrap every child that needs `frame` so it can be used after the frame
    /// is gone.
    pub fn propagate_reference(&self, frame: &Arc<Frame>) -> Elements {
        match self {
            Elements::Empty => Elements::Empty,
            _ => Elements::make(
                self.as_slice()
                    .iter()
                    .map(|e| e.as_frame_reference(frame))
                    .collect(),
            ),
        }
    }

    // Structure

    pub fn head(&self) -> Node {
        match self.as_slice().first() {
            Some(e) if e.is_injectable() && !e.is_variable() => e.elements().head(),
            Some(e) => e.clone(),
            None => Node::none(),
        }
    }

    pub fn end(&self) -> Node {
        match self.as_slice().last() {
            Some(e) if e.is_injectable() && !e.is_variable() => e.elements().end(),
            Some(e) => e.clone(),
            None => Node::none(),
        }
    }

    pub fn tail(&self) -> Elements {
        let es = self.flatten_static();
        if es.len() <= 1 {
            return Elements::Empty;
        }
        Elements::make(es[1..].to_vec())
    }

    pub fn front(&self) -> Elements {
        let es = self.flatten_static();
        if es.len() <= 1 {
            return Elements::Empty;
        }
        Elements::make(es[..es.len() - 1].to_vec())
    }

    /// Children `start..end` of the flattened sequence, clamped to its length.
    pub fn subset(&self, start: usize, end: usize) -> Elements {
        let es = self.flatten_static();
        let end = end.min(es.len());
        if start >= end {
            return Elements::Empty;
        }
        Elements::make(es[start..end].to_vec())
    }

    /// Append a node. Atoms are added as one child (nil adds nothing);
    /// a container contributes its children.
    #[must_use]
    pub fn append(&self, e: &Node) -> Elements {
        let mut es = self.to_vec();
        if e.is_atomic() {
            if e.is_nil() {
                return self.clone();
            }
            es.push(e.clone());
        } else {
            match e.kind() {
                NodeKind::Data(DataKind::Injection, _) => es.push(e.clone()),
                _ => es.extend(e.elements().as_slice().iter().cloned()),
            }
        }
        Elements::make(es)
    }

    // Pipeline body protocol

    /// Run a pipeline body: every stage but the last is stepped and then
    /// evaluated; the last is only stepped.
    pub fn pipe_step(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        self.run_stages(ctx, parms, false)
    }

    /// Binding-time mirror of `pipe_step`.
    pub fn bind_pipe_step(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        self.run_stages(ctx, parms, true)
    }

    fn run_stages(&self, ctx: &mut ExecutionContext, parms: &Node, binding: bool) -> EvalResult {
        let stages = self.as_slice();
        let Some((last, init)) = stages.split_last() else {
            return Ok(parms.clone());
        };
        let mut result = parms.clone();
        for stage in init {
            result = if stage.is_injectable() && !stage.is_variable() {
                stage.elements().run_stages(ctx, &result, binding)?
            } else {
                let input = result.as_parameter_list(ctx)?;
                if binding {
                    stage.binding_step_with(ctx, &input)?
                } else {
                    stage.step_with(ctx, &input)?
                }
            };
            result = if binding {
                result.binding_evaluate(ctx)?
            } else {
                result.evaluate(ctx)?
            };
        }
        if last.is_injectable() && !last.is_variable() {
            return last.elements().run_stages(ctx, &result, binding);
        }
        let input = result.as_parameter_list(ctx)?;
        if binding {
            last.binding_step_with(ctx, &input)
        } else {
            last.step_with(ctx, &input)
        }
    }

    // Predicates

    pub fn are_bound(&self) -> bool {
        self.as_slice().iter().all(Node::is_bound)
    }

    pub fn are_trivial(&self) -> bool {
        self.as_slice().iter().all(Node::is_trivial)
    }

    pub fn are_reducible(&self) -> bool {
        self.as_slice().iter().any(Node::is_reducible)
    }

    pub fn has_variables(&self) -> bool {
        self.as_slice().iter().any(Node::has_variables)
    }

    pub fn can_evaluate(&self) -> bool {
        self.as_slice().iter().any(Node::can_evaluate)
    }

    /// True when the sequence holds something to compile into a production.
    pub fn give_production(&self) -> bool {
        self.as_slice()
            .iter()
            .any(|e| e.is_productive() || e.is_step())
    }
}

impl From<Vec<Node>> for Elements {
    fn from(nodes: Vec<Node>) -> Self {
        Elements::make(nodes)
    }
}
