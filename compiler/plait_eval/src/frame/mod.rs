//! Per-invocation variable storage.
//!
//! A frame is created when a pipeline that owns variables is invoked. Its
//! parent is the frame that was active at that point (root pipelines have
//! none). Variables are serviced by the first frame on the parent chain whose
//! pipeline identity matches the variable's declaring pipeline. Every slot is
//! assigned at most once.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::context::ExecutionContext;
use crate::errors::{
    insufficient_parameters, too_many_parameters, variable_immutable, variable_not_found,
    variable_unassigned, EvalResult,
};
use crate::lists;
use crate::name::{PipeId, Variable};
use crate::node::{DataKind, Node, NodeKind};
use crate::pipeline::{PipeSignature, Pipeline};

pub struct Frame {
    signature: Arc<PipeSignature>,
    parent: Option<Arc<Frame>>,
    slots: Box<[OnceLock<Node>]>,
}

impl Frame {
    /// Allocate a frame for `pipeline` and bind its declared arguments from
    /// `parms`.
    pub fn new(pipeline: &Pipeline, parent: Option<Arc<Frame>>, parms: &Node) -> EvalResult<Frame> {
        let signature = Arc::clone(pipeline.signature());
        let size = signature.vars.len() + pipeline.sinks().len() + 1;
        let slots: Box<[OnceLock<Node>]> = (0..size).map(|_| OnceLock::new()).collect();
        let frame = Frame {
            signature,
            parent,
            slots,
        };
        frame.bind_arguments(parms)?;
        Ok(frame)
    }

    fn bind_arguments(&self, parms: &Node) -> EvalResult<()> {
        let sig = &self.signature;
        if !sig.has_args() {
            return Ok(());
        }
        let es = parms.elements().to_vec();
        let n_args = sig.args.len();
        if n_args > es.len() || sig.parm_count.is_some_and(|n| n > es.len()) {
            return Err(insufficient_parameters().or_span(parms.span()));
        }
        let mut idx = 0;
        for e in &es[..n_args] {
            self.fill(idx, e.clone());
            idx += 1;
        }
        if sig.has_vargs() {
            let rest = if idx == 0 {
                parms.clone()
            } else {
                lists::data_of(es[idx..].to_vec(), parms.span())
            };
            self.fill(idx, rest);
        }
        if sig.parm_count.is_some_and(|n| n < es.len()) {
            return Err(too_many_parameters().or_span(parms.span()));
        }
        Ok(())
    }

    fn fill(&self, idx: usize, node: Node) {
        if let Some(slot) = self.slots.get(idx) {
            // Fresh frame, the slot is empty.
            let _ = slot.set(node);
        }
    }

    pub fn pipe(&self) -> PipeId {
        self.signature.id
    }

    pub fn signature(&self) -> &Arc<PipeSignature> {
        &self.signature
    }

    pub fn parent(&self) -> Option<&Arc<Frame>> {
        self.parent.as_ref()
    }

    /// Number of frames on the chain, this one included.
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }

    fn servicing(&self, var: &Variable) -> Option<&Frame> {
        let mut frame = self;
        loop {
            if frame.signature.id == var.pipe {
                return Some(frame);
            }
            frame = frame.parent.as_deref()?;
        }
    }

    pub fn read_variable(&self, var: &Variable) -> EvalResult {
        let frame = self
            .servicing(var)
            .ok_or_else(|| variable_not_found(var.symbol, var.pipe))?;
        frame
            .slots
            .get(var.index)
            .and_then(OnceLock::get)
            .cloned()
            .ok_or_else(|| variable_unassigned(var.symbol))
    }

    /// Read an injecting variable: a sequence value comes back as a splice.
    pub fn read_injecting_variable(&self, ctx: &mut ExecutionContext, var: &Variable) -> EvalResult {
        let e = self.read_variable(var)?;
        if e.is_injectable() || e.is_atomic() {
            return Ok(e);
        }
        let reduced = e.reduce(ctx)?;
        Ok(Node::new(
            NodeKind::Data(DataKind::Injection, reduced.elements()),
            e.span(),
        ))
    }

    pub fn write_variable(&self, var: &Variable, e: Node) -> EvalResult {
        let frame = self
            .servicing(var)
            .ok_or_else(|| variable_not_found(var.symbol, var.pipe))?;
        let slot = frame
            .slots
            .get(var.index)
            .ok_or_else(|| variable_not_found(var.symbol, var.pipe))?;
        slot.set(e.clone())
            .map_err(|_| variable_immutable(var.symbol))?;
        Ok(e)
    }

    /// Store the parameters reaching a pipe-variable sink.
    pub fn set_pipe_variable(&self, var: &Variable, e: Node) -> EvalResult {
        self.write_variable(var, e)
    }

    /// Run `f` with a frame for `pipeline` active, when the pipeline owns
    /// variables. The result is wrapped so it keeps the frame reachable.
    pub fn dispatch(
        ctx: &mut ExecutionContext,
        pipeline: &Pipeline,
        parms: &Node,
        f: impl FnOnce(&mut ExecutionContext) -> EvalResult,
    ) -> EvalResult {
        if !pipeline.has_vars() {
            return f(ctx);
        }
        let parent = if pipeline.is_root() {
            None
        } else {
            ctx.current_frame()
        };
        let frame = Arc::new(Frame::new(pipeline, parent, parms)?);
        Frame::enter(&frame, ctx, f)
    }

    /// Run `f` with `frame` active.
    pub fn enter(
        frame: &Arc<Frame>,
        ctx: &mut ExecutionContext,
        f: impl FnOnce(&mut ExecutionContext) -> EvalResult,
    ) -> EvalResult {
        let mut scoped = ctx.with_frame(Arc::clone(frame))?;
        let result = f(&mut *scoped)?;
        Ok(result.as_frame_reference(frame))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("pipe", &self.signature.id)
            .field("slots", &self.slots.len())
            .field("depth", &self.depth())
            .finish()
    }
}
