//! Pipelines and their parameter mapping.
//!
//! A pipeline is a body of stages run left to right: each stage is stepped
//! with the output of the previous one. Its signature fixes precedence,
//! declared arguments and parameter counts. Executable pipelines are
//! productive inside expressions; binding pipelines run while the enclosing
//! expression is being bound.
//!
//! `map_execute` and `map_step` pick a pipeline's parameters out of a flat
//! expression sequence and describe how the sequence shrinks once the
//! pipeline and its parameters are replaced by one evaluator.

mod step;

use std::fmt::Write as _;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use plait_ir::Symbol;

pub use step::Step;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::{
    insufficient_parameters, insufficient_prefix_parameters, too_many_prefix_parameters,
    EvalResult,
};
use crate::frame::Frame;
use crate::name::{PipeId, Variable};
use crate::node::{Node, NodeKind};
use crate::production::ProductionMap;

/// Precedence of a pipeline declared without one.
pub const DEFAULT_PRECEDENCE: i32 = 100;

/// Declared shape of a pipeline.
#[derive(Debug)]
pub struct PipeSignature {
    pub id: PipeId,
    pub binding: bool,
    pub precedence: i32,
    pub args: Vec<Symbol>,
    pub vargs: Option<Symbol>,
    /// Exact parameter count; `None` accepts whatever is available.
    pub parm_count: Option<usize>,
    /// Parameters taken from the left of the pipeline.
    pub prefix_count: Option<usize>,
    pub vars: FxHashMap<Symbol, Variable>,
}

/// Options parsed from a pipeline declaration.
#[derive(Clone, Debug, Default)]
pub struct PipeOptions {
    pub precedence: Option<i32>,
    pub args: Vec<Symbol>,
    pub vargs: Option<Symbol>,
    /// `(#vargs)` given, with or without a name.
    pub vargs_flag: bool,
    pub parm_count: Option<usize>,
    pub prefix_count: Option<usize>,
}

impl PipeSignature {
    /// Build a signature. Without an explicit count, declared arguments fix
    /// the count unless variable arguments were requested.
    pub fn new(id: PipeId, binding: bool, opts: PipeOptions) -> Self {
        let parm_count = match opts.parm_count {
            None if !opts.args.is_empty() && !opts.vargs_flag => Some(opts.args.len()),
            n => n,
        };
        let mut vars = FxHashMap::default();
        for (idx, sym) in opts.args.iter().chain(opts.vargs.iter()).enumerate() {
            vars.insert(*sym, Variable::new(*sym, id, idx));
        }
        PipeSignature {
            id,
            binding,
            precedence: opts.precedence.unwrap_or(DEFAULT_PRECEDENCE),
            args: opts.args,
            vargs: opts.vargs,
            parm_count,
            prefix_count: opts.prefix_count,
            vars,
        }
    }

    pub fn has_args(&self) -> bool {
        !self.args.is_empty() || self.vargs.is_some()
    }

    pub fn has_vargs(&self) -> bool {
        self.vargs.is_some()
    }

    pub fn form_name(&self) -> &'static str {
        if self.binding {
            "bindpipe"
        } else {
            "pipeline"
        }
    }

    /// Option header as written back out: `pipeline 20 (#args a b)`.
    pub fn render_header(&self, out: &mut String) {
        out.push_str(self.form_name());
        if !self.binding {
            let _ = write!(out, " {}", self.precedence);
        }
        if let Some(n) = self.parm_count {
            let prefix = self.prefix_count.filter(|p| *p > 0);
            if self.args.is_empty() || n != self.args.len() || prefix.is_some() {
                let _ = write!(out, " (#nparms {n}");
                if let Some(p) = prefix {
                    let _ = write!(out, " {p}");
                }
                out.push(')');
            }
        }
        if !self.args.is_empty() {
            out.push_str(" (#args");
            for a in &self.args {
                let _ = write!(out, " {a}");
            }
            out.push(')');
        }
        if let Some(v) = self.vargs {
            let _ = write!(out, " (#vargs {v})");
        }
    }
}

/// An executable or binding pipeline.
pub struct Pipeline {
    signature: Arc<PipeSignature>,
    body: Elements,
    sinks: Arc<[Variable]>,
    /// Declared outside any other pipeline: invocations start a new frame
    /// chain.
    root: bool,
}

impl Pipeline {
    pub fn new(signature: Arc<PipeSignature>, body: Elements, sinks: Vec<Variable>, root: bool) -> Self {
        Pipeline {
            signature,
            body,
            sinks: sinks.into(),
            root,
        }
    }

    pub fn signature(&self) -> &Arc<PipeSignature> {
        &self.signature
    }

    pub fn body(&self) -> &Elements {
        &self.body
    }

    pub fn sinks(&self) -> &[Variable] {
        &self.sinks
    }

    pub fn id(&self) -> PipeId {
        self.signature.id
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn is_binding(&self) -> bool {
        self.signature.binding
    }

    /// True when an invocation needs a frame.
    pub fn has_vars(&self) -> bool {
        !self.signature.vars.is_empty() || !self.sinks.is_empty()
    }

    /// Precedence when productive; binding pipelines are not.
    pub fn precedence(&self) -> Option<i32> {
        (!self.is_binding()).then_some(self.signature.precedence)
    }

    /// Run the body with `parms`.
    pub fn step(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        Frame::dispatch(ctx, self, parms, |ctx| self.body.pipe_step(ctx, parms))
    }

    /// Run the body with the binding-time stage protocol.
    pub fn binding_step(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        Frame::dispatch(ctx, self, parms, |ctx| self.body.bind_pipe_step(ctx, parms))
    }

    /// Same pipeline with `e` added to the body.
    #[must_use]
    pub fn append(&self, e: &Node) -> Pipeline {
        Pipeline {
            signature: Arc::clone(&self.signature),
            body: self.body.append(e),
            sinks: Arc::clone(&self.sinks),
            root: self.root,
        }
    }
}

/// Map a pipeline that has competition from other productive elements.
/// Parameters are taken from `es[ies..=iee]` around the pipeline at `iep`.
pub(crate) fn map_execute(
    pipe: &Pipeline,
    es: &[Node],
    iep: usize,
    mut ies: usize,
    iee: usize,
) -> EvalResult<ProductionMap> {
    let sig = pipe.signature();
    let ep = &es[iep];
    let n_prefix = iep - ies;
    let mut n_parms = n_prefix + (iee - iep);

    if let Some(prefix) = sig.prefix_count {
        if prefix > n_prefix {
            return Err(insufficient_prefix_parameters().or_span(ep.span()));
        }
        let diff = n_prefix - prefix;
        ies += diff;
        n_parms -= diff;
    }
    if sig.parm_count.is_some_and(|n| n > n_parms) {
        return Err(insufficient_parameters().or_span(ep.span()));
    }
    Ok(finalise_map(
        es,
        iep,
        ies,
        iee,
        n_parms,
        sig.parm_count,
        sig.prefix_count,
    ))
}

/// Map a pipeline that is the only productive element. Missing or `none`
/// parameters turn the result into a [`Step`] awaiting them.
pub(crate) fn map_step(pipe: &Arc<Pipeline>, es: &[Node], iep: usize) -> EvalResult<ProductionMap> {
    let sig = pipe.signature();
    let ep = &es[iep];
    let n_prefix = iep;
    let mut n_parms = es.len() - 1;
    let mut holes = 0;
    let mut prefix_holes = 0;

    if let Some(prefix) = sig.prefix_count {
        if prefix < n_prefix {
            return Err(too_many_prefix_parameters().or_span(ep.span()));
        }
        prefix_holes = prefix - n_prefix;
        holes = prefix_holes;
        n_parms += prefix_holes;
    }
    let len = sig.parm_count.map_or(n_parms, |n| n.max(n_parms));
    if let Some(n) = sig.parm_count {
        holes += n.saturating_sub(n_parms);
    }
    holes += es.iter().filter(|e| e.is_none()).count();

    if holes == 0 {
        return Ok(finalise_map(
            es,
            iep,
            0,
            es.len() - 1,
            n_parms,
            None,
            Some(n_prefix),
        ));
    }

    let mut template = vec![Node::none(); len];
    for (slot, e) in template[prefix_holes..]
        .iter_mut()
        .zip(es[..iep].iter().chain(&es[iep + 1..]))
    {
        *slot = e.clone();
    }
    let step = Step::new(Arc::clone(pipe), ep.clone(), template.clone(), holes);
    Ok(ProductionMap {
        prod: Node::new(NodeKind::Step(Arc::new(step)), ep.span()),
        e_prod: ep.clone(),
        elements: es.to_vec(),
        parms: template,
        iep,
    })
}

/// Map a productive variable: it takes everything in its range.
pub(crate) fn map_span(es: &[Node], iep: usize, ies: usize, iee: usize) -> ProductionMap {
    finalise_map(es, iep, ies, iee, iee - ies, None, None)
}

fn finalise_map(
    es: &[Node],
    iep: usize,
    mut ies: usize,
    mut iee: usize,
    mut n_parms: usize,
    parm_count: Option<usize>,
    prefix_count: Option<usize>,
) -> ProductionMap {
    if let Some(total) = parm_count {
        if total < n_parms {
            // Trim surplus from the prefix side first, then from the end.
            let mut diff = n_parms - total;
            if prefix_count.is_none() && ies < iep {
                let take = (iep - ies).min(diff);
                ies += take;
                diff -= take;
            }
            iee = iee.saturating_sub(diff).max(iep);
        }
        n_parms = total;
    }

    let ep = &es[iep];
    let mut parms = Vec::with_capacity(n_parms);
    parms.extend_from_slice(&es[ies..iep]);
    parms.extend_from_slice(&es[iep + 1..=iee]);

    let mut elements = Vec::with_capacity(es.len() + 1 - parms.len());
    elements.extend_from_slice(&es[..ies]);
    elements.push(ep.clone());
    elements.extend_from_slice(&es[iee + 1..]);

    ProductionMap {
        prod: ep.clone(),
        e_prod: ep.clone(),
        elements,
        parms,
        iep: ies,
    }
}

#[cfg(test)]
mod tests;
