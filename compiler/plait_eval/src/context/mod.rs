//! Per-evaluation-path state.
//!
//! An `ExecutionContext` owns the stacks one evaluation path needs: active
//! frames, the flow trail, variable binders and the private namespace chain,
//! plus the bind errors collected while a binding phase is running. The
//! namespace tree and registries are shared through the [`Runtime`].
//!
//! Phase entry points (`bind`, `step`, `evaluate`, `reduce`,
//! `evaluate_bind_parms`) prime the flow trail with their input on first
//! entry and unwind it on every exit.

mod scope_guard;

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use plait_ir::{Span, StringInterner, Symbol};

pub use scope_guard::ScopedFrame;

use crate::config::EngineConfig;
use crate::errors::{
    bind_aggregate, depth_exceeded, name_not_found, namespace_operation, not_a_namespace,
    stack_underflow, EvalError, EvalResult, FlowBacktrace, FlowFrame,
};
use crate::frame::Frame;
use crate::name::{Define, Name, NamePath, PipeId, UnboundName, Undefined, Variable};
use crate::namespace::{Namespace, NamespaceKind};
use crate::node::{Node, NodeKind};
use crate::pipeline::PipeSignature;
use crate::runtime::Runtime;

/// Something that turns a name into a variable while a pipeline is being
/// declared.
#[derive(Clone)]
pub enum VariableBinder {
    /// Declared arguments of the pipeline under construction.
    Pipe(Arc<PipeSignature>),
    /// A pipe-variable sink seen earlier in the body.
    Sink(Variable),
}

impl VariableBinder {
    fn bind_name(&self, name: Symbol) -> Option<Variable> {
        match self {
            VariableBinder::Pipe(sig) => sig.vars.get(&name).cloned(),
            VariableBinder::Sink(var) => (var.symbol == name).then(|| var.clone()),
        }
    }

    fn pipe(&self) -> PipeId {
        match self {
            VariableBinder::Pipe(sig) => sig.id,
            VariableBinder::Sink(var) => var.pipe,
        }
    }
}

/// Longest flow label kept in a backtrace.
const FLOW_LABEL_MAX: usize = 80;

pub struct ExecutionContext {
    runtime: Runtime,
    public: Namespace,
    private: Option<Namespace>,
    flow: Vec<Node>,
    frames: Vec<Arc<Frame>>,
    binders: Vec<VariableBinder>,
    bind_errors: Vec<EvalError>,
    phase_active: bool,
    bind_depth: usize,
    soft_names: usize,
    max_flow_depth: usize,
    max_frame_depth: usize,
}

impl ExecutionContext {
    pub fn new(runtime: Runtime) -> Self {
        let public = runtime.core().clone();
        let config = runtime.config();
        let (max_flow_depth, max_frame_depth) = (config.max_flow_depth, config.max_frame_depth);
        ExecutionContext {
            runtime,
            public,
            private: None,
            flow: Vec::new(),
            frames: Vec::new(),
            binders: Vec::new(),
            bind_errors: Vec::new(),
            phase_active: false,
            bind_depth: 0,
            soft_names: 0,
            max_flow_depth,
            max_frame_depth,
        }
    }

    /// Context for the declarations `Runtime::new` runs. Startup binds with
    /// the interpreting limits whatever the configured ones are.
    pub(crate) fn for_startup(runtime: Runtime) -> Self {
        let limits = EngineConfig::interpret();
        ExecutionContext {
            max_flow_depth: limits.max_flow_depth,
            max_frame_depth: limits.max_frame_depth,
            ..ExecutionContext::new(runtime)
        }
    }

    /// Independent context over the same namespace tree.
    #[must_use]
    pub fn fork(&self) -> Self {
        ExecutionContext {
            runtime: self.runtime.clone(),
            public: self.public.clone(),
            private: self.private.clone(),
            flow: self.flow.clone(),
            frames: self.frames.clone(),
            binders: self.binders.clone(),
            bind_errors: self.bind_errors.clone(),
            phase_active: self.phase_active,
            bind_depth: self.bind_depth,
            soft_names: self.soft_names,
            max_flow_depth: self.max_flow_depth,
            max_frame_depth: self.max_frame_depth,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn interner(&self) -> &StringInterner {
        self.runtime.interner()
    }

    pub fn intern(&self, text: &str) -> Symbol {
        self.runtime.interner().intern(text)
    }

    // Phase entry points

    #[instrument(level = "debug", skip_all, fields(node = %node))]
    pub fn bind(&mut self, node: &Node) -> EvalResult {
        self.run_bind(node, |ctx| node.bind(ctx))
    }

    #[instrument(level = "debug", skip_all, fields(node = %node))]
    pub fn step(&mut self, node: &Node) -> EvalResult {
        self.run_op(node, |ctx| node.step(ctx))
    }

    #[instrument(level = "debug", skip_all, fields(node = %node))]
    pub fn evaluate(&mut self, node: &Node) -> EvalResult {
        self.run_op(node, |ctx| node.evaluate(ctx))
    }

    #[instrument(level = "debug", skip_all, fields(node = %node))]
    pub fn reduce(&mut self, node: &Node) -> EvalResult {
        self.run_op(node, |ctx| node.reduce(ctx))
    }

    /// Bind every parameter and run it through the binding-time evaluate.
    #[instrument(level = "debug", skip_all, fields(parms = %parms))]
    pub fn evaluate_bind_parms(&mut self, parms: &Node) -> EvalResult<Vec<Node>> {
        self.run_bind(parms, |ctx| {
            let bound = parms.elements().expand(ctx)?.bind(ctx)?;
            let mut out = Vec::with_capacity(bound.len());
            for e in bound.as_slice() {
                out.push(e.binding_evaluate(ctx)?);
            }
            Ok(out)
        })
    }

    fn initialise(&mut self, node: &Node) {
        self.flow.clear();
        self.flow.push(node.clone());
        self.binders.clear();
        self.bind_errors.clear();
        self.phase_active = true;
    }

    fn finish(&mut self, outer: bool) {
        self.phase_active = outer;
        if !outer {
            self.flow.clear();
            self.binders.clear();
        }
    }

    fn run_op<T>(
        &mut self,
        node: &Node,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let outer = self.phase_active;
        if !outer {
            self.initialise(node);
        }
        let result = f(self).map_err(|e| self.annotate(e));
        self.finish(outer);
        result
    }

    fn run_bind<T>(
        &mut self,
        node: &Node,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let outer = self.phase_active;
        if !outer {
            self.initialise(node);
        }
        self.bind_depth += 1;
        let result = match f(self) {
            Ok(v) if self.bind_errors.is_empty() => Ok(v),
            Ok(_) => Err(self.take_bind_aggregate()),
            Err(e) if e.is_bind_aggregate() => Err(e),
            Err(e) => {
                let e = self.annotate(e);
                self.bind_errors.push(e);
                Err(self.take_bind_aggregate())
            }
        };
        self.bind_depth -= 1;
        self.finish(outer);
        result
    }

    // Flow trail

    /// Run `f` with `node` on the flow trail. An error escaping `f` gets the
    /// trail attached, unless an inner call already attached one.
    pub fn with_flow<T>(
        &mut self,
        node: &Node,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let limit = self.max_flow_depth;
        if self.flow.len() >= limit {
            return Err(self.annotate(depth_exceeded("flow", limit).or_span(node.span())));
        }
        self.flow.push(node.clone());
        let result = f(self).map_err(|e| self.annotate(e));
        self.flow.pop();
        result
    }

    fn annotate(&self, e: EvalError) -> EvalError {
        if e.backtrace.is_some() {
            return e;
        }
        let e = match self.flow.last() {
            Some(node) => e.or_span(node.span()),
            None => e,
        };
        e.with_backtrace(self.flow_backtrace())
    }

    /// Snapshot of the flow trail, outermost first.
    pub fn flow_backtrace(&self) -> FlowBacktrace {
        FlowBacktrace::new(
            self.flow
                .iter()
                .map(|node| FlowFrame {
                    label: flow_label(node),
                    span: Some(node.span()).filter(|s| !s.is_dummy()),
                })
                .collect(),
        )
    }

    pub fn flow_depth(&self) -> usize {
        self.flow.len()
    }

    // Frames

    pub fn current_frame(&self) -> Option<Arc<Frame>> {
        self.frames.last().cloned()
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self, frame: Arc<Frame>) -> EvalResult<()> {
        let limit = self.max_frame_depth;
        if self.frames.len() >= limit {
            return Err(depth_exceeded("frame", limit));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop_frame(&mut self) -> EvalResult<Arc<Frame>> {
        self.frames.pop().ok_or_else(|| stack_underflow("frame"))
    }

    /// Push `frame` for the lifetime of the returned guard.
    pub fn with_frame(&mut self, frame: Arc<Frame>) -> EvalResult<ScopedFrame<'_>> {
        self.push_frame(frame)?;
        Ok(ScopedFrame::new(self))
    }

    // Variable binders

    pub fn push_binder(&mut self, binder: VariableBinder) {
        self.binders.push(binder);
    }

    pub fn binder_depth(&self) -> usize {
        self.binders.len()
    }

    /// Drop binders pushed since the stack was `depth` deep.
    pub fn truncate_binders(&mut self, depth: usize) {
        self.binders.truncate(depth);
    }

    /// True when no pipeline declaration is in progress.
    pub fn is_root_binder(&self) -> bool {
        self.binders.is_empty()
    }

    /// True when the pipeline `pipe` is currently being declared.
    pub fn is_declared_pipe(&self, pipe: PipeId) -> bool {
        self.binders.iter().any(|b| b.pipe() == pipe)
    }

    // Namespaces

    /// Innermost private namespace, else the public one.
    pub fn namespace(&self) -> &Namespace {
        self.private.as_ref().unwrap_or(&self.public)
    }

    pub fn public_namespace(&self) -> &Namespace {
        &self.public
    }

    pub fn private_namespace(&self) -> Option<&Namespace> {
        self.private.as_ref()
    }

    pub fn set_public_namespace(&mut self, ns: Namespace) {
        debug!(namespace = %ns.display_name(), "set public namespace");
        self.public = ns;
    }

    pub fn push_private_namespace(&mut self) -> Namespace {
        let ns = self.runtime.pool().acquire(self.private.clone());
        self.private = Some(ns.clone());
        ns
    }

    pub fn pop_private_namespace(&mut self) -> EvalResult<Namespace> {
        let ns = self
            .private
            .take()
            .ok_or_else(|| namespace_operation("No private namespace to pop"))?;
        self.private = ns.parent();
        self.runtime.pool().release(ns);
        Ok(self.namespace().clone())
    }

    /// Run `f` inside a fresh private namespace.
    pub fn with_private_namespace<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        self.push_private_namespace();
        let result = f(self);
        let popped = self.pop_private_namespace();
        let value = result?;
        popped?;
        Ok(value)
    }

    // Names

    /// Look a simple name up in the private chain, then the public one.
    pub fn defined_name(&self, symbol: Symbol, span: Span) -> Option<Node> {
        let entry = self
            .private
            .as_ref()
            .and_then(|ns| ns.try_bind(symbol))
            .or_else(|| self.public.try_bind(symbol))?;
        Some(Node::define(
            Define::new(&entry.namespace, symbol, entry.node),
            span,
        ))
    }

    /// Bind a name, recording a bind error when it is not found.
    pub fn bind_name(&mut self, name: &UnboundName, span: Span) -> EvalResult {
        let bound = self.lookup_name(name, span)?;
        let unresolved = matches!(bound.kind(), NodeKind::Name(Name::Unbound(_)));
        if unresolved && self.bind_depth > 0 && self.soft_names == 0 && !name.is_pipe_sink() {
            self.add_bind_error(name_not_found(name).with_span(span));
        }
        Ok(bound)
    }

    /// Bind a name without recording failures. An unknown name comes back
    /// unbound.
    pub fn lookup_name(&mut self, name: &UnboundName, span: Span) -> EvalResult {
        if let Some(path) = &name.path {
            return self.resolve_path(name, path, span);
        }
        for binder in self.binders.iter().rev() {
            if let Some(var) = binder.bind_name(name.symbol) {
                return Ok(Node::variable(var, span));
            }
        }
        Ok(self
            .defined_name(name.symbol, span)
            .unwrap_or_else(|| Node::unbound_name(name.clone(), span)))
    }

    fn resolve_path(&self, name: &UnboundName, path: &NamePath, span: Span) -> EvalResult {
        let mut segments = path.segments.iter().copied();
        let Some(first) = segments.next() else {
            return Ok(self
                .defined_name(name.symbol, span)
                .unwrap_or_else(|| Node::unbound_name(name.clone(), span)));
        };
        let start = if path.relative {
            self.defined_name(first, span)
        } else {
            self.runtime.core().try_local_bind(first)
        };
        let mut ns = namespace_segment(start, first)?;
        for segment in segments {
            ns = namespace_segment(ns.try_local_bind(segment), segment)?;
        }
        match ns.try_local_bind(name.symbol) {
            Some(binding) => Ok(Node::define(Define::new(&ns, name.symbol, binding), span)),
            None => {
                let qualifier = match ns.kind() {
                    NamespaceKind::Private => None,
                    _ => ns.name(),
                };
                Ok(Node::new(
                    NodeKind::Name(Name::Undefined(Undefined {
                        namespace: ns.downgrade(),
                        symbol: name.symbol,
                        qualifier,
                    })),
                    span,
                ))
            }
        }
    }

    /// Run `f` with name-not-found recording suspended.
    pub fn with_soft_names<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.soft_names += 1;
        let result = f(self);
        self.soft_names -= 1;
        result
    }

    // Bind errors

    pub fn add_bind_error(&mut self, e: EvalError) {
        debug!(error = %e, "bind error");
        self.bind_errors.push(e);
    }

    pub fn has_bind_errors(&self) -> bool {
        !self.bind_errors.is_empty()
    }

    pub fn bind_errors(&self) -> &[EvalError] {
        &self.bind_errors
    }

    /// Drain the collected bind errors into one aggregate.
    pub fn take_bind_aggregate(&mut self) -> EvalError {
        let errors = std::mem::take(&mut self.bind_errors);
        warn!(count = errors.len(), "binding failed");
        bind_aggregate(errors)
    }
}

fn namespace_segment(node: Option<Node>, segment: Symbol) -> EvalResult<Namespace> {
    let node = node.ok_or_else(|| name_not_found(segment))?;
    node.as_namespace()
        .cloned()
        .ok_or_else(|| not_a_namespace(segment))
}

fn flow_label(node: &Node) -> String {
    let mut label = node.to_string();
    if label.len() > FLOW_LABEL_MAX {
        let mut cut = FLOW_LABEL_MAX;
        while !label.is_char_boundary(cut) {
            cut -= 1;
        }
        label.truncate(cut);
        label.push_str("...");
    }
    label
}

#[cfg(test)]
mod tests;
