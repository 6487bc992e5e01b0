//! Process-level engine state.
//!
//! A [`Runtime`] owns everything execution contexts share: the interner, the
//! core namespace (root of the public namespace tree), the private namespace
//! pool, the pipe id source and the two registration tables. The tables are
//! built once in [`Runtime::new`]; nothing is looked up by loading code at
//! run time.
//!
//! Startup binds the bootstrap class `.ristic` in the core namespace and then
//! declares the standard syntax forms through it, followed by the prelude
//! operators.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use plait_ir::{SharedInterner, StringInterner, Symbol};

use crate::config::EngineConfig;
use crate::errors::{
    ristic_already_registered, unknown_ristic_implementation, EvalErrorKind, EvalResult,
};
use crate::name::PipeId;
use crate::namespace::{Namespace, NamespacePool};
use crate::node::Node;
use crate::prelude;
use crate::prim;
use crate::ristic::{
    class_node, DotRistic, ExprClass, PipeClass, PrimClass, PrimitiveFn, RisticFactory,
    SimpleFormClass,
};

/// Name the bootstrap class is bound under.
pub const DOT_RISTIC: &str = ".ristic";

/// Syntax-form implementations, by implementation name.
fn ristic_table() -> FxHashMap<&'static str, RisticFactory> {
    let mut table: FxHashMap<&'static str, RisticFactory> = FxHashMap::default();
    table.insert("pipeline", PipeClass::pipeline);
    table.insert("bindpipe", PipeClass::bindpipe);
    table.insert("prim", PrimClass::new);
    table.insert("inj", SimpleFormClass::inj);
    table.insert("data", SimpleFormClass::data);
    table.insert("alias", SimpleFormClass::alias);
    table.insert("expr", ExprClass::new);
    table
}

/// Classes declared at startup: (bound name, implementation name).
const STANDARD_RISTICS: &[(&str, &str)] = &[
    ("pipeline", "pipeline"),
    ("bindpipe", "bindpipe"),
    ("prim", "prim"),
    ("inj", "inj"),
    ("data", "data"),
    ("alias", "alias"),
    ("expr", "expr"),
];

struct RuntimeData {
    config: EngineConfig,
    interner: SharedInterner,
    core: Namespace,
    pool: NamespacePool,
    next_pipe: AtomicU64,
    ristics: FxHashMap<&'static str, RisticFactory>,
    primitives: FxHashMap<(&'static str, &'static str), PrimitiveFn>,
}

/// Shared engine state. Cloning is cheap.
#[derive(Clone)]
pub struct Runtime(Arc<RuntimeData>);

impl Runtime {
    /// Build the registries and the core namespace, then run the startup
    /// declarations.
    pub fn new(config: EngineConfig) -> EvalResult<Runtime> {
        let pool = NamespacePool::new(config.pool_capacity);
        let core = Namespace::new_core(pool.next_id(), "core");
        let runtime = Runtime(Arc::new(RuntimeData {
            config,
            interner: SharedInterner::new(),
            core,
            pool,
            next_pipe: AtomicU64::new(1),
            ristics: ristic_table(),
            primitives: prim::primitive_table(),
        }));

        let dot = runtime.intern(DOT_RISTIC);
        runtime.core().add_binding(dot, class_node(DotRistic::new(dot)))?;
        for (name, imp) in STANDARD_RISTICS {
            runtime.declare_ristic(runtime.intern(name), runtime.intern(imp))?;
        }
        prelude::install(&runtime)?;
        debug!(
            ristics = runtime.0.ristics.len(),
            primitives = runtime.0.primitives.len(),
            "runtime ready"
        );
        Ok(runtime)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.0.config
    }

    pub fn interner(&self) -> &StringInterner {
        &self.0.interner
    }

    pub fn intern(&self, text: &str) -> Symbol {
        self.0.interner.intern(text)
    }

    /// Root of the public namespace tree.
    pub fn core(&self) -> &Namespace {
        &self.0.core
    }

    pub fn pool(&self) -> &NamespacePool {
        &self.0.pool
    }

    pub fn next_pipe_id(&self) -> PipeId {
        PipeId::new(self.0.next_pipe.fetch_add(1, Ordering::Relaxed))
    }

    /// Bind a new syntax-form class `name` in the core namespace, built by
    /// the implementation registered as `implementation`.
    pub fn declare_ristic(&self, name: Symbol, implementation: Symbol) -> EvalResult<Node> {
        let factory = self
            .0
            .ristics
            .get(implementation.as_str())
            .ok_or_else(|| unknown_ristic_implementation(implementation))?;
        let node = class_node(factory(name));
        let node = self.core().add_binding(name, node).map_err(|e| {
            if matches!(e.kind, EvalErrorKind::DuplicateName { .. }) {
                ristic_already_registered(name)
            } else {
                e
            }
        })?;
        debug!(%name, %implementation, "declared syntax form");
        Ok(node)
    }

    /// Native function registered under (`class`, `method`).
    pub fn primitive(&self, class: Symbol, method: Symbol) -> Option<PrimitiveFn> {
        self.0
            .primitives
            .get(&(class.as_str(), method.as_str()))
            .copied()
    }

    pub fn has_ristic_implementation(&self, implementation: &str) -> bool {
        self.0.ristics.contains_key(implementation)
    }
}
