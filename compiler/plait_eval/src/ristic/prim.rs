//! The `prim` syntax form: `(prim core head)` resolves a registered native
//! function. The resulting instance calls it with whatever parameters it is
//! stepped with, so it works both as a pipeline stage and, at the head of an
//! expression, at bind time.

use std::fmt;
use std::sync::Arc;

use plait_ir::Symbol;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::{unknown_primitive, EvalResult};
use crate::node::Node;

use super::{instance_node, invalid, new_unbound, rejected, symbol_of, RisticClass, RisticInstance};

/// Native implementation of a primitive. Receives the configured instance
/// (for its extra options) and the parameters it was stepped with.
pub type PrimitiveFn = fn(&mut ExecutionContext, &Primitive, &Node) -> EvalResult;

pub struct PrimClass {
    name: Symbol,
}

impl PrimClass {
    pub fn new(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(PrimClass { name })
    }
}

impl RisticClass for PrimClass {
    fn name(&self) -> Symbol {
        self.name
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, class: &Node, parms: &Node) -> EvalResult {
        let elements = parms.elements().expand(ctx)?.bind(ctx)?;
        let es = elements.as_slice();
        if elements.has_variable_elements() || es.len() < 2 {
            return Ok(new_unbound(class, es, parms.span()));
        }
        let Some(class_name) = symbol_of(&es[0]) else {
            return Err(invalid("prim", parms, "Symbol expected for primitive class name"));
        };
        let Some(method) = symbol_of(&es[1]) else {
            return Err(invalid("prim", parms, "Symbol expected for primitive method name"));
        };
        let Some(func) = ctx.runtime().primitive(class_name, method) else {
            let e = unknown_primitive(class_name, method).with_span(parms.span());
            return Err(rejected("prim", parms, e));
        };
        Ok(instance_node(
            Arc::new(Primitive {
                class: class.clone(),
                options: elements.clone(),
                class_name,
                method,
                func,
            }),
            parms.span(),
        ))
    }
}

/// A resolved native function.
pub struct Primitive {
    class: Node,
    options: Elements,
    class_name: Symbol,
    method: Symbol,
    func: PrimitiveFn,
}

impl Primitive {
    pub fn class_name(&self) -> Symbol {
        self.class_name
    }

    pub fn method(&self) -> Symbol {
        self.method
    }

    /// Options written after the method name.
    pub fn extra(&self) -> &[Node] {
        self.options.as_slice().get(2..).unwrap_or_default()
    }
}

impl RisticInstance for Primitive {
    fn class(&self) -> &Node {
        &self.class
    }

    fn options(&self) -> &Elements {
        &self.options
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        (self.func)(ctx, self, parms)
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitive")
            .field("class", &self.class_name)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}
