//! Syntax forms that reshape their parameters: `inj`, `data`, `alias` and
//! `expr`.

use std::sync::Arc;

use bitflags::bitflags;
use plait_ir::Symbol;

use crate::context::ExecutionContext;
use crate::elements::Elements;
use crate::errors::{unbound_elements, EvalResult};
use crate::lists;
use crate::node::{BoundExpr, ExprKind, Node};

use super::{
    instance_node, invalid, new_unbound, symbol_of, RisticClass, RisticInstance, Validation,
};

/// What a parameterless form turns its bound parameters into.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SimpleForm {
    /// `((inj) a b)`: a splice of `a b`.
    Inj,
    /// `((data) a b)`: plain data.
    Data,
    /// `((alias) a b)`: an alias.
    Alias,
}

impl SimpleForm {
    fn form(self) -> &'static str {
        match self {
            SimpleForm::Inj => "inj",
            SimpleForm::Data => "data",
            SimpleForm::Alias => "alias",
        }
    }
}

pub struct SimpleFormClass {
    name: Symbol,
    form: SimpleForm,
}

impl SimpleFormClass {
    pub fn inj(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(SimpleFormClass {
            name,
            form: SimpleForm::Inj,
        })
    }

    pub fn data(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(SimpleFormClass {
            name,
            form: SimpleForm::Data,
        })
    }

    pub fn alias(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(SimpleFormClass {
            name,
            form: SimpleForm::Alias,
        })
    }
}

impl RisticClass for SimpleFormClass {
    fn name(&self) -> Symbol {
        self.name
    }

    fn ristic_reduce(&self, _ctx: &mut ExecutionContext, class: &Node, parms: &Node) -> EvalResult {
        if !parms.elements().is_empty() {
            return Err(invalid(self.form.form(), parms, "No parameters required"));
        }
        Ok(instance_node(
            Arc::new(SimpleFormInstance {
                class: class.clone(),
                options: Elements::Empty,
                form: self.form,
            }),
            parms.span(),
        ))
    }
}

struct SimpleFormInstance {
    class: Node,
    options: Elements,
    form: SimpleForm,
}

impl RisticInstance for SimpleFormInstance {
    fn class(&self) -> &Node {
        &self.class
    }

    fn options(&self) -> &Elements {
        &self.options
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        let elements = parms.elements().bind(ctx)?;
        let span = parms.span();
        Ok(match self.form {
            SimpleForm::Inj => lists::new_injected_data(elements, span),
            SimpleForm::Data => lists::new_data(elements, span),
            SimpleForm::Alias => Node::alias(elements, span),
        })
    }
}

bitflags! {
    /// Options of an `expr` form.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    struct ExprFlags: u8 {
        const PROD = 1 << 0;
        const DATA = 1 << 1;
        /// Bind the elements instead of only expanding them.
        const BIND = 1 << 2;
        /// Resolve names only.
        const NAMES = 1 << 3;
        /// Unbound elements are not an error.
        const UNBOUND = 1 << 4;
    }
}

impl ExprFlags {
    fn from_option(text: &str) -> Option<ExprFlags> {
        match text {
            "prod" => Some(Self::PROD),
            "data" => Some(Self::DATA),
            "bind" => Some(Self::BIND),
            "names" => Some(Self::NAMES),
            "unbound" => Some(Self::UNBOUND),
            _ => None,
        }
    }
}

/// `((expr #prod #bind) a b)`: keeps `a b` as an expression, optionally
/// bound, instead of compiling it.
pub struct ExprClass {
    name: Symbol,
}

impl ExprClass {
    pub fn new(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(ExprClass { name })
    }
}

impl RisticClass for ExprClass {
    fn name(&self) -> Symbol {
        self.name
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, class: &Node, parms: &Node) -> EvalResult {
        let elements = parms.elements().expand(ctx)?.bind(ctx)?;
        if elements.has_variable_elements() || elements.is_empty() {
            return Ok(new_unbound(class, elements.as_slice(), parms.span()));
        }

        let mut v = Validation::new("expr");
        let mut flags = ExprFlags::empty();
        for e in elements.as_slice() {
            let Some(sym) = symbol_of(e) else {
                v.error(e, "Invalid parameter for expression ristic");
                continue;
            };
            let Some(flag) = ExprFlags::from_option(sym.as_str()) else {
                v.error(
                    e,
                    "Invalid option for expression ristic. Must be #prod, #data, #bind, #names or #unbound",
                );
                continue;
            };
            if flags.contains(flag) {
                v.error(e, format!("Duplicate option '#{sym}'"));
            }
            flags.insert(flag);
        }
        let types = ExprFlags::PROD | ExprFlags::DATA;
        if !flags.intersects(types) {
            v.error(parms, "A type option of #prod or #data must be provided");
        } else if flags.contains(types) {
            v.error(parms, "Type options #prod or #data are mutually exclusive");
        }
        v.finish(parms)?;

        Ok(instance_node(
            Arc::new(ExprInstance {
                class: class.clone(),
                options: elements,
                flags,
            }),
            parms.span(),
        ))
    }
}

struct ExprInstance {
    class: Node,
    options: Elements,
    flags: ExprFlags,
}

impl RisticInstance for ExprInstance {
    fn class(&self) -> &Node {
        &self.class
    }

    fn options(&self) -> &Elements {
        &self.options
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        let flags = self.flags;
        let bind = flags.contains(ExprFlags::BIND);
        let names = flags.contains(ExprFlags::NAMES);
        let elements = if bind {
            let elements = if names {
                parms.elements().bind_names(ctx)?
            } else {
                parms.elements().bind(ctx)?
            };
            if !flags.contains(ExprFlags::UNBOUND) && !elements.are_bound() {
                ctx.add_bind_error(unbound_elements().with_span(parms.span()));
            }
            elements
        } else {
            parms.elements().expand(ctx)?
        };
        let kind = if flags.contains(ExprFlags::PROD) {
            ExprKind::Prod
        } else {
            ExprKind::Data
        };
        Ok(Node::bound_expr(
            BoundExpr {
                kind,
                elements,
                bind,
                names,
            },
            parms.span(),
        ))
    }
}
