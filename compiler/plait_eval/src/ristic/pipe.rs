//! The `pipeline` and `bindpipe` syntax forms.
//!
//! `((pipeline 20 (#args a b)) a + b)`: the class validates the options and
//! configures a signature; the instance binds the body with the declared
//! variables in scope and yields a [`Pipeline`] node.

use std::sync::Arc;

use plait_ir::Symbol;
use tracing::trace;

use crate::context::{ExecutionContext, VariableBinder};
use crate::elements::Elements;
use crate::errors::{duplicate_pipe_variable, EvalResult};
use crate::name::{sink_target, Name, Variable};
use crate::node::{Node, NodeKind};
use crate::number::Number;
use crate::pipeline::{PipeOptions, PipeSignature, Pipeline};

use super::{instance_node, new_unbound, symbol_of, RisticClass, RisticInstance, Validation};

const OPT_ARGS: &str = "args";
const OPT_VARGS: &str = "vargs";
const OPT_NPARMS: &str = "nparms";

/// Class of executable (`pipeline`) or binding (`bindpipe`) pipelines.
pub struct PipeClass {
    name: Symbol,
    binding: bool,
}

impl PipeClass {
    pub fn pipeline(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(PipeClass {
            name,
            binding: false,
        })
    }

    pub fn bindpipe(name: Symbol) -> Arc<dyn RisticClass> {
        Arc::new(PipeClass {
            name,
            binding: true,
        })
    }

    fn form(&self) -> &'static str {
        if self.binding {
            "bindpipe"
        } else {
            "pipeline"
        }
    }
}

impl RisticClass for PipeClass {
    fn name(&self) -> Symbol {
        self.name
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, class: &Node, parms: &Node) -> EvalResult {
        // Variable names in option lists are not meant to resolve.
        let elements = ctx.with_soft_names(|ctx| parms.elements().expand(ctx)?.bind(ctx))?;
        if elements.has_variable_elements() {
            return Ok(new_unbound(class, elements.as_slice(), parms.span()));
        }
        let opts = check_pipe_options(ctx, self.binding, &elements, parms, self.form())?;
        let signature = PipeSignature::new(ctx.runtime().next_pipe_id(), self.binding, opts);
        trace!(pipe = ?signature.id, form = self.form(), "pipeline signature");
        Ok(instance_node(
            Arc::new(PipeInstance {
                class: class.clone(),
                options: elements,
                signature: Arc::new(signature),
            }),
            parms.span(),
        ))
    }
}

/// Option-list elements: a bare symbol stands for a one-element list.
fn option_list(ctx: &mut ExecutionContext, e: &Node) -> EvalResult<Vec<Node>> {
    if symbol_of(e).is_some() {
        return Ok(vec![e.clone()]);
    }
    e.elements().expanded(ctx)
}

fn count_of(e: &Node) -> Option<i32> {
    e.as_number().and_then(Number::exact_i32)
}

/// Validate every option and collect the configuration. All problems are
/// reported together.
fn check_pipe_options(
    ctx: &mut ExecutionContext,
    binding: bool,
    elements: &Elements,
    source: &Node,
    form: &str,
) -> EvalResult<PipeOptions> {
    let mut v = Validation::new(form);
    let mut opts = PipeOptions::default();
    let mut seen: Vec<&'static str> = Vec::new();
    let mut declared: Vec<Symbol> = Vec::new();
    let mut parm_count_at: Option<Node> = None;
    let mut prefix_at: Option<Node> = None;
    let mut precedence_seen = false;

    for e in elements.as_slice() {
        if e.is_atomic() && symbol_of(e).is_none() {
            match count_of(e) {
                _ if precedence_seen => v.error(e, "Precedence has already been defined"),
                None => v.error(e, "Invalid precedence for pipeline ristic"),
                Some(prec) if prec < 0 => v.error(e, "Precedence cannot be negative"),
                Some(prec) => opts.precedence = Some(prec),
            }
            if binding {
                v.error(e, "Precedence not valid for binding pipeline ristic");
            } else {
                precedence_seen = true;
            }
            continue;
        }

        let es = option_list(ctx, e)?;
        let Some(head) = es.first() else {
            v.error(e, "Option list is empty");
            continue;
        };
        let Some(sym) = symbol_of(head) else {
            v.error(head, format!("Invalid option {head}"));
            continue;
        };
        let option = match sym.as_str() {
            OPT_ARGS => OPT_ARGS,
            OPT_VARGS => OPT_VARGS,
            OPT_NPARMS => OPT_NPARMS,
            _ => {
                v.error(head, "Invalid option list type");
                continue;
            }
        };
        if seen.contains(&option) {
            v.error(head, format!("Duplicate option '#{option}'"));
        }
        seen.push(option);

        match option {
            OPT_NPARMS => {
                if es.len() == 1 || es.len() > 3 {
                    v.error(
                        head,
                        "Only parameter count and optional prefix parameter count required for #nparms",
                    );
                }
                if let Some(count) = es.get(1) {
                    match count_of(count) {
                        None => v.error(count, "Invalid parameter count for #nparms"),
                        Some(n) if n < 0 => {
                            v.error(count, "#nparms parameter count cannot be negative");
                        }
                        Some(n) => {
                            opts.parm_count = usize::try_from(n).ok();
                            parm_count_at = Some(count.clone());
                        }
                    }
                }
                if let Some(prefix) = es.get(2) {
                    match count_of(prefix) {
                        None => v.error(prefix, "Invalid prefix parameter count for #nparms"),
                        Some(n) if n < 1 => v.error(
                            prefix,
                            "#nparms prefix parameter count must be greater than zero",
                        ),
                        Some(n) => {
                            opts.prefix_count = usize::try_from(n).ok();
                            prefix_at = Some(prefix.clone());
                        }
                    }
                    if binding {
                        v.error(
                            prefix,
                            "#nparms prefix parameter count is not valid for binding pipeline ristic",
                        );
                    }
                }
                continue;
            }
            OPT_VARGS => {
                opts.vargs_flag = true;
                if es.len() > 2 {
                    v.error(head, "Only one optional variable required for #vargs");
                }
            }
            _ => {}
        }

        let mut names = Vec::with_capacity(es.len().saturating_sub(1));
        for name in &es[1..] {
            let Some(sym) = name.as_name().map(Name::symbol) else {
                v.error(name, "Invalid variable name");
                continue;
            };
            if declared.contains(&sym) {
                v.error(name, "Variable has already been declared");
            }
            declared.push(sym);
            names.push(sym);
        }
        if option == OPT_ARGS {
            opts.args = names;
        } else {
            opts.vargs = names.first().copied();
        }
    }

    if let (Some(n), Some(at)) = (opts.parm_count, &parm_count_at) {
        if seen.contains(&OPT_ARGS) && n < opts.args.len() {
            v.error(at, "Parameter count is less than argument count");
        }
        if let (Some(p), Some(pat)) = (opts.prefix_count, &prefix_at) {
            if p > n {
                v.error(pat, "Prefix parameter count is greater than parameter count");
            }
        }
    }

    v.finish(source)?;
    Ok(opts)
}

/// A configured pipeline form, ready to take a body.
pub struct PipeInstance {
    class: Node,
    options: Elements,
    signature: Arc<PipeSignature>,
}

impl PipeInstance {
    pub fn signature(&self) -> &Arc<PipeSignature> {
        &self.signature
    }

    /// Bind the body. Unbound `|x` names become sinks and `x` reads them
    /// from the following elements on.
    fn build(&self, ctx: &mut ExecutionContext, parms: &Node, root: bool) -> EvalResult {
        let sig = &self.signature;
        let mut es = parms.elements().expanded(ctx)?;
        let mut sinks: Vec<Variable> = Vec::new();
        let mut idx = sig.vars.len();

        for slot in &mut es {
            let e = slot.bind(ctx)?;
            let target = match e.kind() {
                NodeKind::Name(Name::Unbound(n)) if n.is_pipe_sink() => {
                    sink_target(n.symbol.as_str())
                }
                _ => None,
            };
            let Some(target) = target else {
                *slot = e;
                continue;
            };
            let symbol = ctx.intern(target);
            if sinks.iter().any(|s| s.symbol == symbol) {
                ctx.add_bind_error(duplicate_pipe_variable(symbol).with_span(e.span()));
                return Err(ctx.take_bind_aggregate());
            }
            let var = Variable::sink(symbol, sig.id, idx);
            ctx.push_binder(VariableBinder::Sink(var.reader()));
            *slot = Node::variable(var.clone(), e.span());
            sinks.push(var);
            idx += 1;
        }

        let pipeline = Pipeline::new(Arc::clone(sig), Elements::make(es), sinks, root);
        Ok(Node::new(NodeKind::Pipeline(Arc::new(pipeline)), parms.span()))
    }
}

impl RisticInstance for PipeInstance {
    fn class(&self) -> &Node {
        &self.class
    }

    fn options(&self) -> &Elements {
        &self.options
    }

    fn ristic_reduce(&self, ctx: &mut ExecutionContext, parms: &Node) -> EvalResult {
        let root = ctx.is_root_binder() && !parms.elements().has_variables();
        let depth = ctx.binder_depth();
        ctx.push_binder(VariableBinder::Pipe(Arc::clone(&self.signature)));
        let result = self.build(ctx, parms, root);
        ctx.truncate_binders(depth);
        result
    }
}
