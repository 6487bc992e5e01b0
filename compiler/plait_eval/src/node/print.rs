//! Canonical and extended renderings.
//!
//! `Display` writes a node the way it would be read back. `xprint` adds
//! structural tags (`[Step]`, `[Evaluator ...]`, `[ref:...]`) for debugging.

use std::fmt::{self, Write as _};

use crate::elements::Elements;
use crate::name::Name;
use crate::production::{Evaluator, EvaluatorKind};
use crate::ristic::Ristic;

use super::{BoundExpr, DataKind, ExprKind, Node, NodeKind};

fn quoted(out: &mut String, text: &str, quote: char) {
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

impl Node {
    /// Extended rendering with structural tags.
    pub fn xprint(&self, out: &mut String) {
        self.render(out, true);
    }

    fn render_elements(out: &mut String, es: &[Node], x: bool) {
        for e in es {
            e.render(out, x);
            out.push(' ');
        }
    }

    fn render(&self, out: &mut String, x: bool) {
        match self.kind() {
            NodeKind::Nil => out.push_str("()"),
            NodeKind::None => out.push_str("#none"),
            NodeKind::Number(n) => {
                let _ = write!(out, "{n}");
            }
            NodeKind::Char(c) => {
                let mut buf = [0; 4];
                quoted(out, c.encode_utf8(&mut buf), '\'');
            }
            NodeKind::String(s) => quoted(out, s, '"'),
            NodeKind::Symbol(s) => {
                let _ = write!(out, "#{s}");
            }
            NodeKind::Namespace(ns) => {
                if ns.is_private() {
                    out.push('#');
                }
                out.push_str(&ns.display_name());
            }
            NodeKind::Comment(text) => {
                let _ = write!(out, "/\" {text} \"/");
            }
            NodeKind::Trivalent(t) => {
                if x {
                    out.push_str("[Trivalent]");
                }
                let _ = write!(out, "#{t}");
            }
            NodeKind::Alias(es) => {
                out.push_str("((alias) ");
                Self::render_elements(out, es.as_slice(), x);
                out.push(')');
            }
            NodeKind::Name(name) => Self::render_name(out, name, x),
            NodeKind::Data(kind, es) => Self::render_data(out, *kind, es, x),
            NodeKind::Expr(kind, es) => {
                if x {
                    out.push_str("[Expr]");
                }
                let (open, close) = match kind {
                    ExprKind::Prod => ("( ", ')'),
                    ExprKind::Data => ("[ ", ']'),
                };
                out.push_str(open);
                Self::render_elements(out, es.as_slice(), x);
                out.push(close);
            }
            NodeKind::BoundExpr(expr) => Self::render_bound_expr(out, expr, x),
            NodeKind::Pipeline(p) => {
                out.push_str("((");
                p.signature().render_header(out);
                out.push_str(") ");
                Self::render_elements(out, p.body().as_slice(), x);
                out.push(')');
            }
            NodeKind::Step(s) => {
                if x {
                    out.push_str("[Step]");
                }
                let (prefix, rest) = s.split_for_print();
                out.push_str("( ");
                Self::render_elements(out, prefix, x);
                s.e_pipe().render(out, x);
                out.push(' ');
                Self::render_elements(out, rest, x);
                out.push(')');
            }
            NodeKind::Production(p) if x => {
                out.push_str("[Prod]");
                Node::render_evaluator(out, p.evaluator());
            }
            NodeKind::Production(p) => {
                out.push_str("( ");
                Self::render_elements(out, p.elements().as_slice(), x);
                out.push(')');
            }
            NodeKind::Evaluator(ev) => Node::render_evaluator(out, ev),
            NodeKind::Ristic(r) => Self::render_ristic(out, r, x),
            NodeKind::FrameRef(frame, inner) => {
                if x {
                    let _ = write!(out, "[ref:{}]", frame.pipe().raw());
                }
                inner.render(out, x);
            }
        }
    }

    fn render_name(out: &mut String, name: &Name, x: bool) {
        match name {
            Name::Define(d) if x => {
                let _ = write!(out, "[def {name}]");
                d.binding.render(out, x);
            }
            Name::Variable(_) if x => {
                let _ = write!(out, "[var]{name}");
            }
            _ => {
                let _ = write!(out, "{name}");
            }
        }
    }

    fn render_data(out: &mut String, kind: DataKind, es: &Elements, x: bool) {
        match kind {
            DataKind::Injection => {
                out.push_str(if x { "[Inject]( " } else { "((inj) " });
                Self::render_elements(out, es.as_slice(), x);
                out.push(')');
            }
            DataKind::Plain | DataKind::Trivial => {
                if x {
                    out.push_str(if kind == DataKind::Trivial {
                        "[Trivial]"
                    } else {
                        "[data]"
                    });
                }
                out.push_str("[ ");
                Self::render_elements(out, es.as_slice(), x);
                out.push(']');
            }
        }
    }

    fn render_bound_expr(out: &mut String, expr: &BoundExpr, x: bool) {
        out.push_str("((expr");
        out.push_str(match expr.kind {
            ExprKind::Prod => " #prod",
            ExprKind::Data => " #data",
        });
        if expr.bind {
            out.push_str(" #bind");
        }
        if expr.names {
            out.push_str(" #names");
        }
        if !expr.elements.are_bound() {
            out.push_str(" #unbound");
        }
        out.push_str(") ");
        Self::render_elements(out, expr.elements.as_slice(), x);
        out.push(')');
    }

    fn render_evaluator(out: &mut String, ev: &Evaluator) {
        if ev.kind() == EvaluatorKind::List {
            out.push_str("[ListEvaluator]( ");
        } else {
            out.push_str("[Evaluator ");
            ev.e_prod().render(out, true);
            out.push_str("]( ");
        }
        let mut first = true;
        for p in ev.parms().as_slice() {
            if !first {
                out.push(',');
            }
            first = false;
            p.render(out, true);
        }
        out.push_str(" )");
    }

    fn render_ristic(out: &mut String, r: &Ristic, x: bool) {
        match r {
            Ristic::Class(c) => {
                let _ = write!(out, "{}", c.name());
            }
            Ristic::Instance(i) => {
                out.push('(');
                i.class().render(out, x);
                for e in i.options().as_slice() {
                    out.push(' ');
                    e.render(out, x);
                }
                out.push(')');
            }
            Ristic::Unbound(es) => {
                out.push_str("( ");
                Self::render_elements(out, es.as_slice(), x);
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.render(&mut s, false);
        f.write_str(&s)
    }
}
