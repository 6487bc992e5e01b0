//! Test helpers: a small source reader feeding the expression builder, and
//! a session wrapping a runtime with one execution context.
//!
//! Reader syntax:
//! - `( ... )` productions, `[ ... ]` data
//! - `#name` symbols, `'c'` chars, `"text"` strings
//! - integers (`i64` when they do not fit `i32`), floats with a `.`
//! - `true`, `false`, `unknown` trivalents
//! - anything else is a name

#![allow(clippy::unwrap_used, clippy::expect_used)]

use plait_ir::Span;

use crate::builder::ExpressionBuilder;
use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::errors::EvalResult;
use crate::node::{ExprKind, Node};
use crate::number::Number;
use crate::print_handler::buffer_handler;
use crate::runtime::Runtime;
use crate::trivalent::Trivalent;

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']')
}

fn span(start: usize, end: usize) -> Span {
    Span::try_from_range(start..end).unwrap()
}

fn number(text: &str) -> Option<Number> {
    if text.contains('.') {
        return text.parse().ok().map(Number::Float);
    }
    text.parse::<i32>()
        .map(Number::Int32)
        .or_else(|_| text.parse::<i64>().map(Number::Int64))
        .ok()
}

/// Feed `src` to a builder and return the top-level nodes.
pub fn read(runtime: &Runtime, src: &str) -> EvalResult<Vec<Node>> {
    let mut b = ExpressionBuilder::new(runtime);
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map_or(src.len(), |&(pos, _)| pos);
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' | '[' => {
                let kind = if c == '(' { ExprKind::Prod } else { ExprKind::Data };
                b.open(kind, span(pos, pos + 1));
                i += 1;
            }
            ')' | ']' => {
                let kind = if c == ')' { ExprKind::Prod } else { ExprKind::Data };
                b.close(kind, span(pos, pos + 1))?;
                i += 1;
            }
            '"' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].1 != '"' {
                    j += 1;
                }
                let text = &src[pos + 1..end_of(j)];
                b.string(text, span(pos, end_of(j + 1)));
                i = j + 1;
            }
            '\'' => {
                let ch = chars[i + 1].1;
                b.char(ch, span(pos, end_of(i + 3)));
                i += 3;
            }
            _ => {
                let mut j = i;
                while j < chars.len() && !is_delimiter(chars[j].1) {
                    j += 1;
                }
                let text = &src[pos..end_of(j)];
                let sp = span(pos, end_of(j));
                if let Some(sym) = text.strip_prefix('#') {
                    b.symbol(sym, sp);
                } else if let Some(n) = number(text) {
                    b.number(n, sp);
                } else {
                    match text {
                        "true" => b.trivalent(Trivalent::True, sp),
                        "false" => b.trivalent(Trivalent::False, sp),
                        "unknown" => b.trivalent(Trivalent::Unknown, sp),
                        _ => b.name(text, sp)?,
                    }
                }
                i = j;
            }
        }
    }
    b.finish()
}

/// A runtime with buffered output and a context over it.
pub struct Session {
    pub runtime: Runtime,
    pub ctx: ExecutionContext,
}

impl Session {
    pub fn new() -> Self {
        crate::tracing_setup::init_tracing();
        let config = EngineConfig::testing().with_print(buffer_handler());
        let runtime = Runtime::new(config).unwrap();
        let ctx = ExecutionContext::new(runtime.clone());
        Session { runtime, ctx }
    }

    /// The single node `src` reads as.
    pub fn read(&self, src: &str) -> Node {
        let mut nodes = read(&self.runtime, src).unwrap();
        assert_eq!(nodes.len(), 1, "expected one expression in {src:?}");
        nodes.pop().unwrap()
    }

    pub fn bind(&mut self, src: &str) -> EvalResult {
        let node = self.read(src);
        self.ctx.bind(&node)
    }

    pub fn evaluate(&mut self, src: &str) -> EvalResult {
        let bound = self.bind(src)?;
        self.ctx.evaluate(&bound)
    }

    pub fn reduce(&mut self, src: &str) -> EvalResult {
        let bound = self.bind(src)?;
        self.ctx.reduce(&bound)
    }

    /// Rendering of `src` reduced.
    pub fn show(&mut self, src: &str) -> String {
        self.reduce(src).unwrap().to_string()
    }

    /// Everything printed so far.
    pub fn output(&self) -> String {
        self.runtime.config().print.output()
    }
}
