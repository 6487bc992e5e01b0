//! Shared harness for the integration suites.
//!
//! `Engine` drives the public API only: a whitespace tokenizer feeds an
//! `ExpressionBuilder`, and each phase goes through an `ExecutionContext`.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use plait_eval::{
    buffer_handler, EngineConfig, EvalResult, ExecutionContext, ExprKind, ExpressionBuilder,
    Node, Number, Runtime,
};
use plait_ir::Span;

pub struct Engine {
    pub runtime: Runtime,
    pub ctx: ExecutionContext,
}

fn tokens(src: &str) -> Vec<String> {
    src.replace('(', " ( ")
        .replace(')', " ) ")
        .replace('[', " [ ")
        .replace(']', " ] ")
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

impl Engine {
    pub fn new() -> Self {
        plait_eval::tracing_setup::init_tracing();
        let config = EngineConfig::testing().with_print(buffer_handler());
        let runtime = Runtime::new(config).expect("runtime starts");
        let ctx = ExecutionContext::new(runtime.clone());
        Engine { runtime, ctx }
    }

    /// Read `src` as a single expression. Only brackets, integers, `#symbols`
    /// and names are understood.
    pub fn read(&self, src: &str) -> EvalResult<Node> {
        let mut b = ExpressionBuilder::new(&self.runtime);
        let d = Span::DUMMY;
        for tok in tokens(src) {
            match tok.as_str() {
                "(" => b.open(ExprKind::Prod, d),
                "[" => b.open(ExprKind::Data, d),
                ")" => b.close(ExprKind::Prod, d)?,
                "]" => b.close(ExprKind::Data, d)?,
                t if t.starts_with('#') => b.symbol(&t[1..], d),
                t => match t.parse::<i32>() {
                    Ok(n) => b.number(Number::Int32(n), d),
                    Err(_) => b.name(t, d)?,
                },
            }
        }
        let mut nodes = b.finish()?;
        assert_eq!(nodes.len(), 1, "expected one expression in {src:?}");
        Ok(nodes.remove(0))
    }

    pub fn bind(&mut self, src: &str) -> EvalResult {
        let node = self.read(src)?;
        self.ctx.bind(&node)
    }

    pub fn reduce(&mut self, src: &str) -> EvalResult {
        let bound = self.bind(src)?;
        self.ctx.reduce(&bound)
    }

    pub fn show(&mut self, src: &str) -> String {
        match self.reduce(src) {
            Ok(node) => node.to_string(),
            Err(e) => panic!("{src} failed: {e}"),
        }
    }

    pub fn output(&self) -> String {
        self.runtime.config().print.output()
    }
}
