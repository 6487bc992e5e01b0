//! Plait Eval - binding and evaluation engine for the Plait list language.
//!
//! Source arrives as classified leaves through an [`ExpressionBuilder`];
//! everything after that is a [`Node`]. Evaluation runs in phases:
//! - bind: resolve names and let head-position syntax forms rewrite their
//!   expression
//! - step: one unit of lazy execution
//! - evaluate: step until nothing productive is left
//! - reduce: evaluate, then unwrap single-element data and aliases
//!
//! # Architecture
//!
//! - [`Runtime`]: interner, core namespace, private namespace pool and the
//!   syntax-form and primitive registration tables
//! - [`ExecutionContext`]: the frame, flow, binder and private namespace
//!   stacks of one evaluation path
//! - [`Elements`]: child sequences (fixed, with variables, or with splices)
//! - [`Pipeline`], [`Step`], [`Production`]: executable code, partial
//!   applications and compiled expressions
//! - [`Frame`]: per-invocation variable storage

mod builder;
pub mod config;
pub mod context;
pub mod elements;
pub mod errors;
mod expression;
pub mod frame;
pub mod lists;
pub mod name;
pub mod namespace;
pub mod node;
pub mod number;
pub mod pipeline;
mod prelude;
pub mod prim;
pub mod print_handler;
pub mod production;
pub mod ristic;
mod runtime;
mod stack;
pub mod tracing_setup;
pub mod trivalent;

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;

pub use builder::ExpressionBuilder;
pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use elements::Elements;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use frame::Frame;
pub use name::{Name, UnboundName};
pub use namespace::{Namespace, NamespaceKind};
pub use node::{ArithOp, DataKind, ExprKind, Node, NodeKind};
pub use number::Number;
pub use pipeline::{Pipeline, Step};
pub use print_handler::{buffer_handler, silent_handler, stdout_handler, SharedPrintHandler};
pub use production::Production;
pub use runtime::{Runtime, DOT_RISTIC};
pub use trivalent::Trivalent;
