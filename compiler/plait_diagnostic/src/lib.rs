//! Diagnostics for the Plait engine.
//!
//! Every engine failure maps to a stable [`ErrorCode`] so front ends can
//! search, filter and document errors without parsing message text. A
//! [`Diagnostic`] is the rendered, front-end facing form of an engine error;
//! aggregate bind failures carry one child diagnostic per collected problem.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
