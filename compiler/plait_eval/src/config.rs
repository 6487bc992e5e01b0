//! Engine policy.
//!
//! `EngineConfig` bundles the limits and the print destination that a runtime
//! hands to every execution context. Named presets cover the usual modes.

use std::fmt;

use crate::print_handler::{buffer_handler, stdout_handler, SharedPrintHandler};

/// Limits and I/O policy for a runtime.
#[derive(Clone)]
pub struct EngineConfig {
    /// Maximum number of simultaneously active frames.
    pub max_frame_depth: usize,
    /// Maximum depth of the flow stack.
    pub max_flow_depth: usize,
    /// Number of released private namespaces kept for reuse.
    pub pool_capacity: usize,
    pub print: SharedPrintHandler,
}

impl EngineConfig {
    /// Standard interpreting mode: stdout output and deep limits.
    pub fn interpret() -> Self {
        EngineConfig {
            max_frame_depth: 100_000,
            max_flow_depth: 200_000,
            pool_capacity: 64,
            print: stdout_handler(),
        }
    }

    /// Test mode: buffered output and shallow limits so runaway recursion
    /// fails fast.
    pub fn testing() -> Self {
        EngineConfig {
            max_frame_depth: 512,
            max_flow_depth: 4096,
            pool_capacity: 4,
            print: buffer_handler(),
        }
    }

    #[must_use]
    pub fn with_print(mut self, print: SharedPrintHandler) -> Self {
        self.print = print;
        self
    }

    #[must_use]
    pub fn with_max_frame_depth(mut self, depth: usize) -> Self {
        self.max_frame_depth = depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::interpret()
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("max_frame_depth", &self.max_frame_depth)
            .field("max_flow_depth", &self.max_flow_depth)
            .field("pool_capacity", &self.pool_capacity)
            .finish_non_exhaustive()
    }
}
