//! RAII guard for the frame stack.
//!
//! `ExecutionContext::with_frame` pushes a frame and returns a
//! [`ScopedFrame`] that pops it again when dropped, including on early return
//! through `?` and during unwinding. The guard derefs to the context, so code
//! inside the scope keeps calling context methods directly.
//!
//! ```text
//! let mut scoped = ctx.with_frame(frame)?;
//! let result = body.pipe_step(&mut scoped, parms)?;
//! // frame popped here
//! ```

use std::ops::{Deref, DerefMut};

use super::ExecutionContext;

pub struct ScopedFrame<'ctx> {
    ctx: &'ctx mut ExecutionContext,
}

impl<'ctx> ScopedFrame<'ctx> {
    pub(super) fn new(ctx: &'ctx mut ExecutionContext) -> Self {
        ScopedFrame { ctx }
    }
}

impl Drop for ScopedFrame<'_> {
    fn drop(&mut self) {
        // Pushed by `with_frame`, so the stack is non-empty.
        let _ = self.ctx.pop_frame();
    }
}

impl Deref for ScopedFrame<'_> {
    type Target = ExecutionContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for ScopedFrame<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}
