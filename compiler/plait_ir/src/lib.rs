//! Shared leaf types for the Plait engine.
//!
//! - [`Symbol`]: interned identifier carrying its own text
//! - [`StringInterner`] / [`SharedInterner`]: sharded, thread-safe interning
//! - [`Span`]: byte range into the source handed to the expression builder

mod interner;
mod span;
mod symbol;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use span::{Span, SpanError};
pub use symbol::Symbol;
