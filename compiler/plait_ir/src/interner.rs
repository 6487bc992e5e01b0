//! Sharded symbol interner.
//!
//! One interner is owned by each engine runtime and shared by every
//! execution context forked from it. Lookups take a shard read lock; only a
//! first-time insert takes the shard write lock.

use super::Symbol;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-shard storage.
struct InternShard {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Shard exceeded the 28-bit local index space.
    ShardOverflow { shard_idx: usize, count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::ShardOverflow { shard_idx, count } => write!(
                f,
                "interner shard {shard_idx} exceeded capacity: {count} symbols, max is {}",
                Symbol::MAX_LOCAL
            ),
        }
    }
}

impl std::error::Error for InternError {}

impl InternShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(128),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Sharded string interner.
///
/// # Thread Safety
/// Each shard sits behind its own `RwLock`; wrap in [`SharedInterner`] to share.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Symbol::NUM_SHARDS],
    total_count: AtomicUsize,
}

impl StringInterner {
    /// Words the engine recognises in option lists and literals.
    pub const RESERVED: &'static [&'static str] = &[
        "#args", "#vargs", "#nparms", "#prod", "#data", "#bind", "#names", "#unbound", "local",
        "true", "false", "unknown", "core",
    ];

    /// Create a new interner with the reserved words pre-interned.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(InternShard::with_empty())
            } else {
                RwLock::new(InternShard::new())
            }
        });
        let interner = Self {
            shards,
            total_count: AtomicUsize::new(1),
        };
        for word in Self::RESERVED {
            interner.intern(word);
        }
        interner
    }

    /// Shard holding `s`, as an array index and as the symbol's shard tag.
    /// Names in one program often share a prefix, so the whole text is
    /// hashed.
    #[inline]
    fn shard_for(s: &str) -> (usize, u32) {
        let hash = s
            .bytes()
            .fold(0u32, |h, b| h.rotate_left(5) ^ u32::from(b));
        #[expect(
            clippy::cast_possible_truncation,
            reason = "NUM_SHARDS fits in u32"
        )]
        let tag = hash % Symbol::NUM_SHARDS as u32;
        (tag as usize, tag)
    }

    fn lookup(&self, idx: usize, tag: u32, s: &str) -> Option<Symbol> {
        let guard = self.shards[idx].read();
        guard
            .map
            .get_key_value(s)
            .map(|(&text, &local)| Symbol::new(tag, local, text))
    }

    /// Intern a string, or report shard overflow.
    pub fn try_intern(&self, s: &str) -> Result<Symbol, InternError> {
        let (idx, tag) = Self::shard_for(s);
        if let Some(sym) = self.lookup(idx, tag, s) {
            return Ok(sym);
        }

        let mut guard = self.shards[idx].write();
        // Another thread may have inserted it between the two locks.
        if let Some((&text, &local)) = guard.map.get_key_value(s) {
            return Ok(Symbol::new(tag, local, text));
        }
        let count = guard.strings.len();
        let local = u32::try_from(count)
            .ok()
            .filter(|local| *local <= Symbol::MAX_LOCAL)
            .ok_or(InternError::ShardOverflow {
                shard_idx: idx,
                count,
            })?;
        let text: &'static str = Box::leak(s.into());
        guard.strings.push(text);
        guard.map.insert(text, local);
        self.total_count.fetch_add(1, Ordering::Relaxed);
        Ok(Symbol::new(tag, local, text))
    }

    /// Intern a string.
    ///
    /// # Panics
    /// Panics if a shard exceeds its capacity. Use `try_intern` to handle it.
    #[inline]
    pub fn intern(&self, s: &str) -> Symbol {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Find an already-interned symbol without inserting.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        let (idx, tag) = Self::shard_for(s);
        self.lookup(idx, tag, s)
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// True when only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Interner shared by a runtime and all of its execution contexts.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests;
