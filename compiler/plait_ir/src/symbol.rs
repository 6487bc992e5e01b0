//! Interned symbol.
//!
//! A `Symbol` is produced only by [`crate::StringInterner`]. Equality, ordering
//! and hashing use the packed id; the text rides along so a node can be
//! printed without access to the interner.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Interned identifier.
///
/// Layout of `raw`: shard index in bits 31-28, local index in bits 27-0.
#[derive(Copy, Clone)]
pub struct Symbol {
    raw: u32,
    text: &'static str,
}

impl Symbol {
    /// Maximum local index per shard.
    pub const MAX_LOCAL: u32 = 0x0FFF_FFFF;

    /// Number of interner shards.
    pub const NUM_SHARDS: usize = 16;

    #[inline]
    pub(crate) const fn new(shard: u32, local: u32, text: &'static str) -> Self {
        debug_assert!(shard < 16);
        debug_assert!(local <= Self::MAX_LOCAL);
        Symbol {
            raw: (shard << 28) | local,
            text,
        }
    }

    /// Shard index.
    #[inline]
    pub const fn shard(self) -> usize {
        (self.raw >> 28) as usize
    }

    /// Index within the shard.
    #[inline]
    pub const fn local(self) -> usize {
        (self.raw & Self::MAX_LOCAL) as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.raw
    }

    /// The interned text.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        self.text
    }

    /// First character, if any.
    pub fn lead(self) -> Option<char> {
        self.text.chars().next()
    }
}

impl PartialEq for Symbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Symbol {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?}@{}:{})", self.text, self.shard(), self.local())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

#[cfg(test)]
mod tests;
