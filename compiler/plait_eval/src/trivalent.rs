//! Three-valued boolean.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Trivalent {
    True,
    False,
    Unknown,
}

impl Trivalent {
    pub fn from_bool(b: bool) -> Self {
        if b {
            Trivalent::True
        } else {
            Trivalent::False
        }
    }

    /// Logical negation; unknown stays unknown.
    #[must_use]
    pub fn neg(self) -> Self {
        match self {
            Trivalent::True => Trivalent::False,
            Trivalent::False => Trivalent::True,
            Trivalent::Unknown => Trivalent::Unknown,
        }
    }

    /// Pick the branch matching this value.
    pub fn select<T>(self, if_true: T, if_false: T, if_unknown: T) -> T {
        match self {
            Trivalent::True => if_true,
            Trivalent::False => if_false,
            Trivalent::Unknown => if_unknown,
        }
    }
}

impl fmt::Display for Trivalent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.select("true", "false", "unknown"))
    }
}
