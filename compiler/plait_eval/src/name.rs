//! Names, definitions and variables.
//!
//! A name starts life unbound (possibly with a `::` path). Binding turns it
//! into a `Define` (found, carrying its binding), an `Undefined` (path target
//! namespace found, final name not yet bound) or a `Variable` (declared by an
//! enclosing pipeline).

use std::fmt;
use std::sync::Arc;

use plait_ir::{StringInterner, Symbol};

use crate::errors::{zero_length_name, zero_length_segment, EvalResult};
use crate::namespace::{Namespace, WeakNamespace};
use crate::node::Node;

/// Leading character of a pipe-variable sink.
pub const PIPE_LEAD: char = '|';
/// Leading character of a productive variable.
pub const PRODUCTIVE_LEAD: char = '!';
/// Leading character of an injecting variable.
pub const INJECTING_LEAD: char = '^';

/// Identity of a pipeline signature.
///
/// Variables refer to their declaring pipeline by id so that no variable owns
/// its pipeline.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct PipeId(u64);

impl PipeId {
    pub const fn new(raw: u64) -> Self {
        PipeId(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Namespace path of an unbound name: `a::b::x` or relative `::a::x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePath {
    pub relative: bool,
    /// Namespace segments, excluding the final name.
    pub segments: Arc<[Symbol]>,
}

/// A name as written, before binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnboundName {
    pub symbol: Symbol,
    pub path: Option<NamePath>,
}

impl UnboundName {
    pub fn simple(symbol: Symbol) -> Self {
        UnboundName { symbol, path: None }
    }

    /// Split `text` on `::` into a path and final name.
    pub fn parse(interner: &StringInterner, text: &str) -> EvalResult<Self> {
        if !text.contains("::") {
            return Ok(Self::simple(interner.intern(text)));
        }
        if text.ends_with("::") {
            return Err(zero_length_name());
        }
        let (relative, body) = match text.strip_prefix("::") {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut parts: Vec<&str> = body.split("::").collect();
        let last = parts.pop().unwrap_or_default();
        if parts.iter().any(|p| p.is_empty()) || last.is_empty() {
            return Err(zero_length_segment());
        }
        let segments: Vec<Symbol> = parts.iter().map(|p| interner.intern(p)).collect();
        Ok(UnboundName {
            symbol: interner.intern(last),
            path: Some(NamePath {
                relative,
                segments: segments.into(),
            }),
        })
    }

    /// True when written as a pipe-variable sink (`|x`, `|^x`, `|!x`).
    pub fn is_pipe_sink(&self) -> bool {
        self.path.is_none() && sink_target(self.symbol.as_str()).is_some()
    }
}

impl fmt::Display for UnboundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            if path.relative {
                f.write_str("::")?;
            }
            for seg in path.segments.iter() {
                write!(f, "{seg}::")?;
            }
        }
        write!(f, "{}", self.symbol)
    }
}

/// Text of the variable a sink writes, without the leading `|`.
pub(crate) fn sink_target(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(PIPE_LEAD)?;
    let mut chars = rest.chars();
    match chars.next()? {
        c if c.is_alphabetic() => Some(rest),
        INJECTING_LEAD | PRODUCTIVE_LEAD if chars.next().is_some_and(char::is_alphabetic) => {
            Some(rest)
        }
        _ => None,
    }
}

/// A name whose target namespace is known but which is not yet bound there.
#[derive(Clone)]
pub struct Undefined {
    pub namespace: WeakNamespace,
    pub symbol: Symbol,
    /// Target namespace name when it is a local namespace, for printing.
    pub qualifier: Option<Arc<str>>,
}

/// A resolved name and its binding.
#[derive(Clone)]
pub struct Define {
    pub namespace: WeakNamespace,
    pub namespace_name: Option<Arc<str>>,
    pub symbol: Symbol,
    pub binding: Node,
}

impl Define {
    pub fn new(namespace: &Namespace, symbol: Symbol, binding: Node) -> Self {
        Define {
            namespace: namespace.downgrade(),
            namespace_name: namespace.name(),
            symbol,
            binding,
        }
    }

    pub fn namespace(&self) -> Option<Namespace> {
        self.namespace.upgrade()
    }
}

/// How a variable behaves when read.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VariableKind {
    Plain,
    /// `^x`: a sequence value is spliced into the enclosing sequence.
    Injecting,
    /// `!x`: precedence 0 productive element stepping through its value.
    Productive,
    /// `|x` in a pipeline body: stores its parameters once and passes them on.
    Sink,
}

/// Reference to a pipeline's variable slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub symbol: Symbol,
    pub pipe: PipeId,
    pub index: usize,
    pub kind: VariableKind,
}

impl Variable {
    /// Variable whose kind follows its leading character.
    pub fn new(symbol: Symbol, pipe: PipeId, index: usize) -> Self {
        Variable {
            symbol,
            pipe,
            index,
            kind: Self::kind_for(symbol.as_str()),
        }
    }

    pub fn sink(symbol: Symbol, pipe: PipeId, index: usize) -> Self {
        Variable {
            symbol,
            pipe,
            index,
            kind: VariableKind::Sink,
        }
    }

    pub fn kind_for(text: &str) -> VariableKind {
        let mut chars = text.chars();
        let (Some(lead), Some(second)) = (chars.next(), chars.next()) else {
            return VariableKind::Plain;
        };
        if !second.is_alphabetic() {
            return VariableKind::Plain;
        }
        match lead {
            INJECTING_LEAD => VariableKind::Injecting,
            PRODUCTIVE_LEAD => VariableKind::Productive,
            _ => VariableKind::Plain,
        }
    }

    /// The ordinary variable a sink is read back through.
    #[must_use]
    pub fn reader(&self) -> Variable {
        Variable::new(self.symbol, self.pipe, self.index)
    }
}

/// Every name variant.
#[derive(Clone)]
pub enum Name {
    Unbound(UnboundName),
    Undefined(Undefined),
    Define(Define),
    Variable(Variable),
}

impl Name {
    pub fn symbol(&self) -> Symbol {
        match self {
            Name::Unbound(n) => n.symbol,
            Name::Undefined(n) => n.symbol,
            Name::Define(d) => d.symbol,
            Name::Variable(v) => v.symbol,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Unbound(n) => write!(f, "{n}"),
            Name::Undefined(n) => match &n.qualifier {
                Some(q) => write!(f, "{q}::{}", n.symbol),
                None => write!(f, "{}", n.symbol),
            },
            Name::Define(d) => match &d.namespace_name {
                Some(ns) => write!(f, "{ns}::{}", d.symbol),
                None => write!(f, "{}", d.symbol),
            },
            Name::Variable(v) if v.kind == VariableKind::Sink => {
                write!(f, "{PIPE_LEAD}{}", v.symbol)
            }
            Name::Variable(v) => write!(f, "{}", v.symbol),
        }
    }
}

#[cfg(test)]
mod tests;
